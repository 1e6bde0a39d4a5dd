//! Data types for the Graph client.

use std::fmt;

use serde::Deserialize;
use zeroize::Zeroize;

/// Application identity used for the client-credentials token exchange.
///
/// Never persisted by this crate; the secret is redacted from `Debug`
/// output and wiped from memory on drop.
#[derive(Clone)]
pub struct Credential {
    client_id: String,
    client_secret: String,
    tenant_id: String,
}

impl Credential {
    /// Create a credential from its three parts.
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        tenant_id: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            tenant_id: tenant_id.into(),
        }
    }

    /// Application (client) identifier.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Application secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Tenant identifier the token exchange is scoped to.
    #[must_use]
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Returns true when any of the three parts is blank.
    #[must_use]
    pub fn has_blank_part(&self) -> bool {
        self.client_id.trim().is_empty()
            || self.client_secret.trim().is_empty()
            || self.tenant_id.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("client_id", &self.client_id)
            .field("client_secret", &"**redacted**")
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}

impl Drop for Credential {
    fn drop(&mut self) {
        self.client_secret.zeroize();
    }
}

/// Short-lived bearer token presented on every authenticated call.
///
/// Held for the duration of one workflow run; expiry is not tracked.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wrap a raw token string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw token value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(**redacted**)")
    }
}

/// Opaque identifier of a collaboration site, resolved once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteId(String);

impl SiteId {
    /// Wrap a raw site identifier.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw identifier value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One column of a remote list, as reported by the columns endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListColumn {
    /// Internal column name used in item payloads (e.g. `"field_5"`).
    pub name: String,

    /// Human-facing column label.
    #[serde(rename = "displayName")]
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SiteResponse {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ColumnsResponse {
    pub value: Vec<ListColumn>,
}
