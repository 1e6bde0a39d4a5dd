//! HTTP client for the remote collaboration API.

use async_trait::async_trait;
use mockall::automock;
use reqwest::Client;
use serde_json::{Value, json};

use crate::graph::{
    errors::{AuthError, FetchError, RequestError, SiteNotFoundError},
    models::{BearerToken, ColumnsResponse, Credential, ListColumn, SiteId, SiteResponse,
        TokenResponse},
};

const LOGIN_BASE_URL: &str = "https://login.microsoftonline.com";
const GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";
const DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

/// The remote operations the booking workflow depends on.
///
/// Implemented by [`GraphClient`]; mockable so the submission, mail, and
/// session layers can be exercised without a network.
#[automock]
#[async_trait]
pub trait GraphApi: Send + Sync {
    /// Exchange an application credential for a bearer token.
    ///
    /// Single attempt, no retry. Blank credential parts fail before any
    /// network call.
    async fn acquire_token(&self, credential: &Credential) -> Result<BearerToken, AuthError>;

    /// Resolve a (domain, site name) pair to an opaque site identifier.
    async fn resolve_site(
        &self,
        token: &BearerToken,
        domain: &str,
        site_name: &str,
    ) -> Result<SiteId, SiteNotFoundError>;

    /// Download the raw bytes of a workbook under the site's drive root.
    async fn fetch_spreadsheet(
        &self,
        token: &BearerToken,
        site_id: &SiteId,
        file_name: &str,
    ) -> Result<Vec<u8>, FetchError>;

    /// Read the column definitions of a remote list.
    async fn list_columns(
        &self,
        token: &BearerToken,
        site_id: &SiteId,
        list_name: &str,
    ) -> Result<Vec<ListColumn>, RequestError>;

    /// Create one item in a remote list from a `fields` payload.
    ///
    /// The service acknowledges creation with 200 or 201; anything else is
    /// an error.
    async fn create_list_item(
        &self,
        token: &BearerToken,
        site_id: &SiteId,
        list_name: &str,
        fields: &Value,
    ) -> Result<(), RequestError>;

    /// Submit one send-mail request for the given sender mailbox.
    ///
    /// Returns the raw HTTP status; interpretation of "accepted" is left to
    /// the caller.
    async fn send_mail(
        &self,
        token: &BearerToken,
        sender: &str,
        message: &Value,
    ) -> Result<u16, RequestError>;
}

/// `reqwest`-backed [`GraphApi`] implementation.
///
/// No timeouts are configured beyond the transport defaults; every call is
/// a single attempt.
#[derive(Debug, Clone)]
pub struct GraphClient {
    http: Client,
    login_base: String,
    graph_base: String,
}

impl GraphClient {
    /// Create a client against the production endpoints.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_urls(LOGIN_BASE_URL, GRAPH_BASE_URL)
    }

    /// Create a client against explicit base URLs (no trailing slash).
    #[must_use]
    pub fn with_base_urls(login_base: impl Into<String>, graph_base: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            login_base: login_base.into(),
            graph_base: graph_base.into(),
        }
    }
}

impl Default for GraphClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphApi for GraphClient {
    async fn acquire_token(&self, credential: &Credential) -> Result<BearerToken, AuthError> {
        if credential.has_blank_part() {
            return Err(AuthError::BlankCredential);
        }

        let url = format!(
            "{}/{}/oauth2/v2.0/token",
            self.login_base,
            credential.tenant_id()
        );

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", credential.client_id()),
            ("client_secret", credential.client_secret()),
            ("scope", DEFAULT_SCOPE),
        ];

        tracing::debug!(tenant = credential.tenant_id(), "requesting access token");

        let response = self.http.post(&url).form(&params).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();

            return Err(AuthError::Rejected { status, body });
        }

        let parsed: TokenResponse = response.json().await?;

        tracing::debug!("access token acquired");

        Ok(BearerToken::new(parsed.access_token))
    }

    async fn resolve_site(
        &self,
        token: &BearerToken,
        domain: &str,
        site_name: &str,
    ) -> Result<SiteId, SiteNotFoundError> {
        let url = format!("{}/sites/{domain}:/sites/{site_name}", self.graph_base);

        tracing::debug!(domain, site_name, "resolving site");

        let response = self
            .http
            .get(&url)
            .bearer_auth(token.as_str())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();

            return Err(SiteNotFoundError::Lookup { status, body });
        }

        let parsed: SiteResponse = response.json().await?;

        Ok(SiteId::new(parsed.id))
    }

    async fn fetch_spreadsheet(
        &self,
        token: &BearerToken,
        site_id: &SiteId,
        file_name: &str,
    ) -> Result<Vec<u8>, FetchError> {
        let url = format!(
            "{}/sites/{site_id}/drive/root:/{file_name}:/content",
            self.graph_base
        );

        tracing::debug!(file_name, "downloading workbook");

        let response = self
            .http
            .get(&url)
            .bearer_auth(token.as_str())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();

            return Err(FetchError::Rejected { status, body });
        }

        Ok(response.bytes().await?.to_vec())
    }

    async fn list_columns(
        &self,
        token: &BearerToken,
        site_id: &SiteId,
        list_name: &str,
    ) -> Result<Vec<ListColumn>, RequestError> {
        let url = format!(
            "{}/sites/{site_id}/lists/{list_name}/columns",
            self.graph_base
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(token.as_str())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();

            return Err(RequestError::Status { status, body });
        }

        let parsed: ColumnsResponse = response.json().await?;

        Ok(parsed.value)
    }

    async fn create_list_item(
        &self,
        token: &BearerToken,
        site_id: &SiteId,
        list_name: &str,
        fields: &Value,
    ) -> Result<(), RequestError> {
        let url = format!("{}/sites/{site_id}/lists/{list_name}/items", self.graph_base);
        let body = json!({ "fields": fields });

        tracing::debug!(list_name, "creating list item");

        let response = self
            .http
            .post(&url)
            .bearer_auth(token.as_str())
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();

        if !matches!(status, 200 | 201) {
            let body = response.text().await.unwrap_or_default();

            return Err(RequestError::Status { status, body });
        }

        Ok(())
    }

    async fn send_mail(
        &self,
        token: &BearerToken,
        sender: &str,
        message: &Value,
    ) -> Result<u16, RequestError> {
        let url = format!("{}/users/{sender}/sendMail", self.graph_base);

        let body = json!({
            "message": message,
            "saveToSentItems": "true",
        });

        tracing::debug!(sender, "submitting send-mail request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(token.as_str())
            .json(&body)
            .send()
            .await?;

        Ok(response.status().as_u16())
    }
}
