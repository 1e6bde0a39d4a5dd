//! Client for the remote collaboration API (Microsoft Graph).

pub mod client;
pub mod errors;
pub mod models;

pub use client::{GraphApi, GraphClient, MockGraphApi};
pub use errors::{AuthError, FetchError, RequestError, SiteNotFoundError};
pub use models::{BearerToken, Credential, ListColumn, SiteId};
