//! Errors raised by the Graph client.

use thiserror::Error;

/// Errors from the client-credentials token exchange.
#[derive(Debug, Error)]
pub enum AuthError {
    /// One of the credential parts was blank; no request was made.
    #[error("credential parts must be non-empty")]
    BlankCredential,

    /// An HTTP transport or decoding error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The token endpoint returned a non-success status.
    #[error("token exchange rejected with status {status}: {body}")]
    Rejected {
        /// HTTP status code returned by the endpoint.
        status: u16,
        /// Raw response body, kept for diagnosis.
        body: String,
    },
}

/// Errors from the site lookup.
#[derive(Debug, Error)]
pub enum SiteNotFoundError {
    /// An HTTP transport or decoding error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The site lookup returned a non-success status.
    #[error("site lookup failed with status {status}: {body}")]
    Lookup {
        /// HTTP status code returned by the endpoint.
        status: u16,
        /// Raw response body, kept for diagnosis.
        body: String,
    },
}

/// Errors from the workbook download. Not retryable.
#[derive(Debug, Error)]
pub enum FetchError {
    /// An HTTP transport error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The file resource returned a non-success status, including not-found.
    #[error("workbook download failed with status {status}: {body}")]
    Rejected {
        /// HTTP status code returned by the endpoint.
        status: u16,
        /// Raw response body, kept for diagnosis.
        body: String,
    },
}

/// Low-level failure of a list or mail request.
///
/// Wrapped by [`crate::booking::SubmissionError`] and [`crate::mail::MailError`]
/// with workflow context.
#[derive(Debug, Error)]
pub enum RequestError {
    /// An HTTP transport or decoding error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint returned an unexpected status.
    #[error("request failed with status {status}: {body}")]
    Status {
        /// HTTP status code returned by the endpoint.
        status: u16,
        /// Raw response body, kept for diagnosis.
        body: String,
    },
}
