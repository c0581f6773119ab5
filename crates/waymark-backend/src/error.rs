//! Backend client error taxonomy.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    /// A guide id/title sanitized down to nothing, so the resource
    /// cannot be addressed.
    #[error("cannot derive a resource name from '{0}'")]
    InvalidResourceName(String),

    #[error("invalid backend base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx status outside the "not yet available" downgrade set.
    #[error("backend returned status {status} for {url}")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("backend response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}
