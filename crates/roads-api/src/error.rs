use thiserror::Error;

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors produced while talking to the data provider.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid provider base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("failed to build http client ({0})")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed ({source})")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("provider returned status {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("unexpected response body from {url} ({source})")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Returns the HTTP status for errors produced by a non-success response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
