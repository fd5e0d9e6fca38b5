//! HTTP executor error types

use thiserror::Error;

/// Result type for HTTP operations
pub type Result<T> = std::result::Result<T, HttpError>;

/// HTTP executor errors
#[derive(Debug, Error)]
pub enum HttpError {
    /// The request never produced a response (connect, timeout, protocol failure)
    #[error("Network request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Client build error
    #[error("Failed to build HTTP client: {0}")]
    BuildError(String),
}

impl HttpError {
    /// True when the failure happened while establishing the connection
    pub fn is_connect(&self) -> bool {
        matches!(self, HttpError::RequestFailed(e) if e.is_connect())
    }

    /// True when the request hit the configured timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, HttpError::RequestFailed(e) if e.is_timeout())
    }
}
