//! Error types for the webhook client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when calling the redeploy webhook
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (connection refused, DNS, timeout, ...)
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Webhook answered with a non-2xx status
    #[error("Webhook answered with status {status}")]
    ApiError {
        /// HTTP status code
        status: u16,
    },

    /// Webhook URL is not a usable http(s) URL
    #[error("Invalid webhook URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Check if the request hit the client timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::RequestFailed(e) if e.is_timeout())
    }

    /// HTTP status returned by the webhook, if it answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status } => Some(*status),
            _ => None,
        }
    }
}
