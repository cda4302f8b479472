//! Error types for the Prometheus SDK

use lumen_core::LumenError;

/// Result type alias
pub type Result<T> = std::result::Result<T, PrometheusError>;

/// Prometheus client errors
#[derive(Debug, thiserror::Error)]
pub enum PrometheusError {
    #[error("Fetching failed: server responded with HTTP {status}")]
    FetchFailed { status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] LumenError),
}

impl PrometheusError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        PrometheusError::InvalidResponse(message.into())
    }

    /// True for failures caused by the response body rather than transport
    pub fn is_validation(&self) -> bool {
        matches!(self, PrometheusError::InvalidResponse(_))
    }
}
