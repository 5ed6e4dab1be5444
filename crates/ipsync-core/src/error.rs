//! Error types for ipsync
//!
//! This module defines all error types used throughout the workspace.

use thiserror::Error;

/// Result type alias for ipsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for ipsync
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure (connection refused, timeout, unreachable host)
    #[error("Network error: {0}")]
    Network(String),

    /// The provider rejected the token
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Malformed or unexpected response from a remote service
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Notification sink failures
    #[error("Notification error: {0}")]
    Notification(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a notification error
    pub fn notification(msg: impl Into<String>) -> Self {
        Self::Notification(msg.into())
    }

    /// Whether retrying on the next scheduled pass may succeed.
    ///
    /// Authentication and configuration failures need operator action.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Provider { .. })
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_provider() {
        let err = Error::provider("cloudflare", "result is not an array");
        assert_eq!(
            err.to_string(),
            "Provider error (cloudflare): result is not an array"
        );
    }

    #[test]
    fn test_transient_classification() {
        assert!(Error::network("timed out").is_transient());
        assert!(Error::provider("cloudflare", "503").is_transient());
        assert!(!Error::auth("bad token").is_transient());
        assert!(!Error::config("no records").is_transient());
    }
}
