//! Error types for the GWN Cloud client.

use thiserror::Error;

/// Result type alias using [`GwnError`].
pub type Result<T> = std::result::Result<T, GwnError>;

/// Errors returned by GWN Cloud operations.
#[derive(Debug, Error)]
pub enum GwnError {
    /// Client-side configuration problem (missing credentials, bad URL).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Token acquisition or renewal failed.
    #[error("GWN Cloud authentication failed: {0}")]
    Auth(String),

    /// The HTTP request never produced a usable response.
    #[error("GWN Cloud request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The controller answered, but with a non-success business code.
    #[error("GWN Cloud API error ({code}): {message}")]
    Vendor { code: i64, message: String },
}

impl GwnError {
    /// Vendor error with the controller's code and message.
    pub fn vendor(code: i64, message: impl Into<String>) -> Self {
        Self::Vendor {
            code,
            message: message.into(),
        }
    }
}
