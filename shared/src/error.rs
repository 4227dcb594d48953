//! Error types for the Valentine poem Lambda functions.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating, rendering or delivering a poem.
#[derive(Error, Debug)]
pub enum Error {
    /// Client input was malformed
    #[error("{0}")]
    Validation(String),

    /// Requested artifact format is not one we render
    #[error("Invalid format")]
    UnsupportedFormat(String),

    /// A required integration has no credentials
    #[error("{0}")]
    NotConfigured(String),

    /// Configuration value could not be used
    #[error("Configuration error: {0}")]
    Config(String),

    /// External API unreachable or returned an error
    #[error("Dependency error: {0}")]
    Dependency(String),

    /// Mail submission failed
    #[error("{0}")]
    Delivery(String),

    /// PDF or image encoding failed
    #[error("Render error: {0}")]
    Render(String),

    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) | Error::UnsupportedFormat(_) => 400,
            Error::NotConfigured(_) => 503,
            _ => 500,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Dependency(e.to_string())
    }
}
