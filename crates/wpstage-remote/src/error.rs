//! Error types for wpstage-remote

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for wpstage-remote operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for wpstage-remote operations
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid URL format
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// URL that cannot take path segments (e.g. `mailto:`)
    #[error("URL cannot be used as a base: {0}")]
    CannotBeBase(String),

    /// Non-success response
    #[error("HTTP request failed with status {status}: {url}")]
    Status { status: u16, url: String },

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded for URL: {0}")]
    RateLimitExceeded(String),

    /// Slug unusable as a catalog file name
    #[error("Invalid identifier: {0}")]
    Security(#[from] wpstage_config::SecurityError),

    /// Release layout could not be derived
    #[error("Build layout error: {0}")]
    Build(#[from] wpstage_builder::Error),

    /// A required secret is not set in the environment
    #[error("Environment variable {0} is not set")]
    MissingSecret(String),

    /// A required setting is absent from the configuration
    #[error("Missing configuration: {0}")]
    MissingSetting(&'static str),

    /// Local artifact expected by a publish is absent
    #[error("File missing: {0}")]
    FileMissing(PathBuf),

    /// Some source files could not be uploaded after retries
    #[error("{failed} of {total} source files failed to upload")]
    PartialUpload { failed: usize, total: usize },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Whether retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Http(err) => err.is_timeout() || err.is_connect() || err.is_request(),
            Error::Status { status, .. } => *status >= 500,
            Error::RateLimitExceeded(_) => true,
            _ => false,
        }
    }
}
