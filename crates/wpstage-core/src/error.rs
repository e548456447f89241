//! Error types for wpstage core.

use thiserror::Error;

/// Result type for wpstage core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while handling core data.
#[derive(Debug, Error)]
pub enum Error {
    /// A package kind string was neither `plugin` nor `theme`.
    #[error("Unknown package type: {0} (expected 'plugin' or 'theme')")]
    UnknownKind(String),

    /// A scan mode string was neither `strict` nor `full`.
    #[error("Unknown scan mode: {0} (expected 'strict' or 'full')")]
    UnknownScanMode(String),

    /// A status string did not name a known item status.
    #[error("Unknown item status: {0}")]
    UnknownStatus(String),

    /// An analysis snapshot lacks a field required for building.
    #[error("Analysis incomplete, cannot build: missing {field}")]
    MissingField {
        /// Name of the missing field.
        field: &'static str,
    },

    /// JSON (de)serialization of a snapshot failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
