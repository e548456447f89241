//! Error types for wpstage-fs

use thiserror::Error;

/// Result type alias using wpstage-fs Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building ignore rules
#[derive(Debug, Error)]
pub enum Error {
    /// An ignore pattern failed to compile
    #[error("Invalid ignore pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}
