//! Error types for wpstage-version

use thiserror::Error;

/// Result type alias using wpstage-version Error
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Version string that is not semver even after normalization
    #[error("Invalid version '{0}': {1}")]
    InvalidVersion(String, String),
}
