//! Error types for wpstage-builder

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using wpstage-builder Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or extracting archives
#[derive(Debug, Error)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The temporary archive could not be moved into place
    #[error("Failed to persist archive: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// Slug or version unusable as a staging path segment
    #[error("Invalid build identity: {0}")]
    Security(#[from] wpstage_config::SecurityError),

    /// The analyzed source directory is gone
    #[error("Source directory missing: {0}")]
    SourceMissing(PathBuf),

    /// Archive entry whose name escapes the extraction directory
    #[error("Archive entry '{0}' escapes the destination")]
    UnsafeEntry(String),

    #[error("Banner template not found: {0}")]
    BannerTemplateMissing(PathBuf),
}
