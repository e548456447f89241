//! Error types for wpstage-jobs

use std::path::PathBuf;
use thiserror::Error;
use wpstage_core::ItemStatus;

/// Result type alias for wpstage-jobs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the item store and the pipeline
#[derive(Debug, Error)]
pub enum Error {
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Item already exists: {0}")]
    ItemExists(String),

    /// The item is in a status the requested step cannot start from
    #[error("Item {id} is {status}, expected {expected}")]
    InvalidStatus {
        id: String,
        status: ItemStatus,
        expected: &'static str,
    },

    #[error("Upload missing: {0}")]
    UploadMissing(PathBuf),

    #[error(transparent)]
    Core(#[from] wpstage_core::Error),

    #[error(transparent)]
    Build(#[from] wpstage_builder::Error),

    #[error(transparent)]
    Remote(#[from] wpstage_remote::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A blocking task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
