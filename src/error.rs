//! Error types for setup and storage
//!
//! The simulation itself never fails; these cover the code that mounts it.

use thiserror::Error;

/// Fatal conditions while mounting the game on a page or device
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("no global window")]
    MissingWindow,
    #[error("window has no document")]
    MissingDocument,
    #[error("no canvas element with id `{0}`")]
    MissingCanvas(String),
    #[error("element `{0}` is not a canvas")]
    NotACanvas(String),
    #[error("failed to create rendering surface: {0}")]
    Surface(String),
    #[error("no compatible GPU adapter: {0}")]
    Adapter(String),
    #[error("failed to create GPU device: {0}")]
    Device(String),
    #[error("failed to attach input listener for `{0}`")]
    Input(&'static str),
}

/// Failures reading or writing persisted JSON blobs
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("persistent storage is unavailable")]
    Unavailable,
    #[error("invalid stored data: {0}")]
    Json(#[from] serde_json::Error),
}
