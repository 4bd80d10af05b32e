//! Storage-specific error type wrapping IO and JSON failures.

use std::path::PathBuf;

use terrarium_domain::error::TerrariumError;

/// Errors originating from the file storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading, writing or renaming a file failed.
    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A snapshot could not be encoded or decoded.
    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl From<StorageError> for TerrariumError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
