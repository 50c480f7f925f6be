//! Error types for dataset generation and persistence

use std::path::{Path, PathBuf};

/// Errors raised while building, saving or loading a dataset
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// Filesystem access failed
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Dataset JSON was malformed or could not be written
    #[error("dataset JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Caller asked for something the builder cannot produce
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl DatasetError {
    /// Wrap an I/O error with the path that caused it
    pub fn io_error(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Result alias for dataset operations
pub type Result<T> = std::result::Result<T, DatasetError>;
