//! Error types for file operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the trash, deletion and upload helpers.
#[derive(Debug, Error)]
pub enum FilesError {
    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Path is empty")]
    EmptyPath,

    #[error("Unknown deletion token")]
    InvalidToken,

    #[error("Too many pending deletions (limit {limit})")]
    RegistryFull { limit: usize },

    #[error("Failed to move {path} to trash: {reason}")]
    Trash { path: PathBuf, reason: String },

    #[error("Moving to trash is not supported on this platform")]
    Unsupported,

    #[error("Invalid file name: {name}")]
    InvalidName { name: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FilesError {
    pub fn trash(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Trash {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
