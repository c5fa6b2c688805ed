//! Catalog and executor errors

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid file pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to list files in {}: {source}", .directory.display())]
    ListFiles {
        directory: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to parse timestamp from '{name}': {reason}")]
    ParseTimestamp { name: String, reason: String },

    #[error("failed to delete file {}: {source}", .path.display())]
    DeleteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a regular file", .path.display())]
    NotRegularFile { path: PathBuf },

    #[error("access denied: no write permission for {}", .path.display())]
    AccessDenied { path: PathBuf },

    #[error("operation cancelled")]
    Cancelled,
}

impl CatalogError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CatalogError::Cancelled)
    }
}
