//! Backup file records

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A backup file with the timestamp parsed from its name
///
/// Records are immutable once built. Two records are equal only when path,
/// timestamp and size all match; a directory listing never yields two
/// records for the same path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FileRecord {
    path: PathBuf,
    timestamp: DateTime<Utc>,
    size: u64,
}

impl FileRecord {
    /// Create a new record
    pub fn new(path: impl Into<PathBuf>, timestamp: DateTime<Utc>, size: u64) -> Self {
        Self {
            path: path.into(),
            timestamp,
            size,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Timestamp parsed from the file name (not the file's mtime)
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }
}
