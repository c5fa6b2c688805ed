//! Backup directory scanning

use crate::error::CatalogError;
use crate::pattern::FilePattern;
use crate::{ensure_active, Result};
use policy::engine::newest_first;
use policy::FileRecord;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Backup files under one directory that match one pattern
pub struct Catalog {
    /// Backup directory (patterns match paths relative to it)
    directory: PathBuf,

    /// Filename pattern with date placeholders
    pattern: FilePattern,
}

impl Catalog {
    pub fn new(directory: impl Into<PathBuf>, pattern: FilePattern) -> Self {
        Self {
            directory: directory.into(),
            pattern,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn pattern(&self) -> &FilePattern {
        &self.pattern
    }

    /// List matching backup files, newest first
    ///
    /// Walks the directory recursively without following symlinks.
    /// Directories, symlinks and other non-regular files are skipped, as are
    /// files whose metadata or timestamp cannot be read.
    pub fn list_files(&self, cancel: &CancellationToken) -> Result<Vec<FileRecord>> {
        ensure_active(cancel)?;

        let walker = WalkDir::new(&self.directory).follow_links(false);
        let mut files = self.collect_entries(walker, cancel)?;

        files.sort_by(newest_first);

        debug!(
            directory = %self.directory.display(),
            pattern = self.pattern.as_str(),
            count = files.len(),
            "listed backup files"
        );

        Ok(files)
    }

    /// Records for the matching entries, checking the token before each one
    fn collect_entries<I>(&self, entries: I, cancel: &CancellationToken) -> Result<Vec<FileRecord>>
    where
        I: IntoIterator<Item = walkdir::Result<DirEntry>>,
    {
        let mut files = Vec::new();

        for entry in entries {
            ensure_active(cancel)?;

            let entry = entry.map_err(|source| CatalogError::ListFiles {
                directory: self.directory.clone(),
                source,
            })?;

            if let Some(record) = self.process_entry(&entry) {
                files.push(record);
            }
        }

        Ok(files)
    }

    /// Turn a walk entry into a record if it is a matching regular file
    fn process_entry(&self, entry: &DirEntry) -> Option<FileRecord> {
        let file_type = entry.file_type();
        if file_type.is_dir() || file_type.is_symlink() {
            return None;
        }

        let relative = entry.path().strip_prefix(&self.directory).ok()?;
        let relative = relative_key(relative);

        let timestamp = match self.pattern.parse(&relative)? {
            Ok(ts) => ts,
            Err(e) => {
                warn!(file = %relative, error = %e, "failed to parse timestamp from filename");
                return None;
            }
        };

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(file = %relative, error = %e, "failed to get file info");
                return None;
            }
        };

        if !metadata.is_file() {
            debug!(file = %relative, "skipping non-regular file");
            return None;
        }

        Some(FileRecord::new(entry.path(), timestamp, metadata.len()))
    }
}

/// Relative path joined with `/` on every platform
fn relative_key(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
