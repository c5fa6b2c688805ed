//! Deletion of backup files selected by the retention engine

use crate::error::CatalogError;
use crate::{ensure_active, Result};
use policy::FileRecord;
use std::fs;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Deletes records, or only logs them in dry-run mode
#[derive(Debug, Clone, Copy)]
pub struct Executor {
    dry_run: bool,
}

impl Executor {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Delete a single file
    ///
    /// Returns error if:
    /// - The token is cancelled (nothing is touched)
    /// - The path is not a regular file (symlinks included)
    /// - The process has no write permission on the file
    /// - The removal itself fails
    pub fn delete(&self, record: &FileRecord, cancel: &CancellationToken) -> Result<()> {
        ensure_active(cancel)?;

        if self.dry_run {
            info!(
                file = %record.path().display(),
                timestamp = %record.timestamp(),
                size = record.size(),
                "would delete file (dry run)"
            );
            return Ok(());
        }

        verify_deletable(record.path())?;

        fs::remove_file(record.path()).map_err(|source| CatalogError::DeleteFile {
            path: record.path().to_path_buf(),
            source,
        })?;

        info!(
            file = %record.path().display(),
            timestamp = %record.timestamp(),
            size = record.size(),
            "deleted file"
        );

        Ok(())
    }

    /// Delete a batch of files, continuing past individual failures
    ///
    /// Only cancellation aborts the batch; it is returned as
    /// [`CatalogError::Cancelled`].
    pub fn execute(&self, records: &[FileRecord], cancel: &CancellationToken) -> Result<DeleteReport> {
        self.execute_with(records, cancel, |_| {})
    }

    /// Like [`Executor::execute`], calling `on_done` after each file
    pub fn execute_with<F>(
        &self,
        records: &[FileRecord],
        cancel: &CancellationToken,
        mut on_done: F,
    ) -> Result<DeleteReport>
    where
        F: FnMut(&FileRecord),
    {
        let mut report = DeleteReport {
            dry_run: self.dry_run,
            ..DeleteReport::default()
        };

        for record in records {
            match self.delete(record, cancel) {
                Ok(()) => report.record_delete(record.size()),
                Err(CatalogError::Cancelled) => {
                    warn!(
                        completed = report.files(),
                        remaining = records.len() - report.files() - report.failures.len(),
                        "deletion cancelled"
                    );
                    return Err(CatalogError::Cancelled);
                }
                Err(e) => {
                    error!(file = %record.path().display(), error = %e, "failed to delete file");
                    report.push_failure(record.path(), &e);
                }
            }
            on_done(record);
        }

        Ok(report)
    }
}

/// Refuse anything that is not a regular file we may write to
fn verify_deletable(path: &Path) -> Result<()> {
    let metadata = fs::symlink_metadata(path).map_err(|source| CatalogError::DeleteFile {
        path: path.to_path_buf(),
        source,
    })?;

    if !metadata.file_type().is_file() {
        return Err(CatalogError::NotRegularFile {
            path: path.to_path_buf(),
        });
    }

    check_write_access(path)
}

#[cfg(unix)]
fn check_write_access(path: &Path) -> Result<()> {
    use nix::unistd::{access, AccessFlags};

    access(path, AccessFlags::W_OK).map_err(|_| CatalogError::AccessDenied {
        path: path.to_path_buf(),
    })
}

#[cfg(not(unix))]
fn check_write_access(path: &Path) -> Result<()> {
    let readonly = fs::metadata(path)
        .map(|m| m.permissions().readonly())
        .unwrap_or(false);

    if readonly {
        Err(CatalogError::AccessDenied {
            path: path.to_path_buf(),
        })
    } else {
        Ok(())
    }
}

/// Outcome of a deletion batch
#[derive(Debug, Clone, Default)]
pub struct DeleteReport {
    pub dry_run: bool,
    pub deleted_files: usize,
    pub deleted_bytes: u64,
    pub would_delete_files: usize,
    pub would_delete_bytes: u64,
    pub failures: Vec<DeleteFailure>,
}

/// A file that could not be deleted
#[derive(Debug, Clone)]
pub struct DeleteFailure {
    pub path: PathBuf,
    pub error: String,
}

impl DeleteReport {
    fn record_delete(&mut self, bytes: u64) {
        if self.dry_run {
            self.would_delete_files += 1;
            self.would_delete_bytes = self.would_delete_bytes.saturating_add(bytes);
        } else {
            self.deleted_files += 1;
            self.deleted_bytes = self.deleted_bytes.saturating_add(bytes);
        }
    }

    fn push_failure(&mut self, path: &Path, err: &CatalogError) {
        self.failures.push(DeleteFailure {
            path: path.to_path_buf(),
            error: err.to_string(),
        });
    }

    /// Files deleted, or that would be deleted in dry-run mode
    pub fn files(&self) -> usize {
        if self.dry_run {
            self.would_delete_files
        } else {
            self.deleted_files
        }
    }

    /// Bytes freed, or that would be freed in dry-run mode
    pub fn bytes(&self) -> u64 {
        if self.dry_run {
            self.would_delete_bytes
        } else {
            self.deleted_bytes
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
