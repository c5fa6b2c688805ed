//! Backup file discovery and deletion
//!
//! This crate provides:
//! - Filename patterns with `{year}`/`{month}`/`{day}`/`{hour}`/`{minute}` placeholders
//! - Directory scanning into [`policy::FileRecord`]s, newest first
//! - A best-effort executor that deletes (or dry-runs) records
//!
//! Every blocking operation checks a [`CancellationToken`] first.

pub mod error;
pub mod executor;
pub mod pattern;
pub mod scan;

// Re-exports
pub use error::CatalogError;
pub use executor::{DeleteFailure, DeleteReport, Executor};
pub use pattern::FilePattern;
pub use scan::Catalog;
pub use tokio_util::sync::CancellationToken;

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Fail with [`CatalogError::Cancelled`] once the token has been cancelled
pub(crate) fn ensure_active(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        Err(CatalogError::Cancelled)
    } else {
        Ok(())
    }
}
