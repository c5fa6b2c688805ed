//! Tiered retention decisions for timestamped backup files
//!
//! This crate provides:
//! - File records (path, timestamp, size)
//! - Retention policies (hourly/daily/weekly/monthly/yearly keep-counts)
//! - Calendar bucket keys per tier
//! - The retention engine that decides which files to delete
//!
//! Everything here is pure: no filesystem access, no clocks, no logging.

pub mod engine;
pub mod record;
pub mod retention;
pub mod tier;

// Re-exports
pub use engine::{apply, evaluate, Decision, RetentionPlan, TierOutcome, Verdict};
pub use record::FileRecord;
pub use retention::RetentionPolicy;
pub use tier::{BucketKey, Tier};
