//! Shared pieces of the `retain` command line tool
//!
//! - Settings loading and validation (file, environment, flags)
//! - Logging setup
//! - Formatting helpers for command output

pub mod logging;
pub mod settings;
pub mod util;
