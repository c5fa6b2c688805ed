//! Logging setup
//!
//! Logs go to stderr so command output on stdout stays machine readable.
//! With a log file configured they go to that file instead, through a
//! non-blocking writer whose guard must live until the command ends.

use anyhow::{Context, Result};
use std::path::Path;
use std::str::FromStr;
use tracing::{warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

/// Parse a level name ("debug", "WARN", ...)
pub fn parse_level(level: &str) -> Option<Level> {
    Level::from_str(level.trim()).ok()
}

/// Install the global subscriber
///
/// An unrecognized level falls back to info with a warning.
pub fn init(level: &str, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let parsed = parse_level(level);
    let max_level = parsed.unwrap_or(Level::INFO);

    let guard = match log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .with_context(|| format!("log_file has no file name: {}", path.display()))?;

            let appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(file_name.to_string_lossy())
                .build(directory)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::fmt()
                .with_max_level(max_level)
                .with_ansi(false)
                .with_writer(writer)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_max_level(max_level)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

            None
        }
    };

    if parsed.is_none() {
        warn!(requested = level, "unknown log level, using info");
    }

    Ok(guard)
}
