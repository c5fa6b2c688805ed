//! Shared utilities for CLI commands

use catalog::CancellationToken;
use chrono::{DateTime, Duration, Utc};
use std::path::Path;
use tracing::warn;

/// Cancel the token on the first Ctrl-C
///
/// Abort the returned handle once the guarded work is done.
pub fn cancel_on_ctrl_c(cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping");
            cancel.cancel();
        }
    })
}

/// Format file size in human-readable format
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format a backup timestamp ("2024-01-03 14:30")
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

/// Format a retention horizon ("2 years 10 days", "36 hours")
pub fn format_horizon(horizon: Duration) -> String {
    let hours = horizon.num_hours();
    if hours == 0 {
        return "none".to_string();
    }
    if hours < 48 {
        return plural(hours, "hour");
    }

    let days = horizon.num_days();
    let (years, days) = (days / 365, days % 365);
    match (years, days) {
        (0, d) => plural(d, "day"),
        (y, 0) => plural(y, "year"),
        (y, d) => format!("{} {}", plural(y, "year"), plural(d, "day")),
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

/// Path shown relative to the backup directory when possible
pub fn display_relative(path: &Path, directory: &Path) -> String {
    path.strip_prefix(directory)
        .unwrap_or(path)
        .display()
        .to_string()
}
