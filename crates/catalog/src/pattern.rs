//! Backup filename patterns
//!
//! A pattern is a regular expression with date placeholders:
//!
//! | Placeholder | Matches    |
//! |-------------|------------|
//! | `{year}`    | 4 digits   |
//! | `{month}`   | 2 digits   |
//! | `{day}`     | 2 digits   |
//! | `{hour}`    | 2 digits   |
//! | `{minute}`  | 2 digits   |
//!
//! The pattern must match the whole path relative to the backup directory,
//! using `/` as separator. Placeholders left out of the pattern default to
//! year 0000, January, the 1st, 00:00.

use crate::error::CatalogError;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use regex::{Captures, Regex};

const PLACEHOLDERS: [(&str, &str); 5] = [
    ("{year}", "(?P<year>[0-9]{4})"),
    ("{month}", "(?P<month>[0-9]{2})"),
    ("{day}", "(?P<day>[0-9]{2})"),
    ("{hour}", "(?P<hour>[0-9]{2})"),
    ("{minute}", "(?P<minute>[0-9]{2})"),
];

/// Compiled backup filename pattern
#[derive(Debug, Clone)]
pub struct FilePattern {
    raw: String,
    regex: Regex,
}

impl FilePattern {
    /// Compile a pattern, expanding placeholders into named groups
    pub fn compile(pattern: &str) -> Result<Self, CatalogError> {
        let mut expanded = pattern.to_string();
        for (placeholder, group) in PLACEHOLDERS {
            expanded = expanded.replace(placeholder, group);
        }

        let regex = Regex::new(&format!("^{}$", expanded)).map_err(|source| {
            CatalogError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;

        Ok(Self {
            raw: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as written in the configuration
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Timestamp embedded in a relative path
    ///
    /// Returns `None` when the path does not match the pattern, and an error
    /// when it matches but the captured fields are not a valid date and time.
    pub fn parse(&self, relative_path: &str) -> Option<Result<DateTime<Utc>, CatalogError>> {
        let caps = self.regex.captures(relative_path)?;
        Some(timestamp_from(&caps, relative_path))
    }
}

fn timestamp_from(caps: &Captures<'_>, name: &str) -> Result<DateTime<Utc>, CatalogError> {
    let field = |group: &str, default: u32| -> Result<u32, CatalogError> {
        match caps.name(group) {
            Some(m) => m.as_str().parse().map_err(|e| CatalogError::ParseTimestamp {
                name: name.to_string(),
                reason: format!("invalid {}: {}", group, e),
            }),
            None => Ok(default),
        }
    };

    let year = field("year", 0)?;
    let month = field("month", 1)?;
    let day = field("day", 1)?;
    let hour = field("hour", 0)?;
    let minute = field("minute", 0)?;

    let invalid = |reason: String| CatalogError::ParseTimestamp {
        name: name.to_string(),
        reason,
    };

    let year = i32::try_from(year).map_err(|_| invalid(format!("year {} out of range", year)))?;
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| invalid(format!("no such date {:04}-{:02}-{:02}", year, month, day)))?;
    let naive = date
        .and_hms_opt(hour, minute, 0)
        .ok_or_else(|| invalid(format!("no such time {:02}:{:02}", hour, minute)))?;

    Ok(Utc.from_utc_datetime(&naive))
}
