//! Retention tiers and their calendar buckets

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use serde::Serialize;
use std::fmt;

/// One of the five retention granularities
///
/// Tiers are always processed fine-to-coarse in the order of [`Tier::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Tier {
    /// All tiers in precedence order
    pub const ALL: [Tier; 5] = [
        Tier::Hourly,
        Tier::Daily,
        Tier::Weekly,
        Tier::Monthly,
        Tier::Yearly,
    ];

    /// Lowercase tier name, as used in configuration files
    pub fn name(self) -> &'static str {
        match self {
            Tier::Hourly => "hourly",
            Tier::Daily => "daily",
            Tier::Weekly => "weekly",
            Tier::Monthly => "monthly",
            Tier::Yearly => "yearly",
        }
    }

    /// Calendar bucket a timestamp falls into for this tier
    ///
    /// Buckets are calendar-aligned: the same hour of the same day, the same
    /// ISO week, the same calendar month, and so on.
    pub fn bucket_key(self, ts: &DateTime<Utc>) -> BucketKey {
        match self {
            Tier::Hourly => BucketKey::Hour {
                year: ts.year(),
                month: ts.month(),
                day: ts.day(),
                hour: ts.hour(),
            },
            Tier::Daily => BucketKey::Day {
                year: ts.year(),
                month: ts.month(),
                day: ts.day(),
            },
            Tier::Weekly => {
                let week = ts.iso_week();
                BucketKey::Week {
                    iso_year: week.year(),
                    week: week.week(),
                }
            }
            Tier::Monthly => BucketKey::Month {
                year: ts.year(),
                month: ts.month(),
            },
            Tier::Yearly => BucketKey::Year { year: ts.year() },
        }
    }

    /// Nominal length of one bucket (months are 30 days, years 365)
    pub fn period(self) -> Duration {
        match self {
            Tier::Hourly => Duration::hours(1),
            Tier::Daily => Duration::days(1),
            Tier::Weekly => Duration::weeks(1),
            Tier::Monthly => Duration::days(30),
            Tier::Yearly => Duration::days(365),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Tier-specific bucket identity
///
/// Two records share a bucket iff their keys for that tier are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BucketKey {
    Hour { year: i32, month: u32, day: u32, hour: u32 },
    Day { year: i32, month: u32, day: u32 },
    Week { iso_year: i32, week: u32 },
    Month { year: i32, month: u32 },
    Year { year: i32 },
}
