//! Retention policy configuration

use crate::tier::Tier;
use chrono::Duration;
use serde::Serialize;

/// How many distinct buckets each tier keeps one file for
///
/// A count of zero disables the tier: it protects nothing and every file
/// falls through to the next tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RetentionPolicy {
    pub hourly: usize,
    pub daily: usize,
    pub weekly: usize,
    pub monthly: usize,
    pub yearly: usize,
}

impl RetentionPolicy {
    /// Create a policy from the five keep-counts
    pub fn new(hourly: usize, daily: usize, weekly: usize, monthly: usize, yearly: usize) -> Self {
        Self {
            hourly,
            daily,
            weekly,
            monthly,
            yearly,
        }
    }

    /// Keep-count for a tier
    pub fn keep_count(&self, tier: Tier) -> usize {
        match tier {
            Tier::Hourly => self.hourly,
            Tier::Daily => self.daily,
            Tier::Weekly => self.weekly,
            Tier::Monthly => self.monthly,
            Tier::Yearly => self.yearly,
        }
    }

    /// Tiers paired with their keep-counts, in precedence order
    pub fn tiers(&self) -> impl Iterator<Item = (Tier, usize)> + '_ {
        Tier::ALL.into_iter().map(move |tier| (tier, self.keep_count(tier)))
    }

    /// True when no tier retains anything (every file would be deleted)
    pub fn retains_nothing(&self) -> bool {
        self.tiers().all(|(_, count)| count == 0)
    }

    /// Longest window the policy can reach back
    ///
    /// The maximum of `count * period` over all tiers, using 30-day months
    /// and 365-day years. Informational only; decisions never use it.
    pub fn horizon(&self) -> Duration {
        // Duration::seconds panics past this bound
        const MAX_SECS: i64 = i64::MAX / 1000;

        self.tiers()
            .map(|(tier, count)| {
                let count = i64::try_from(count).unwrap_or(i64::MAX);
                let secs = tier.period().num_seconds().saturating_mul(count);
                Duration::seconds(secs.min(MAX_SECS))
            })
            .max()
            .unwrap_or_else(Duration::zero)
    }
}
