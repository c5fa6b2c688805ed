//! Retention engine
//!
//! Applies the five tiers in order, hourly to yearly. Each tier sorts its
//! candidates newest first, groups them by the tier's bucket key, keeps the
//! newest record of the first `keep_count` buckets, prunes the other records
//! of those buckets, and hands every remaining record to the next tier.
//! Whatever is still left after the yearly tier has expired.
//!
//! A record selected by one tier is never seen by a later tier, so no file
//! is counted twice and no file is deleted twice.

use crate::record::FileRecord;
use crate::retention::RetentionPolicy;
use crate::tier::Tier;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Compute the records that must be deleted to satisfy `policy`
///
/// Order of the result: records pruned by each tier (hourly first), then
/// expired records, newest first within each part. Never fails; an empty
/// input yields an empty result.
pub fn apply(files: &[FileRecord], policy: &RetentionPolicy) -> Vec<FileRecord> {
    evaluate(files, policy).into_delete()
}

/// Run every tier and return the full decision
pub fn evaluate(files: &[FileRecord], policy: &RetentionPolicy) -> RetentionPlan {
    let mut candidates = files.to_vec();
    let mut tiers = Vec::with_capacity(Tier::ALL.len());

    for (tier, keep) in policy.tiers() {
        let Partition {
            selected,
            pruned,
            unselected,
        } = partition_tier(candidates, |record| tier.bucket_key(&record.timestamp()), keep);

        tiers.push(TierOutcome {
            tier,
            selected,
            pruned,
        });
        candidates = unselected;
    }

    RetentionPlan {
        tiers,
        expired: candidates,
    }
}

/// Newest first; equal timestamps ordered by path
pub fn newest_first(a: &FileRecord, b: &FileRecord) -> Ordering {
    b.timestamp()
        .cmp(&a.timestamp())
        .then_with(|| a.path().cmp(b.path()))
}

/// Split of one tier's candidates
#[derive(Debug, Default)]
struct Partition {
    /// Newest record of each retained bucket
    selected: Vec<FileRecord>,
    /// Older siblings in retained buckets
    pruned: Vec<FileRecord>,
    /// Records in buckets past the keep-count, carried to the next tier
    unselected: Vec<FileRecord>,
}

/// Partition candidates by bucket for a single tier
///
/// After sorting newest first, records with equal keys are adjacent, so
/// buckets are found in one linear pass without hashing.
fn partition_tier<K, F>(mut candidates: Vec<FileRecord>, bucket_of: F, keep: usize) -> Partition
where
    K: PartialEq,
    F: Fn(&FileRecord) -> K,
{
    candidates.sort_by(newest_first);

    let mut partition = Partition::default();
    let mut current: Option<K> = None;
    let mut bucket_retained = false;

    for record in candidates {
        let key = bucket_of(&record);

        if current.as_ref() == Some(&key) {
            if bucket_retained {
                partition.pruned.push(record);
            } else {
                partition.unselected.push(record);
            }
            continue;
        }

        // First record of a new bucket
        current = Some(key);
        bucket_retained = partition.selected.len() < keep;
        if bucket_retained {
            partition.selected.push(record);
        } else {
            partition.unselected.push(record);
        }
    }

    partition
}

/// What one tier kept and pruned
#[derive(Debug, Clone, Serialize)]
pub struct TierOutcome {
    pub tier: Tier,
    /// One record per retained bucket, newest bucket first
    pub selected: Vec<FileRecord>,
    /// Records that shared a retained bucket with a newer record
    pub pruned: Vec<FileRecord>,
}

/// Full result of applying a policy
#[derive(Debug, Clone, Default, Serialize)]
pub struct RetentionPlan {
    /// Outcome per tier, in precedence order
    pub tiers: Vec<TierOutcome>,
    /// Records older than every retained bucket
    pub expired: Vec<FileRecord>,
}

impl RetentionPlan {
    /// Records to delete, in deletion order
    pub fn to_delete(&self) -> Vec<FileRecord> {
        self.tiers
            .iter()
            .flat_map(|outcome| outcome.pruned.iter())
            .chain(&self.expired)
            .cloned()
            .collect()
    }

    /// Consume the plan into the records to delete
    pub fn into_delete(self) -> Vec<FileRecord> {
        let mut out = Vec::with_capacity(self.delete_count());
        for outcome in self.tiers {
            out.extend(outcome.pruned);
        }
        out.extend(self.expired);
        out
    }

    /// Retained records with the tier that kept them
    pub fn retained(&self) -> impl Iterator<Item = (Tier, &FileRecord)> {
        self.tiers
            .iter()
            .flat_map(|outcome| outcome.selected.iter().map(move |r| (outcome.tier, r)))
    }

    /// Number of buckets a tier retained
    pub fn retained_count(&self, tier: Tier) -> usize {
        self.tiers
            .iter()
            .find(|outcome| outcome.tier == tier)
            .map_or(0, |outcome| outcome.selected.len())
    }

    pub fn delete_count(&self) -> usize {
        self.tiers.iter().map(|o| o.pruned.len()).sum::<usize>() + self.expired.len()
    }

    /// Bytes held by the records to delete
    pub fn delete_bytes(&self) -> u64 {
        self.tiers
            .iter()
            .flat_map(|o| o.pruned.iter())
            .chain(self.expired.iter())
            .map(FileRecord::size)
            .sum()
    }

    pub fn total_files(&self) -> usize {
        self.retained().count() + self.delete_count()
    }

    /// Every record with its verdict, newest first
    pub fn decisions(&self) -> Vec<Decision<'_>> {
        let mut decisions: Vec<Decision<'_>> = Vec::with_capacity(self.total_files());

        for outcome in &self.tiers {
            decisions.extend(outcome.selected.iter().map(|record| Decision {
                record,
                verdict: Verdict::Keep(outcome.tier),
            }));
            decisions.extend(outcome.pruned.iter().map(|record| Decision {
                record,
                verdict: Verdict::Superseded(outcome.tier),
            }));
        }
        decisions.extend(self.expired.iter().map(|record| Decision {
            record,
            verdict: Verdict::Expired,
        }));

        decisions.sort_by(|a, b| newest_first(a.record, b.record));
        decisions
    }
}

/// Why a record is kept or deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "tier", rename_all = "lowercase")]
pub enum Verdict {
    /// Newest record of a bucket retained by this tier
    Keep(Tier),
    /// A newer record holds the same bucket of this tier
    Superseded(Tier),
    /// Outside every retained bucket
    Expired,
}

impl Verdict {
    pub fn is_delete(&self) -> bool {
        !matches!(self, Verdict::Keep(_))
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Keep(tier) => write!(f, "keep ({})", tier),
            Verdict::Superseded(tier) => write!(f, "delete (superseded in {} bucket)", tier),
            Verdict::Expired => f.write_str("delete (outside retention)"),
        }
    }
}

/// A record paired with its verdict
#[derive(Debug, Clone, Serialize)]
pub struct Decision<'a> {
    pub record: &'a FileRecord,
    pub verdict: Verdict,
}
