//! Score-range partitioning policy
//!
//! The ranked index shards its population into a fixed array of buckets,
//! each covering a contiguous, half-open score range. This module owns the
//! partition table and the score → bucket-key mapping.
//!
//! ## Contract
//!
//! - Key 0 is the sentinel for non-positive scores and never holds entries.
//! - Keys ascend with score: a higher key always covers strictly greater
//!   scores.
//! - Every positive range must be wider than the maximum per-update delta
//!   magnitude, so a single update can only hop between adjacent keys. The
//!   engine relies on this to touch at most one neighbor's prefix rank per
//!   update.
//!
//! The boundary table is a policy, not a correctness invariant: any strictly
//! increasing table satisfying the width rule works.

use crate::error::{Error, Result};
use crate::types::Score;

/// Index of a bucket within the keyspace. Key 0 is the non-positive
/// sentinel; higher keys cover higher score ranges.
pub type BucketKey = usize;

/// Half-open score range `(lo, hi]` covered by one bucket.
///
/// The sentinel covers `(i64::MIN, 0]`; the top bucket is unbounded above
/// and reports `hi = i64::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreRange {
    /// Exclusive lower bound
    pub lo: Score,
    /// Inclusive upper bound
    pub hi: Score,
}

impl ScoreRange {
    /// Whether the range contains `score`.
    pub fn contains(&self, score: Score) -> bool {
        // the sentinel's lower bound saturates at i64::MIN and is inclusive
        score <= self.hi && (self.lo == Score::MIN || score > self.lo)
    }
}

/// The bucket partition table.
///
/// Holds the inclusive upper bound of every bucket except the top one.
/// `bounds[0]` is always 0 (the sentinel's upper bound); the bucket with
/// key `bounds.len()` is unbounded above.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyspace {
    bounds: Vec<Score>,
}

impl Keyspace {
    /// The production leaderboard table: 32 buckets.
    ///
    /// Widths grow with score so hot low-score regions get fine shards:
    /// steps of 5K up to 45K, then 50K steps to 450K, then 500K steps to
    /// 4.5M, then 5M / 10M / 20M, with everything above 20M in the top
    /// bucket.
    pub fn leaderboard() -> Self {
        let mut bounds = vec![0];
        bounds.extend((1..=9).map(|i| i * 5_000));
        bounds.extend((1..=9).map(|i| i * 50_000));
        bounds.extend((1..=9).map(|i| i * 500_000));
        bounds.extend([5_000_000, 10_000_000, 20_000_000]);
        debug_assert_eq!(bounds.len() + 1, 32);
        Self { bounds }
    }

    /// Build a keyspace from a custom bound table.
    ///
    /// `bounds` lists the inclusive upper bound of every bucket except the
    /// unbounded top one, starting with the sentinel bound 0.
    ///
    /// # Errors
    ///
    /// Rejects tables that do not start at 0 or are not strictly increasing.
    pub fn new(bounds: Vec<Score>) -> Result<Self> {
        if bounds.first() != Some(&0) {
            return Err(Error::InvalidKeyspace(
                "bound table must start with the sentinel bound 0".to_string(),
            ));
        }
        if bounds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::InvalidKeyspace(
                "bound table must be strictly increasing".to_string(),
            ));
        }
        Ok(Self { bounds })
    }

    /// Number of buckets, sentinel included.
    pub fn bucket_count(&self) -> usize {
        self.bounds.len() + 1
    }

    /// Highest bucket key (the unbounded top bucket).
    pub fn top_key(&self) -> BucketKey {
        self.bounds.len()
    }

    /// Map a score to its bucket key.
    ///
    /// Non-positive scores map to the sentinel key 0.
    pub fn key_of(&self, score: Score) -> BucketKey {
        if score <= 0 {
            return 0;
        }
        // First bound >= score; score above the last bound lands in the
        // unbounded top bucket.
        self.bounds.partition_point(|&b| b < score)
    }

    /// The score range covered by `key`.
    ///
    /// # Panics
    ///
    /// Panics if `key` is out of `[0, bucket_count)`.
    pub fn range_of(&self, key: BucketKey) -> ScoreRange {
        assert!(key < self.bucket_count(), "bucket key {} out of range", key);
        let lo = if key == 0 {
            Score::MIN
        } else {
            self.bounds[key - 1]
        };
        let hi = if key == self.top_key() {
            Score::MAX
        } else {
            self.bounds[key]
        };
        ScoreRange { lo, hi }
    }

    /// Width of the narrowest positive bucket (the top bucket is unbounded
    /// and excluded).
    ///
    /// Updates whose delta magnitude stays below this width can only move an
    /// entry between adjacent keys.
    pub fn min_positive_width(&self) -> Score {
        self.bounds
            .windows(2)
            .map(|w| w[1] - w[0])
            .min()
            .unwrap_or(Score::MAX)
    }
}

impl Default for Keyspace {
    fn default() -> Self {
        Self::leaderboard()
    }
}
