//! Score-range shard
//!
//! A bucket owns one order-statistic tree plus the cached count of entries
//! ranked strictly above it, both behind a single reader-writer lock.
//! `parking_lot::RwLock` is task-fair, so a continuous stream of
//! hand-over-hand readers cannot starve a writer.
//!
//! The bucket is a passive container: the prefix-rank bookkeeping rule is
//! owned by the index that coordinates cross-bucket moves.

use crate::ostree::OrderStatisticTree;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use podium_core::{Rank, ScoreRange};

/// Tree and prefix rank guarded together by the bucket lock.
#[derive(Debug)]
pub struct BucketInner {
    /// Entries whose score falls in this bucket's range
    pub tree: OrderStatisticTree,
    /// Count of entries in all strictly higher-scoring buckets; the 0-based
    /// global rank of this bucket's first entry
    pub prefix_rank: Rank,
}

impl BucketInner {
    /// Global rank of this bucket's first entry (1-based).
    pub fn first_rank(&self) -> Rank {
        self.prefix_rank + 1
    }

    /// Global rank of this bucket's last entry; equals `prefix_rank` when
    /// the bucket is empty.
    pub fn last_rank(&self) -> Rank {
        self.prefix_rank + self.tree.len()
    }
}

/// One shard of the ranked index.
#[derive(Debug)]
pub struct Bucket {
    range: ScoreRange,
    inner: RwLock<BucketInner>,
}

impl Bucket {
    /// Create an empty bucket covering `range`.
    pub fn new(range: ScoreRange, seed: u64) -> Self {
        Self {
            range,
            inner: RwLock::new(BucketInner {
                tree: OrderStatisticTree::with_seed(seed),
                prefix_rank: 0,
            }),
        }
    }

    /// The score range this bucket covers.
    pub fn range(&self) -> ScoreRange {
        self.range
    }

    /// Acquire the shared lock.
    pub fn read(&self) -> RwLockReadGuard<'_, BucketInner> {
        self.inner.read()
    }

    /// Acquire the exclusive lock.
    pub fn write(&self) -> RwLockWriteGuard<'_, BucketInner> {
        self.inner.write()
    }
}
