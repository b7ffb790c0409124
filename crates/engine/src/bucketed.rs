//! Fine-grained bucketed ranked index
//!
//! The primary index implementation. Customer totals live in a sharded
//! concurrent map; ranked entries live in a fixed array of score-range
//! buckets, each with its own reader-writer lock and a cached prefix rank.
//!
//! # Concurrency protocol
//!
//! - An update holds the score-map entry guard for the whole call, which
//!   serializes concurrent updates to the same customer, then takes write
//!   locks on the one or two buckets it touches, higher key first.
//! - Range reads walk buckets from the highest key down under
//!   hand-over-hand read locking: the next bucket's read lock is acquired
//!   before the current one is released, and at most two are ever held.
//!   A cross-bucket move needs both write locks, so a reader straddling a
//!   boundary can never observe half of a move.
//! - All acquisitions descend key order, so writers and readers cannot
//!   deadlock against each other.
//!
//! # Prefix-rank rule
//!
//! On a cross-bucket move only the lower-key bucket of the pair changes:
//! +1 when the entry moves up past it, -1 when the entry moves back down
//! into it. The sentinel (key 0) holds no entries and no prefix rank.
//! The keyspace width rule keeps every move adjacent, so exactly one
//! bucket's prefix rank is touched per update.

use crate::bucket::{Bucket, BucketInner};
use dashmap::DashMap;
use parking_lot::RwLockReadGuard;
use podium_core::{BucketKey, CustomerId, Entry, Keyspace, Rank, RankEntry, RankedIndex, Score};
use std::cmp::Ordering;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use tracing::debug;

/// How many times a customer-centered read re-resolves the customer's
/// score after losing a race with a concurrent update.
const CUSTOMER_READ_RETRIES: usize = 8;

/// The primary ranked index: fine-grained bucket locking, immediately
/// consistent reads.
#[derive(Debug)]
pub struct BucketedIndex {
    scores: DashMap<CustomerId, Score>,
    buckets: Vec<Bucket>,
    keyspace: Keyspace,
    ranked: AtomicUsize,
}

impl BucketedIndex {
    /// Create an index over `keyspace`, seeding each bucket's level
    /// generator from `seed`.
    pub fn new(keyspace: Keyspace, seed: u64) -> Self {
        let buckets = (0..keyspace.bucket_count())
            .map(|key| {
                let bucket_seed = seed.wrapping_add(key as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
                Bucket::new(keyspace.range_of(key), bucket_seed)
            })
            .collect();
        Self {
            scores: DashMap::new(),
            buckets,
            keyspace,
            ranked: AtomicUsize::new(0),
        }
    }

    /// Apply `delta` to the customer's total and reposition their ranked
    /// entry, returning the post-update total.
    pub fn update(&self, customer_id: CustomerId, delta: Score) -> Score {
        // The entry guard is held across the bucket mutation: it is the
        // per-customer serialization point.
        let mut slot = self.scores.entry(customer_id).or_insert(0);
        let old_score = *slot;
        let new_score = old_score + delta;
        if new_score != old_score {
            *slot = new_score;
            self.reposition(customer_id, old_score, new_score);
        }
        new_score
    }

    fn reposition(&self, customer_id: CustomerId, old_score: Score, new_score: Score) {
        let old_key = self.keyspace.key_of(old_score);
        let new_key = self.keyspace.key_of(new_score);
        // the keyspace width rule keeps every hop adjacent
        debug_assert!(
            old_key.abs_diff(new_key) <= 1,
            "cross-bucket hop {} -> {} must be adjacent",
            old_key,
            new_key
        );
        debug_assert!(
            new_key == 0 || self.buckets[new_key].range().contains(new_score),
            "score {} outside bucket {}",
            new_score,
            new_key
        );
        let old_entry = Entry::new(old_score, customer_id);
        let new_entry = Entry::new(new_score, customer_id);

        match old_key.cmp(&new_key) {
            Ordering::Equal => {
                if old_key == 0 {
                    return; // still unranked
                }
                let mut bucket = self.buckets[old_key].write();
                assert!(
                    bucket.tree.remove(old_entry),
                    "ranked entry missing for customer {} at score {}",
                    customer_id,
                    old_score
                );
                assert!(bucket.tree.insert(new_entry));
            }
            Ordering::Less => {
                // moving up: lock the higher bucket first
                let mut dst = self.buckets[new_key].write();
                if old_key != 0 {
                    let mut src = self.buckets[old_key].write();
                    assert!(
                        src.tree.remove(old_entry),
                        "ranked entry missing for customer {} at score {}",
                        customer_id,
                        old_score
                    );
                    // one more entry now ranks above everything in src
                    src.prefix_rank += 1;
                } else {
                    self.ranked.fetch_add(1, AtomicOrdering::Relaxed);
                }
                assert!(dst.tree.insert(new_entry));
                debug!(
                    customer_id,
                    old_key, new_key, new_score, "entry moved up a bucket"
                );
            }
            Ordering::Greater => {
                // moving down: lock the higher bucket first
                let mut src = self.buckets[old_key].write();
                assert!(
                    src.tree.remove(old_entry),
                    "ranked entry missing for customer {} at score {}",
                    customer_id,
                    old_score
                );
                if new_key != 0 {
                    let mut dst = self.buckets[new_key].write();
                    assert!(dst.tree.insert(new_entry));
                    // the moved entry no longer ranks above dst
                    dst.prefix_rank -= 1;
                } else {
                    self.ranked.fetch_sub(1, AtomicOrdering::Relaxed);
                }
                debug!(
                    customer_id,
                    old_key, new_key, new_score, "entry moved down a bucket"
                );
            }
        }
    }

    /// Entries at global ranks `[start, end]`, 1-based, ascending.
    pub fn ranks_by_range(&self, start: Rank, end: Rank) -> Vec<RankEntry> {
        let mut out = Vec::new();
        if start == 0 || end < start {
            return out;
        }
        // skip phase: descend until a bucket's rank interval reaches
        // `start`, holding locks hand-over-hand
        let mut key = self.keyspace.top_key();
        let mut guard = self.buckets[key].read();
        while guard.last_rank() < start {
            if key == 1 {
                return out; // start is past the ranked population
            }
            key -= 1;
            guard = self.buckets[key].read();
        }
        self.emit_descending(key, guard, start, end, &mut out);
        out
    }

    /// The window of `high` entries above and `low` entries below a
    /// customer, the customer included.
    pub fn ranks_by_customer(&self, customer_id: CustomerId, high: Rank, low: Rank) -> Vec<RankEntry> {
        for _ in 0..CUSTOMER_READ_RETRIES {
            let Some(score) = self.scores.get(&customer_id).map(|s| *s) else {
                return Vec::new();
            };
            if score <= 0 {
                return Vec::new();
            }
            let target_key = self.keyspace.key_of(score);
            // descend hand-over-hand down to the customer's bucket
            let mut key = self.keyspace.top_key();
            let mut guard = self.buckets[key].read();
            while key > target_key {
                key -= 1;
                guard = self.buckets[key].read();
            }
            let Some(within) = guard.tree.rank_of(Entry::new(score, customer_id)) else {
                // the customer was repositioned between the score lookup and
                // the lock acquisition; resolve the fresh score and retry
                continue;
            };
            let rank = guard.prefix_rank + within;
            let start = rank.saturating_sub(high).max(1);
            let end = rank.saturating_add(low);
            let mut out = Vec::new();
            if start > guard.prefix_rank {
                // window starts inside the held bucket: emit in one pass
                self.emit_descending(key, guard, start, end, &mut out);
            } else {
                // window reaches buckets already released above us
                drop(guard);
                out = self.ranks_by_range(start, end);
            }
            return out;
        }
        Vec::new()
    }

    /// Emit ranks `[start, end]` walking downward from `key`, whose read
    /// guard is already held.
    fn emit_descending<'a>(
        &'a self,
        mut key: BucketKey,
        mut guard: RwLockReadGuard<'a, BucketInner>,
        start: Rank,
        end: Rank,
        out: &mut Vec<RankEntry>,
    ) {
        loop {
            if !guard.tree.is_empty() {
                if guard.first_rank() > end {
                    return;
                }
                let last = guard.last_rank();
                if last >= start {
                    let lo = start.max(guard.first_rank()) - guard.prefix_rank;
                    let hi = end.min(last) - guard.prefix_rank;
                    let base = guard.prefix_rank + lo;
                    for (offset, entry) in guard.tree.range_by_rank(lo, hi).enumerate() {
                        out.push(RankEntry::new(
                            entry.customer_id,
                            entry.score,
                            base + offset as Rank,
                        ));
                    }
                    if last >= end {
                        return;
                    }
                }
            }
            if key == 1 {
                return; // sentinel below holds nothing
            }
            key -= 1;
            // acquire the next bucket before the assignment drops the
            // current guard
            guard = self.buckets[key].read();
        }
    }

    /// Current accumulated score, ranked or not.
    pub fn score_of(&self, customer_id: CustomerId) -> Option<Score> {
        self.scores.get(&customer_id).map(|s| *s)
    }

    /// Number of ranked (positive-score) customers.
    pub fn ranked_len(&self) -> usize {
        self.ranked.load(AtomicOrdering::Relaxed)
    }

    /// The keyspace this index partitions by.
    pub fn keyspace(&self) -> &Keyspace {
        &self.keyspace
    }
}

impl Default for BucketedIndex {
    fn default() -> Self {
        Self::new(Keyspace::leaderboard(), rand::random())
    }
}

impl RankedIndex for BucketedIndex {
    fn update(&self, customer_id: CustomerId, delta: Score) -> Score {
        BucketedIndex::update(self, customer_id, delta)
    }

    fn ranks_by_range(&self, start: Rank, end: Rank) -> Vec<RankEntry> {
        BucketedIndex::ranks_by_range(self, start, end)
    }

    fn ranks_by_customer(&self, customer_id: CustomerId, high: Rank, low: Rank) -> Vec<RankEntry> {
        BucketedIndex::ranks_by_customer(self, customer_id, high, low)
    }

    fn score_of(&self, customer_id: CustomerId) -> Option<Score> {
        BucketedIndex::score_of(self, customer_id)
    }

    fn ranked_len(&self) -> usize {
        BucketedIndex::ranked_len(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> BucketedIndex {
        BucketedIndex::new(Keyspace::leaderboard(), 0x0dd5)
    }

    #[test]
    fn update_accumulates() {
        let idx = index();
        assert_eq!(idx.update(1, 100), 100);
        assert_eq!(idx.update(1, 50), 150);
        assert_eq!(idx.score_of(1), Some(150));
    }

    #[test]
    fn zero_delta_is_a_noop() {
        let idx = index();
        idx.update(1, 100);
        assert_eq!(idx.update(1, 0), 100);
        assert_eq!(
            idx.ranks_by_range(1, 1),
            vec![RankEntry::new(1, 100, 1)]
        );
    }

    #[test]
    fn negative_totals_are_unranked_but_tracked() {
        let idx = index();
        idx.update(1, -100);
        assert_eq!(idx.score_of(1), Some(-100));
        assert_eq!(idx.ranked_len(), 0);
        assert!(idx.ranks_by_range(1, 10).is_empty());
        assert!(idx.ranks_by_customer(1, 1, 1).is_empty());
    }

    #[test]
    fn crossing_zero_enters_and_leaves_the_ranking() {
        let idx = index();
        idx.update(1, -50);
        idx.update(1, 80); // total 30: enters
        assert_eq!(idx.ranked_len(), 1);
        assert_eq!(idx.ranks_by_range(1, 1), vec![RankEntry::new(1, 30, 1)]);
        idx.update(1, -30); // total 0: leaves
        assert_eq!(idx.ranked_len(), 0);
        assert!(idx.ranks_by_range(1, 1).is_empty());
        assert_eq!(idx.score_of(1), Some(0));
    }

    #[test]
    fn cross_bucket_move_keeps_prefix_ranks_consistent() {
        let idx = index();
        // customer 1 near the top of bucket 1, then pushed into bucket 2
        for _ in 0..5 {
            idx.update(1, 1_000);
        }
        assert_eq!(idx.score_of(1), Some(5_000));
        idx.update(2, 900);
        idx.update(3, 400);
        idx.update(1, 600); // 5_600: bucket 1 -> 2
        let rows = idx.ranks_by_range(1, 3);
        assert_eq!(
            rows,
            vec![
                RankEntry::new(1, 5_600, 1),
                RankEntry::new(2, 900, 2),
                RankEntry::new(3, 400, 3),
            ]
        );
        idx.update(1, -700); // 4_900: back into bucket 1
        let rows = idx.ranks_by_range(1, 3);
        assert_eq!(rows[0], RankEntry::new(1, 4_900, 1));
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[2].rank, 3);
    }

    #[test]
    fn ranks_by_customer_windows() {
        let idx = index();
        for id in 1..=10 {
            idx.update(id, id * 100);
        }
        // customer 5 (score 500) sits at rank 6
        let window = idx.ranks_by_customer(5, 2, 2);
        let ranks: Vec<_> = window.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![4, 5, 6, 7, 8]);
        assert_eq!(window[2], RankEntry::new(5, 500, 6));
        // window clipped at the top
        let window = idx.ranks_by_customer(10, 5, 1);
        let ranks: Vec<_> = window.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2]);
        // window clipped at the bottom
        let window = idx.ranks_by_customer(1, 1, 5);
        let ranks: Vec<_> = window.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![9, 10]);
    }

    #[test]
    fn range_read_spans_buckets() {
        let idx = index();
        // scores span buckets 1, 2 and 10
        idx.update(1, 50);
        for _ in 0..6 {
            idx.update(2, 1_000);
        }
        for _ in 0..47 {
            idx.update(3, 1_000);
        }
        let rows = idx.ranks_by_range(1, 10);
        assert_eq!(
            rows,
            vec![
                RankEntry::new(3, 47_000, 1),
                RankEntry::new(2, 6_000, 2),
                RankEntry::new(1, 50, 3),
            ]
        );
    }

    #[test]
    fn out_of_range_reads_are_empty() {
        let idx = index();
        assert!(idx.ranks_by_range(100, 200).is_empty());
        assert!(idx.ranks_by_range(5, 1).is_empty());
        idx.update(1, 10);
        assert!(idx.ranks_by_range(2, 5).is_empty());
        assert!(idx.ranks_by_customer(999, 1, 1).is_empty());
    }
}
