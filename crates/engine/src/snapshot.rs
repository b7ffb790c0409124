//! Eventually-consistent snapshot index
//!
//! Trades read freshness for write throughput. Updates land in the
//! realtime score map and a shared delta queue, returning the tentative
//! total immediately. A background tick drains the queue, coalesces deltas
//! per customer, applies the nets to a coarse score-bucketed ordered index
//! under one write lock, and rebuilds the prefix-sum read caches. Reads
//! observe the snapshot as of the last completed tick.
//!
//! Coalescing merges redundant writes to hot customers: one write lock per
//! tick beats per-update fine-grained locking when the hot set is small
//! relative to the drain rate.

use crate::config::PodiumConfig;
use crate::rebuild::RebuildWorker;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use podium_core::{CustomerId, Entry, Rank, RankEntry, RankedIndex, Score};
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Width of one coarse snapshot bucket on the score axis.
const COARSE_WIDTH: Score = 100;

/// Coarse bucket key: floor division so negative scores round toward
/// negative infinity.
fn coarse_key(score: Score) -> i64 {
    score.div_euclid(COARSE_WIDTH)
}

/// Counters exposed by [`SnapshotIndex::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebuildStats {
    /// Completed rebuild ticks that applied at least one update.
    pub ticks: u64,
    /// Raw updates drained from the queue.
    pub drained_updates: u64,
    /// Net per-customer updates after coalescing.
    pub coalesced_updates: u64,
    /// Duration of the most recent applying tick, in microseconds.
    pub last_tick_micros: u64,
}

/// Rebuilt-on-tick snapshot of the ranking.
struct SnapshotState {
    committed: FxHashMap<CustomerId, Score>,
    /// Coarse key -> ordered entries; holds positive scores only, so the
    /// ranking walk never needs a non-positive filter.
    buckets: BTreeMap<i64, BTreeSet<Entry>>,
    /// `(starting_rank, coarse key)` in walk order (descending key);
    /// starting_rank is the 0-based rank of the bucket's first entry.
    prefix_sums: Vec<(Rank, i64)>,
    rank_by_customer: FxHashMap<CustomerId, Rank>,
    total_ranked: Rank,
}

impl SnapshotState {
    fn empty() -> Self {
        Self {
            committed: FxHashMap::default(),
            buckets: BTreeMap::new(),
            prefix_sums: Vec::new(),
            rank_by_customer: FxHashMap::default(),
            total_ranked: 0,
        }
    }

    /// Apply one net delta to the committed map and the coarse buckets.
    fn apply(&mut self, customer_id: CustomerId, net_delta: Score) {
        let old = self.committed.get(&customer_id).copied().unwrap_or(0);
        let new = old + net_delta;
        self.committed.insert(customer_id, new);
        if old > 0 {
            let key = coarse_key(old);
            let set = self
                .buckets
                .get_mut(&key)
                .unwrap_or_else(|| panic!("snapshot bucket {} lost for committed score {}", key, old));
            assert!(
                set.remove(&Entry::new(old, customer_id)),
                "committed entry missing for customer {} at score {}",
                customer_id,
                old
            );
            if set.is_empty() {
                self.buckets.remove(&key);
            }
        }
        if new > 0 {
            self.buckets
                .entry(coarse_key(new))
                .or_default()
                .insert(Entry::new(new, customer_id));
        }
    }

    /// Rebuild the prefix-sum and customer-rank caches from the buckets.
    fn rebuild_caches(&mut self) {
        self.prefix_sums.clear();
        self.rank_by_customer.clear();
        let mut acc: Rank = 0;
        for (&key, set) in self.buckets.iter().rev() {
            self.prefix_sums.push((acc, key));
            for (pos, entry) in set.iter().enumerate() {
                self.rank_by_customer
                    .insert(entry.customer_id, acc + pos as Rank + 1);
            }
            acc += set.len() as Rank;
        }
        self.total_ranked = acc;
    }

    /// Entries at ranks `[start, end]` out of this snapshot.
    fn read_range(&self, start: Rank, end: Rank) -> Vec<RankEntry> {
        if start == 0 || end < start || start > self.total_ranked {
            return Vec::new();
        }
        let end = end.min(self.total_ranked);
        // bucket containing `start`: the last one starting at or before it
        let idx = self
            .prefix_sums
            .partition_point(|&(starting, _)| starting < start)
            .saturating_sub(1);
        let mut out = Vec::with_capacity((end - start + 1) as usize);
        for &(starting, key) in &self.prefix_sums[idx..] {
            if starting + 1 > end {
                break;
            }
            let set = &self.buckets[&key];
            let skip = (start.max(starting + 1) - starting - 1) as usize;
            for (pos, entry) in set.iter().enumerate().skip(skip) {
                let rank = starting + pos as Rank + 1;
                if rank > end {
                    break;
                }
                out.push(RankEntry::new(entry.customer_id, entry.score, rank));
            }
        }
        out
    }
}

struct SnapshotShared {
    realtime: DashMap<CustomerId, Score>,
    queue: Mutex<Vec<(CustomerId, Score)>>,
    pending: AtomicUsize,
    state: RwLock<SnapshotState>,
    ticks: AtomicU64,
    drained: AtomicU64,
    coalesced: AtomicU64,
    last_tick_micros: AtomicU64,
}

impl SnapshotShared {
    /// Drain, coalesce, apply, and rebuild the read caches. No-op when the
    /// queue is empty.
    fn rebuild_tick(&self) {
        if self.pending.load(Ordering::Acquire) == 0 {
            return;
        }
        let started = Instant::now();
        let batch = std::mem::take(&mut *self.queue.lock());
        if batch.is_empty() {
            return;
        }
        self.pending.fetch_sub(batch.len(), Ordering::Release);

        let mut net: FxHashMap<CustomerId, Score> = FxHashMap::default();
        for &(customer_id, delta) in &batch {
            *net.entry(customer_id).or_insert(0) += delta;
        }

        {
            let mut state = self.state.write();
            for (&customer_id, &net_delta) in &net {
                state.apply(customer_id, net_delta);
            }
            state.rebuild_caches();
        }

        self.ticks.fetch_add(1, Ordering::Relaxed);
        self.drained.fetch_add(batch.len() as u64, Ordering::Relaxed);
        self.coalesced.fetch_add(net.len() as u64, Ordering::Relaxed);
        self.last_tick_micros
            .store(started.elapsed().as_micros() as u64, Ordering::Relaxed);
        debug!(
            drained = batch.len(),
            coalesced = net.len(),
            "snapshot rebuilt"
        );
    }
}

/// The eventually-consistent index implementation.
///
/// Dropping the index shuts the rebuild worker down and joins it; a
/// rebuild already in progress completes first.
pub struct SnapshotIndex {
    shared: Arc<SnapshotShared>,
    _worker: RebuildWorker,
}

impl SnapshotIndex {
    /// Create an index whose rebuild tick runs every `tick_interval`.
    pub fn new(tick_interval: Duration) -> Self {
        let shared = Arc::new(SnapshotShared {
            realtime: DashMap::new(),
            queue: Mutex::new(Vec::new()),
            pending: AtomicUsize::new(0),
            state: RwLock::new(SnapshotState::empty()),
            ticks: AtomicU64::new(0),
            drained: AtomicU64::new(0),
            coalesced: AtomicU64::new(0),
            last_tick_micros: AtomicU64::new(0),
        });
        let worker_shared = Arc::clone(&shared);
        let worker = RebuildWorker::spawn(tick_interval, move || worker_shared.rebuild_tick());
        Self {
            shared,
            _worker: worker,
        }
    }

    /// Create an index from a leaderboard configuration.
    pub fn from_config(config: &PodiumConfig) -> Self {
        Self::new(config.tick_interval())
    }

    /// Apply `delta`, returning the tentative total. The ranking observes
    /// the change after the next rebuild tick.
    pub fn update(&self, customer_id: CustomerId, delta: Score) -> Score {
        let new_score = {
            let mut slot = self.shared.realtime.entry(customer_id).or_insert(0);
            *slot += delta;
            *slot
        };
        self.shared.queue.lock().push((customer_id, delta));
        self.shared.pending.fetch_add(1, Ordering::Release);
        new_score
    }

    /// Entries at global ranks `[start, end]` out of the current snapshot.
    pub fn ranks_by_range(&self, start: Rank, end: Rank) -> Vec<RankEntry> {
        self.shared.state.read().read_range(start, end)
    }

    /// The window around a customer out of the current snapshot. A
    /// customer whose first positive total has not been committed yet
    /// reads as absent.
    pub fn ranks_by_customer(&self, customer_id: CustomerId, high: Rank, low: Rank) -> Vec<RankEntry> {
        let state = self.shared.state.read();
        let Some(&rank) = state.rank_by_customer.get(&customer_id) else {
            return Vec::new();
        };
        let start = rank.saturating_sub(high).max(1);
        let end = rank.saturating_add(low);
        state.read_range(start, end)
    }

    /// Current tentative score, queued deltas included.
    pub fn score_of(&self, customer_id: CustomerId) -> Option<Score> {
        self.shared.realtime.get(&customer_id).map(|s| *s)
    }

    /// Ranked population of the current snapshot.
    pub fn ranked_len(&self) -> usize {
        self.shared.state.read().total_ranked as usize
    }

    /// Updates queued but not yet applied by a rebuild tick.
    pub fn pending_updates(&self) -> usize {
        self.shared.pending.load(Ordering::Acquire)
    }

    /// Run a rebuild tick on the calling thread, making every queued
    /// update visible. Used by tests and shutdown paths that cannot wait
    /// out the tick interval.
    pub fn flush(&self) {
        self.shared.rebuild_tick();
    }

    /// Rebuild counters since construction.
    pub fn stats(&self) -> RebuildStats {
        RebuildStats {
            ticks: self.shared.ticks.load(Ordering::Relaxed),
            drained_updates: self.shared.drained.load(Ordering::Relaxed),
            coalesced_updates: self.shared.coalesced.load(Ordering::Relaxed),
            last_tick_micros: self.shared.last_tick_micros.load(Ordering::Relaxed),
        }
    }
}

impl RankedIndex for SnapshotIndex {
    fn update(&self, customer_id: CustomerId, delta: Score) -> Score {
        SnapshotIndex::update(self, customer_id, delta)
    }

    fn ranks_by_range(&self, start: Rank, end: Rank) -> Vec<RankEntry> {
        SnapshotIndex::ranks_by_range(self, start, end)
    }

    fn ranks_by_customer(&self, customer_id: CustomerId, high: Rank, low: Rank) -> Vec<RankEntry> {
        SnapshotIndex::ranks_by_customer(self, customer_id, high, low)
    }

    fn score_of(&self, customer_id: CustomerId) -> Option<Score> {
        SnapshotIndex::score_of(self, customer_id)
    }

    fn ranked_len(&self) -> usize {
        SnapshotIndex::ranked_len(self)
    }
}
