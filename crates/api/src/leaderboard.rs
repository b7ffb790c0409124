//! Validated leaderboard facade
//!
//! The surface an HTTP layer (or embedding process) consumes. Every
//! precondition the engine relies on is enforced here, so nothing below
//! this point returns errors; the engine implementations stay infallible.
//!
//! The backend is chosen once at construction from the configuration. Both
//! backends satisfy `RankedIndex`; the facade dispatches over a tagged
//! variant so the common case pays no dynamic call.

use podium_core::{CustomerId, Keyspace, Limits, Rank, RankEntry, RankedIndex, Result, Score};
use podium_core::Error;
use podium_engine::{BucketedIndex, IndexBackend, PodiumConfig, SnapshotIndex};
use tracing::debug;

enum Backend {
    Bucketed(BucketedIndex),
    Snapshot(SnapshotIndex),
}

/// A configured, validated leaderboard.
pub struct Leaderboard {
    backend: Backend,
    limits: Limits,
}

impl Leaderboard {
    /// Construct a leaderboard from `config`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` when the configuration fails
    /// validation.
    pub fn open(config: PodiumConfig) -> Result<Self> {
        config.validate()?;
        let limits = Limits::default();
        let keyspace = Keyspace::leaderboard();
        limits.validate_keyspace(&keyspace)?;
        let backend = match config.backend {
            IndexBackend::Bucketed => {
                Backend::Bucketed(BucketedIndex::new(keyspace, config.seed()))
            }
            IndexBackend::Snapshot => Backend::Snapshot(SnapshotIndex::from_config(&config)),
        };
        Ok(Self { backend, limits })
    }

    /// Construct a leaderboard with the default configuration.
    pub fn with_defaults() -> Self {
        Self::open(PodiumConfig::default()).expect("default configuration is valid")
    }

    fn index(&self) -> &dyn RankedIndex {
        match &self.backend {
            Backend::Bucketed(idx) => idx,
            Backend::Snapshot(idx) => idx,
        }
    }

    /// Which backend serves this leaderboard.
    pub fn backend_kind(&self) -> IndexBackend {
        match &self.backend {
            Backend::Bucketed(_) => IndexBackend::Bucketed,
            Backend::Snapshot(_) => IndexBackend::Snapshot,
        }
    }

    /// Apply a signed score delta, returning the new accumulated total.
    ///
    /// # Errors
    ///
    /// Rejects non-positive customer ids and deltas whose magnitude
    /// exceeds the configured cap.
    pub fn update(&self, customer_id: CustomerId, delta: Score) -> Result<Score> {
        self.limits.validate_customer_id(customer_id).map_err(log_rejected)?;
        self.limits.validate_delta(delta).map_err(log_rejected)?;
        match &self.backend {
            Backend::Bucketed(idx) => Ok(idx.update(customer_id, delta)),
            Backend::Snapshot(idx) => Ok(idx.update(customer_id, delta)),
        }
    }

    /// Entries at global ranks `[start, end]` inclusive.
    ///
    /// # Errors
    ///
    /// Rejects ranges that do not satisfy `1 <= start <= end`; an in-shape
    /// range past the ranked population returns an empty list, not an
    /// error.
    pub fn ranks_by_range(&self, start: Rank, end: Rank) -> Result<Vec<RankEntry>> {
        if start == 0 || end < start {
            return Err(log_rejected(Error::InvalidRankRange { start, end }));
        }
        match &self.backend {
            Backend::Bucketed(idx) => Ok(idx.ranks_by_range(start, end)),
            Backend::Snapshot(idx) => Ok(idx.ranks_by_range(start, end)),
        }
    }

    /// The window of `high` entries above and `low` entries below a
    /// customer, the customer included. An unknown or unranked customer
    /// yields an empty list.
    ///
    /// # Errors
    ///
    /// Rejects non-positive customer ids.
    pub fn ranks_by_customer(
        &self,
        customer_id: CustomerId,
        high: Rank,
        low: Rank,
    ) -> Result<Vec<RankEntry>> {
        self.limits.validate_customer_id(customer_id).map_err(log_rejected)?;
        match &self.backend {
            Backend::Bucketed(idx) => Ok(idx.ranks_by_customer(customer_id, high, low)),
            Backend::Snapshot(idx) => Ok(idx.ranks_by_customer(customer_id, high, low)),
        }
    }

    /// Current accumulated score of a customer, ranked or not.
    ///
    /// # Errors
    ///
    /// Rejects non-positive customer ids.
    pub fn score_of(&self, customer_id: CustomerId) -> Result<Option<Score>> {
        self.limits.validate_customer_id(customer_id).map_err(log_rejected)?;
        Ok(self.index().score_of(customer_id))
    }

    /// Number of ranked customers.
    pub fn ranked_len(&self) -> usize {
        self.index().ranked_len()
    }

    /// Whether the ranking holds no customers.
    pub fn is_empty(&self) -> bool {
        self.index().is_empty()
    }

    /// Make every acknowledged update visible to reads. The bucketed
    /// backend is already consistent; the snapshot backend runs a rebuild
    /// tick on the calling thread.
    pub fn flush(&self) {
        if let Backend::Snapshot(idx) = &self.backend {
            idx.flush();
        }
    }

    /// Rebuild counters for the snapshot backend; `None` for the bucketed
    /// one.
    pub fn rebuild_stats(&self) -> Option<podium_engine::RebuildStats> {
        match &self.backend {
            Backend::Snapshot(idx) => Some(idx.stats()),
            Backend::Bucketed(_) => None,
        }
    }
}

fn log_rejected(err: Error) -> Error {
    debug!(%err, "request rejected at the api boundary");
    err
}
