//! Ranked index abstraction
//!
//! Both index implementations (fine-grained bucketed locking and the
//! eventually-consistent snapshot variant) satisfy this trait. Which one
//! backs a leaderboard is a startup-time configuration choice, never a
//! runtime one, so callers that want static dispatch can name the concrete
//! type and callers that want uniformity go through the trait.
//!
//! Thread safety: all methods take `&self` and must be safe to call
//! concurrently from multiple threads.

use crate::types::{CustomerId, Rank, RankEntry, Score};

/// A concurrent customer → score map with an ordered ranking over all
/// positive-scored customers.
///
/// Preconditions (positive customer id, delta magnitude, window sizes) are
/// enforced by the api layer; implementations may debug-assert them but do
/// not return errors.
pub trait RankedIndex: Send + Sync {
    /// Apply a signed delta to a customer's accumulated score, returning
    /// the post-update total.
    ///
    /// For the fine-grained index the ranking reflects the change before
    /// the call returns; the snapshot variant reflects it after the next
    /// rebuild tick.
    fn update(&self, customer_id: CustomerId, delta: Score) -> Score;

    /// Entries at global ranks `[start, end]` inclusive, 1-based, ascending
    /// by rank. Empty when `end < start` or `start` is past the ranked
    /// population.
    fn ranks_by_range(&self, start: Rank, end: Rank) -> Vec<RankEntry>;

    /// The window of `high` entries above and `low` entries below the given
    /// customer, the customer included. Empty when the customer is unknown
    /// or has a non-positive score.
    fn ranks_by_customer(&self, customer_id: CustomerId, high: Rank, low: Rank) -> Vec<RankEntry>;

    /// Current accumulated score, ranked or not. `None` for a customer that
    /// has never been updated.
    fn score_of(&self, customer_id: CustomerId) -> Option<Score>;

    /// Number of ranked (positive-score) customers.
    fn ranked_len(&self) -> usize;

    /// Whether the ranking is empty.
    fn is_empty(&self) -> bool {
        self.ranked_len() == 0
    }
}
