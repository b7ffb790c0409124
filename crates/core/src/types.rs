//! Core types for the podium ranked index
//!
//! This module defines the foundational types:
//! - CustomerId / Score / Rank: scalar aliases used across the system
//! - Entry: immutable (score, customer) pair, the unit stored in bucket trees
//! - RankEntry: a ranked row returned by read operations

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Identifier of a customer. Positive for every customer that exists;
/// the api layer rejects non-positive ids before they reach the core.
pub type CustomerId = i64;

/// Accumulated score of a customer. May be negative or zero, in which
/// case the customer is tracked for score retrieval but not ranked.
pub type Score = i64;

/// 1-based position in the global ranking.
pub type Rank = u32;

/// An immutable `(score, customer)` pair stored in bucket trees.
///
/// Entries order by descending score, then ascending customer id, so that
/// forward iteration over a tree yields leaderboard order. Two entries are
/// equal only when both fields match; customer uniqueness within the index
/// makes full duplicates impossible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entry {
    /// Accumulated score at the time the entry was inserted
    pub score: Score,
    /// Owning customer
    pub customer_id: CustomerId,
}

impl Entry {
    /// Create an entry
    pub fn new(score: Score, customer_id: CustomerId) -> Self {
        Self { score, customer_id }
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher score sorts first; ties broken by lower customer id
        other
            .score
            .cmp(&self.score)
            .then_with(|| self.customer_id.cmp(&other.customer_id))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, customer {})", self.score, self.customer_id)
    }
}

/// A ranked leaderboard row.
///
/// Serializes with camelCase field names, matching the JSON shape an HTTP
/// layer exposes (`customerId`, `score`, `rank`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankEntry {
    /// Owning customer
    pub customer_id: CustomerId,
    /// Accumulated score; always positive for returned rows
    pub score: Score,
    /// 1-based global rank
    pub rank: Rank,
}

impl RankEntry {
    /// Create a ranked row
    pub fn new(customer_id: CustomerId, score: Score, rank: Rank) -> Self {
        Self {
            customer_id,
            score,
            rank,
        }
    }
}

impl fmt::Display for RankEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} customer {} ({})",
            self.rank, self.customer_id, self.score
        )
    }
}
