//! Error types for podium
//!
//! The ranked index itself exposes no fallible operations: every
//! precondition (positive customer id, delta magnitude, window shape) is
//! enforced at the api boundary, and an invariant breach inside the index is
//! a bug that panics rather than serving a corrupt ranking.
//!
//! This module defines the validation errors that the boundary returns.
//! We use `thiserror` for automatic `Display` and `Error` implementations.

use crate::types::{CustomerId, Rank, Score};
use thiserror::Error;

/// Result type alias for podium operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the validated api surface
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Customer ids must be positive
    #[error("customer id must be positive, got {0}")]
    InvalidCustomerId(CustomerId),

    /// Per-update delta magnitude is capped so a single update can only
    /// cross one bucket boundary
    #[error("score delta {delta} outside [-{max}, {max}]")]
    DeltaOutOfRange {
        /// The rejected delta
        delta: Score,
        /// Maximum permitted magnitude
        max: Score,
    },

    /// Rank ranges must satisfy 1 <= start <= end
    #[error("invalid rank range [{start}, {end}]")]
    InvalidRankRange {
        /// Requested start rank
        start: Rank,
        /// Requested end rank
        end: Rank,
    },

    /// A custom bucket bound table failed validation
    #[error("invalid keyspace: {0}")]
    InvalidKeyspace(String),

    /// Configuration rejected at construction time
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
