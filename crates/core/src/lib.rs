//! Core types and traits for podium
//!
//! This crate defines the foundational types used throughout the system:
//! - CustomerId / Score / Rank: scalar aliases
//! - Entry: the immutable (score, customer) pair stored in bucket trees
//! - RankEntry: a ranked leaderboard row
//! - Keyspace: the score-range partitioning policy
//! - Limits: operational limits enforced at the api boundary
//! - Error: validation error hierarchy
//! - RankedIndex: the trait both index implementations satisfy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod keyspace;
pub mod limits;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use keyspace::{BucketKey, Keyspace, ScoreRange};
pub use limits::{Limits, MAX_DELTA_MAGNITUDE};
pub use traits::RankedIndex;
pub use types::{CustomerId, Entry, Rank, RankEntry, Score};
