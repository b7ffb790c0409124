//! Public api surface for podium
//!
//! Exposes the validated [`Leaderboard`] facade plus the types a caller
//! needs to configure it and consume its results. Everything an HTTP
//! layer would bind lives here; the engine and core crates are
//! implementation detail.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod leaderboard;

pub use leaderboard::Leaderboard;
pub use podium_core::{
    CustomerId, Entry, Error, Rank, RankEntry, RankedIndex, Result, Score, MAX_DELTA_MAGNITUDE,
};
pub use podium_engine::{IndexBackend, PodiumConfig, RebuildStats, DEFAULT_TICK_INTERVAL_MS};
