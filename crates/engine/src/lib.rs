//! Ranked index engine for podium
//!
//! This crate implements the two index backends behind the leaderboard
//! surface:
//! - BucketedIndex: fine-grained bucket locking, immediately consistent
//! - SnapshotIndex: queued writes, periodic rebuild, eventually consistent
//!
//! Supporting pieces:
//! - OrderStatisticTree: the per-bucket skip list with rank queries
//! - Bucket: one score-range shard behind a reader-writer lock
//! - RebuildWorker: the snapshot backend's background thread
//! - PodiumConfig: startup-time configuration, including backend choice

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bucket;
pub mod bucketed;
pub mod config;
pub mod ostree;
pub mod snapshot;

mod rebuild;

pub use bucket::{Bucket, BucketInner};
pub use bucketed::BucketedIndex;
pub use config::{IndexBackend, PodiumConfig, DEFAULT_TICK_INTERVAL_MS};
pub use ostree::OrderStatisticTree;
pub use snapshot::{RebuildStats, SnapshotIndex};
