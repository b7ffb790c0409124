//! # Podium
//!
//! A concurrent real-time leaderboard over an open set of customers.
//! Updates apply a signed delta to a customer's accumulated score; reads
//! return contiguous slices of the global ranking or a window centered on
//! one customer, with O(log n) rank lookups under mixed read/write load.
//!
//! # Quick Start
//!
//! ```
//! use podium::{Leaderboard, PodiumConfig};
//!
//! fn main() -> podium::Result<()> {
//!     let board = Leaderboard::open(PodiumConfig::default())?;
//!
//!     board.update(1, 100)?;
//!     board.update(2, 250)?;
//!     assert_eq!(board.update(1, 50)?, 150);
//!
//!     // top of the leaderboard
//!     let top = board.ranks_by_range(1, 10)?;
//!     assert_eq!(top[0].customer_id, 2);
//!     assert_eq!(top[0].rank, 1);
//!
//!     // one entry above and below customer 1
//!     let window = board.ranks_by_customer(1, 1, 1)?;
//!     assert_eq!(window.len(), 2);
//!     Ok(())
//! }
//! ```
//!
//! # Backends
//!
//! | Backend | Consistency | Write path |
//! |---------|-------------|------------|
//! | `Bucketed` (default) | reads observe every completed update | fine-grained per-bucket locks |
//! | `Snapshot` | eventual, bounded by the tick interval | queued, coalesced, applied per tick |
//!
//! Customers with a non-positive accumulated score keep their score but do
//! not appear in the ranking.
//!
//! Internal crates (core, engine) are not exposed; only the api surface
//! re-exported here is stable.

// Re-export the public API from podium-api
pub use podium_api::*;
