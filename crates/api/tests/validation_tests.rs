//! Boundary validation tests
//!
//! Everything the HTTP layer would reject must be rejected here, before
//! it can reach the engine; everything in-contract must pass through.

use podium_api::{Error, IndexBackend, Leaderboard, PodiumConfig, RankEntry};

fn board() -> Leaderboard {
    Leaderboard::open(PodiumConfig {
        rng_seed: Some(99),
        ..PodiumConfig::default()
    })
    .unwrap()
}

#[test]
fn non_positive_customer_ids_are_rejected() {
    let board = board();
    assert_eq!(board.update(0, 10), Err(Error::InvalidCustomerId(0)));
    assert_eq!(board.update(-5, 10), Err(Error::InvalidCustomerId(-5)));
    assert_eq!(
        board.ranks_by_customer(0, 1, 1),
        Err(Error::InvalidCustomerId(0))
    );
    assert_eq!(board.score_of(-1), Err(Error::InvalidCustomerId(-1)));
}

#[test]
fn deltas_beyond_the_cap_are_rejected() {
    let board = board();
    assert_eq!(
        board.update(1, 1_001),
        Err(Error::DeltaOutOfRange {
            delta: 1_001,
            max: 1_000
        })
    );
    assert_eq!(
        board.update(1, -1_001),
        Err(Error::DeltaOutOfRange {
            delta: -1_001,
            max: 1_000
        })
    );
    // boundary magnitudes pass
    assert_eq!(board.update(1, 1_000), Ok(1_000));
    assert_eq!(board.update(1, -1_000), Ok(0));
}

#[test]
fn malformed_rank_ranges_are_rejected() {
    let board = board();
    assert_eq!(
        board.ranks_by_range(0, 5),
        Err(Error::InvalidRankRange { start: 0, end: 5 })
    );
    assert_eq!(
        board.ranks_by_range(5, 1),
        Err(Error::InvalidRankRange { start: 5, end: 1 })
    );
    // a well-formed range past the population is empty, not an error
    assert_eq!(board.ranks_by_range(1, 1), Ok(vec![]));
    assert_eq!(board.ranks_by_range(100, 200), Ok(vec![]));
}

#[test]
fn zero_width_windows_are_valid() {
    let board = board();
    board.update(7, 300).unwrap();
    assert_eq!(
        board.ranks_by_customer(7, 0, 0),
        Ok(vec![RankEntry::new(7, 300, 1)])
    );
}

#[test]
fn unknown_customer_window_is_empty_not_an_error() {
    let board = board();
    assert_eq!(board.ranks_by_customer(999, 2, 2), Ok(vec![]));
    assert_eq!(board.score_of(999), Ok(None));
}

#[test]
fn rejected_updates_leave_no_trace() {
    let board = board();
    let _ = board.update(1, 2_000);
    assert_eq!(board.score_of(1), Ok(None));
    assert_eq!(board.ranked_len(), 0);
    assert!(board.is_empty());
}

#[test]
fn rows_serialize_to_the_http_shape() {
    let board = board();
    board.update(3, 500).unwrap();
    board.update(8, 900).unwrap();
    let rows = board.ranks_by_range(1, 2).unwrap();
    let json = serde_json::to_string(&rows).unwrap();
    assert_eq!(
        json,
        r#"[{"customerId":8,"score":900,"rank":1},{"customerId":3,"score":500,"rank":2}]"#
    );
}

#[test]
fn validation_applies_to_both_backends() {
    let board = Leaderboard::open(PodiumConfig {
        backend: IndexBackend::Snapshot,
        tick_interval_ms: 3_600_000,
        rng_seed: Some(1),
    })
    .unwrap();
    assert!(board.update(0, 10).is_err());
    assert!(board.update(1, 1_001).is_err());
    assert!(board.ranks_by_range(5, 1).is_err());
    assert_eq!(board.update(1, 10), Ok(10));
}
