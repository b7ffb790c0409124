//! Contention scaling benchmarks
//!
//! Measures update throughput under various contention patterns:
//! - Disjoint customers: each thread updates its own id range
//! - Hot customer: all threads hammer one id (maximum contention)
//! - Mixed: concurrent writers and range readers
//!
//! Run with: cargo bench --bench contention

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use podium::{IndexBackend, Leaderboard, PodiumConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

const ITERATIONS_PER_THREAD: usize = 1_000;

fn bucketed() -> Arc<Leaderboard> {
    Arc::new(Leaderboard::with_defaults())
}

fn snapshot() -> Arc<Leaderboard> {
    Arc::new(
        Leaderboard::open(PodiumConfig {
            backend: IndexBackend::Snapshot,
            ..PodiumConfig::default()
        })
        .expect("valid config"),
    )
}

/// Disjoint pattern - each thread updates its own customers
fn bench_disjoint_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("contention/disjoint");
    group.measurement_time(Duration::from_secs(10));
    group.throughput(Throughput::Elements(ITERATIONS_PER_THREAD as u64));

    for threads in [1, 2, 4, 8] {
        group.bench_function(BenchmarkId::new("updates", threads), |b| {
            b.iter(|| {
                let board = bucketed();
                let handles: Vec<_> = (0..threads)
                    .map(|t| {
                        let board = Arc::clone(&board);
                        std::thread::spawn(move || {
                            let base = (t * ITERATIONS_PER_THREAD) as i64;
                            for i in 0..ITERATIONS_PER_THREAD {
                                board.update(base + i as i64 + 1, 500).unwrap();
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
            });
        });
    }
    group.finish();
}

/// Hot-customer pattern - all threads update the same id
fn bench_hot_customer_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("contention/hot_customer");
    group.measurement_time(Duration::from_secs(10));
    group.throughput(Throughput::Elements(ITERATIONS_PER_THREAD as u64));

    for threads in [1, 2, 4, 8] {
        group.bench_function(BenchmarkId::new("updates", threads), |b| {
            b.iter(|| {
                let board = bucketed();
                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let board = Arc::clone(&board);
                        std::thread::spawn(move || {
                            for _ in 0..ITERATIONS_PER_THREAD {
                                board.update(1, 10).unwrap();
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
            });
        });
    }
    group.finish();
}

/// Snapshot backend absorbs the same hot-customer load through its queue
fn bench_snapshot_hot_customer(c: &mut Criterion) {
    let mut group = c.benchmark_group("contention/snapshot_hot_customer");
    group.measurement_time(Duration::from_secs(10));
    group.throughput(Throughput::Elements(ITERATIONS_PER_THREAD as u64));

    for threads in [1, 4, 8] {
        group.bench_function(BenchmarkId::new("updates", threads), |b| {
            b.iter(|| {
                let board = snapshot();
                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let board = Arc::clone(&board);
                        std::thread::spawn(move || {
                            for _ in 0..ITERATIONS_PER_THREAD {
                                board.update(1, 10).unwrap();
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
            });
        });
    }
    group.finish();
}

/// Writers churning while readers page through the top of the board
fn bench_mixed_read_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("contention/mixed");
    group.measurement_time(Duration::from_secs(10));
    group.throughput(Throughput::Elements(ITERATIONS_PER_THREAD as u64));

    group.bench_function("reads_vs_4_writers", |b| {
        b.iter_custom(|iters| {
            let board = bucketed();
            for id in 1..=2_000 {
                board.update(id, (id % 1_000) + 1).unwrap();
            }
            let stop = Arc::new(AtomicBool::new(false));
            let writers: Vec<_> = (0..4)
                .map(|t| {
                    let board = Arc::clone(&board);
                    let stop = Arc::clone(&stop);
                    std::thread::spawn(move || {
                        let mut i = 0i64;
                        while !stop.load(Ordering::Relaxed) {
                            board.update(1 + (t as i64 * 997 + i) % 2_000, 100).unwrap();
                            i += 1;
                        }
                    })
                })
                .collect();

            let started = std::time::Instant::now();
            for i in 0..iters {
                let start = 1 + (i as u32 % 100) * 10;
                let rows = board.ranks_by_range(start, start + 9).unwrap();
                criterion::black_box(rows);
            }
            let elapsed = started.elapsed();

            stop.store(true, Ordering::Relaxed);
            for writer in writers {
                writer.join().unwrap();
            }
            elapsed
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_disjoint_scaling,
    bench_hot_customer_scaling,
    bench_snapshot_hot_customer,
    bench_mixed_read_write
);
criterion_main!(benches);
