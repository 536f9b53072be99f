//! Criterion micro-benchmarks for arena allocate, free, resize, and churn.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use strata_arena::{local, Arena};
use strata_bench::{churn_workload, fill, run_workload};

const CAPACITY: usize = 128 * 1024;

fn make_arena() -> Arena {
    Arena::with_capacity(CAPACITY).unwrap()
}

/// Benchmark: allocate then free the tail block (carve + release path).
fn bench_alloc_free_tail(c: &mut Criterion) {
    let mut arena = make_arena();
    c.bench_function("alloc_free_tail", |b| {
        b.iter(|| {
            let h = arena.allocate(black_box(64)).unwrap();
            arena.free(h).unwrap();
        });
    });
}

/// Benchmark: allocate then free behind a pinned tail (free-list path).
fn bench_alloc_free_list(c: &mut Criterion) {
    let mut arena = make_arena();
    let first = arena.allocate(64).unwrap();
    let _pin = arena.allocate(16).unwrap();
    arena.free(first).unwrap();

    c.bench_function("alloc_free_list", |b| {
        b.iter(|| {
            let h = arena.allocate(black_box(64)).unwrap();
            arena.free(h).unwrap();
        });
    });
}

/// Benchmark: carve 64-byte blocks to capacity, then free them in reverse.
fn bench_fill_drain(c: &mut Criterion) {
    let mut arena = make_arena();
    c.bench_function("fill_drain_64b", |b| {
        b.iter(|| {
            let handles = fill(&mut arena, 64);
            for h in handles.into_iter().rev() {
                arena.free(h).unwrap();
            }
            black_box(arena.offset());
        });
    });
}

/// Benchmark: free every other block, then the rest (two merges per free).
fn bench_coalesce(c: &mut Criterion) {
    let mut arena = make_arena();
    c.bench_function("coalesce_interleaved", |b| {
        b.iter(|| {
            let handles = fill(&mut arena, 48);
            for h in handles.iter().step_by(2) {
                arena.free(*h).unwrap();
            }
            for h in handles.iter().skip(1).step_by(2) {
                arena.free(*h).unwrap();
            }
            black_box(arena.stats());
            arena.reset();
        });
    });
}

/// Benchmark: grow a block in 16-byte steps through resize.
fn bench_resize_grow(c: &mut Criterion) {
    let mut arena = make_arena();
    c.bench_function("resize_grow_16_to_1k", |b| {
        b.iter(|| {
            let mut h = arena.allocate(16).unwrap();
            for size in (32..=1024).step_by(16) {
                h = arena.resize(h, size).unwrap();
            }
            arena.free(h).unwrap();
        });
    });
}

/// Benchmark: replay a 10K-op deterministic churn stream.
fn bench_churn_10k(c: &mut Criterion) {
    let ops = churn_workload(42, 10_000, 512);
    let mut arena = make_arena();
    c.bench_function("churn_10k", |b| {
        b.iter(|| {
            let report = run_workload(&mut arena, &ops);
            black_box(report);
        });
    });
}

/// Benchmark: thread-scoped surface round trip.
fn bench_local_round_trip(c: &mut Criterion) {
    c.bench_function("local_alloc_free", |b| {
        b.iter(|| {
            let h = local::allocate(black_box(64));
            local::free(h);
        });
    });
}

criterion_group!(
    benches,
    bench_alloc_free_tail,
    bench_alloc_free_list,
    bench_fill_drain,
    bench_coalesce,
    bench_resize_grow,
    bench_churn_10k,
    bench_local_round_trip
);
criterion_main!(benches);
