//! Benchmark workloads for the strata arena.
//!
//! Provides deterministic operation streams for benchmarking and examples:
//!
//! - [`churn_workload`]: mixed allocate/free/resize stream from a ChaCha8 seed
//! - [`run_workload`]: replay a stream against an [`Arena`]
//! - [`fill`]: carve blocks of one size until the arena is full

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::prelude::*;
use rand::rngs::ChaCha8Rng;
use strata_arena::{Arena, BlockHandle};

/// One step of a synthetic workload.
///
/// Indices name a position in the replay's live set, taken modulo its
/// length, so any stream is valid against any arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    /// Allocate this many payload bytes.
    Allocate(usize),
    /// Free the live block at this index.
    Free(usize),
    /// Resize the live block at this index to this many bytes.
    Resize(usize, usize),
}

/// Counters collected by [`run_workload`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkloadReport {
    /// Successful allocations.
    pub allocated: usize,
    /// Successful frees.
    pub freed: usize,
    /// Successful resizes.
    pub resized: usize,
    /// Operations rejected by the arena.
    pub failures: usize,
    /// Highest bump offset observed.
    pub peak_offset: usize,
    /// Blocks still live at the end.
    pub live: usize,
}

/// Generate `len` operations with payload sizes in `1..=max_size`.
///
/// Roughly half the stream allocates, a third frees, and the rest resizes,
/// which keeps a typical arena between a quarter and three quarters full.
pub fn churn_workload(seed: u64, len: usize, max_size: usize) -> Vec<Op> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let max_size = max_size.max(1);
    (0..len)
        .map(|_| {
            let roll = rng.random_range(0..6u32);
            let index = rng.random_range(0..usize::MAX);
            let size = rng.random_range(1..=max_size);
            match roll {
                0..=2 => Op::Allocate(size),
                3 | 4 => Op::Free(index),
                _ => Op::Resize(index, size),
            }
        })
        .collect()
}

/// Replay `ops` against `arena`, then free whatever is still live.
pub fn run_workload(arena: &mut Arena, ops: &[Op]) -> WorkloadReport {
    let mut live: Vec<BlockHandle> = Vec::new();
    let mut report = WorkloadReport::default();

    for &op in ops {
        match op {
            Op::Allocate(size) => match arena.allocate(size) {
                Ok(h) => {
                    live.push(h);
                    report.allocated += 1;
                }
                Err(_) => report.failures += 1,
            },
            Op::Free(i) if !live.is_empty() => {
                let h = live.swap_remove(i % live.len());
                match arena.free(h) {
                    Ok(()) => report.freed += 1,
                    Err(_) => report.failures += 1,
                }
            }
            Op::Resize(i, size) if !live.is_empty() => {
                let slot = i % live.len();
                match arena.resize(live[slot], size) {
                    Ok(h) => {
                        live[slot] = h;
                        report.resized += 1;
                    }
                    Err(_) => {
                        // A failed move has already released the block.
                        let _ = live.swap_remove(slot);
                        report.failures += 1;
                    }
                }
            }
            Op::Free(_) | Op::Resize(..) => {}
        }
        report.peak_offset = report.peak_offset.max(arena.offset());
    }

    report.live = live.len();
    for h in live {
        // Handles in the live set are valid by construction.
        let _ = arena.free(h);
    }
    report
}

/// Allocate `size`-byte blocks until the arena refuses, returning them in
/// carve order.
pub fn fill(arena: &mut Arena, size: usize) -> Vec<BlockHandle> {
    let mut handles = Vec::new();
    while let Ok(h) = arena.allocate(size) {
        handles.push(h);
    }
    handles
}
