//! C-compatible arena occupancy.

use strata_arena::{local, ArenaStats};

use crate::status::StrataStatus;

/// Occupancy of the calling thread's arena, filled by [`strata_stats`].
///
/// Fixed-width `u64` fields for ABI portability (not `usize`).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StrataArenaStats {
    /// Buffer size in bytes.
    pub capacity: u64,
    /// Bytes carved from the start of the buffer.
    pub carved_bytes: u64,
    /// Number of live blocks.
    pub live_blocks: u64,
    /// Bytes held by live blocks, headers included.
    pub live_bytes: u64,
    /// Number of blocks parked in free lists.
    pub free_blocks: u64,
    /// Bytes held by free blocks, headers included.
    pub free_bytes: u64,
}

// Compile-time layout assertions for ABI stability.
const _: () = assert!(std::mem::size_of::<StrataArenaStats>() == 48);
const _: () = assert!(std::mem::align_of::<StrataArenaStats>() == 8);

impl StrataArenaStats {
    pub(crate) fn from_rust(s: &ArenaStats) -> Self {
        Self {
            capacity: s.capacity as u64,
            carved_bytes: s.carved_bytes as u64,
            live_blocks: s.live_blocks as u64,
            live_bytes: s.live_bytes as u64,
            free_blocks: s.free_blocks as u64,
            free_bytes: s.free_bytes as u64,
        }
    }
}

/// Write the calling thread's arena occupancy to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_stats(out: *mut StrataArenaStats) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return StrataStatus::InvalidArgument as i32;
        }
        let stats = local::with_arena(|arena| StrataArenaStats::from_rust(&arena.stats()));
        // SAFETY: out is non-null and valid for writes per caller contract.
        unsafe { *out = stats };
        StrataStatus::Ok as i32
    })
}
