//! Allocation FFI: alloc, free, realloc, payload copies.
//!
//! The handle-returning calls report failure by returning the null handle
//! `0`; the reason is then available from `strata_get_error`. The copy
//! calls return a [`StrataStatus`] code and also record the reason.

use std::ffi::c_void;

use strata_arena::{local, ArenaError};

use crate::error::fail;
use crate::handle::{encode, lookup};
use crate::status::StrataStatus;

/// Allocate a block with at least `size` payload bytes.
///
/// Returns the block handle, or `0` on failure.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_alloc(size: usize) -> u64 {
    ffi_guard_or!(0, { local::allocate(size).map_or(0, encode) })
}

/// Like [`strata_alloc`], with the payload zeroed.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_alloc_zeroed(size: usize) -> u64 {
    ffi_guard_or!(0, { local::allocate_zeroed(size).map_or(0, encode) })
}

/// Free a block. Freeing `0`, a stale handle, an already freed handle, or
/// a handle produced on another thread records an invalid-handle error and
/// changes nothing.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_free(handle: u64) {
    ffi_guard_or!((), {
        match lookup(handle) {
            Ok(h) => local::free(Some(h)),
            Err(e) => {
                fail(e);
            }
        }
    })
}

/// Resize a block to hold `size` payload bytes.
///
/// Returns the (possibly unchanged) handle, or `0` on failure. On success
/// the first `min(old, new)` payload bytes are preserved and the old handle
/// must no longer be used unless it was returned. If the failure is
/// `ArenaFull` the old block has already been freed.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_realloc(handle: u64, size: usize) -> u64 {
    ffi_guard_or!(0, {
        match lookup(handle) {
            Ok(h) => local::resize(Some(h), size).map_or(0, encode),
            Err(e) => {
                fail(e);
                0
            }
        }
    })
}

/// Usable payload bytes of a block, or `0` for an invalid handle.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_usable_size(handle: u64) -> usize {
    ffi_guard_or!(0, {
        lookup(handle)
            .and_then(|h| local::with_arena(|arena| arena.usable_size(h)))
            .unwrap_or_else(|e| {
                fail(e);
                0
            })
    })
}

/// Copy `len` bytes from `src` to the start of the block's payload.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_write(handle: u64, src: *const c_void, len: usize) -> i32 {
    ffi_guard!({
        let handle = match lookup(handle) {
            Ok(h) => h,
            Err(e) => return fail(e),
        };
        if src.is_null() && len > 0 {
            return fail(ArenaError::NullBuffer { len });
        }
        let bytes: &[u8] = if len == 0 {
            &[]
        } else {
            // SAFETY: src is non-null and readable for len bytes per caller
            // contract. Arena memory is never exposed by pointer, so src
            // cannot alias the payload.
            unsafe { std::slice::from_raw_parts(src.cast::<u8>(), len) }
        };
        match local::with_arena(|arena| arena.write_bytes(handle, bytes)) {
            Ok(()) => StrataStatus::Ok as i32,
            Err(e) => fail(e),
        }
    })
}

/// Copy `len` bytes from the start of the block's payload into `dst`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_read(handle: u64, dst: *mut c_void, len: usize) -> i32 {
    ffi_guard!({
        let handle = match lookup(handle) {
            Ok(h) => h,
            Err(e) => return fail(e),
        };
        if dst.is_null() && len > 0 {
            return fail(ArenaError::NullBuffer { len });
        }
        let out: &mut [u8] = if len == 0 {
            &mut []
        } else {
            // SAFETY: dst is non-null and writable for len bytes per caller
            // contract.
            unsafe { std::slice::from_raw_parts_mut(dst.cast::<u8>(), len) }
        };
        match local::with_arena(|arena| arena.read_bytes(handle, out)) {
            Ok(()) => StrataStatus::Ok as i32,
            Err(e) => fail(e),
        }
    })
}
