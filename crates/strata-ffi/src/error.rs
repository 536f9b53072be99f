//! Last-error text for C callers.
//!
//! C has no use for a structured [`ArenaError`], so the thread's last error
//! is rendered once into a NUL-terminated string kept in a thread-local
//! cache. The returned pointer stays valid until a later call renders a
//! different error on the same thread.

use std::cell::RefCell;
use std::ffi::{c_char, CString};

use strata_arena::{local, ArenaError};

use crate::status::StrataStatus;

thread_local! {
    static ERROR_TEXT: RefCell<Option<(ArenaError, CString)>> = const { RefCell::new(None) };
}

/// Record `err` as this thread's last error and return its status code.
pub(crate) fn fail(err: ArenaError) -> i32 {
    let status = StrataStatus::from(&err);
    local::set_last_error(err);
    status as i32
}

/// Text of the most recent failure on this thread, or null if no operation
/// has failed yet (or the slot was cleared).
///
/// The slot is not reset by successful calls; only read it right after a
/// call reported failure.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_get_error() -> *const c_char {
    ffi_guard_or!(std::ptr::null(), {
        let Some(err) = local::last_error() else {
            return std::ptr::null();
        };
        ERROR_TEXT.with(|cell| {
            let mut cache = cell.borrow_mut();
            let fresh = !matches!(&*cache, Some((cached, _)) if *cached == err);
            if fresh {
                // Display output of ArenaError never contains NUL bytes.
                let text = CString::new(err.to_string()).unwrap_or_default();
                *cache = Some((err, text));
            }
            cache
                .as_ref()
                .map_or(std::ptr::null(), |(_, text)| text.as_ptr())
        })
    })
}

/// Empty this thread's last-error slot.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_clear_error() {
    ffi_guard_or!((), {
        local::clear_last_error();
    })
}
