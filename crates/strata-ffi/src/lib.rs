//! C ABI for the strata thread-scoped arena.
//!
//! Exposes the allocate/free/resize/error-query surface to C callers over
//! opaque `u64` handles (`0` is the null handle). Every call operates on
//! the calling thread's arena; a handle must only be passed back on the
//! thread that produced it.
//!
//! This is the only strata crate that contains `unsafe` code, confined to
//! the raw-pointer copies behind `strata_write`, `strata_read`,
//! `strata_stats`, and `strata_last_panic_message`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

use std::any::Any;
use std::cell::RefCell;
use std::ffi::c_char;

/// Run an FFI body, turning a panic into `$fallback`.
///
/// The panic message is kept for [`strata_last_panic_message`].
macro_rules! ffi_guard_or {
    ($fallback:expr, $body:block) => {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $body)) {
            Ok(value) => value,
            Err(payload) => {
                $crate::record_panic(payload);
                $fallback
            }
        }
    };
}

/// [`ffi_guard_or!`] for bodies returning a status code.
macro_rules! ffi_guard {
    ($body:block) => {
        ffi_guard_or!($crate::status::StrataStatus::Panicked as i32, $body)
    };
}

pub mod alloc;
pub mod error;
mod handle;
pub mod stats;
pub mod status;

pub use status::StrataStatus;

thread_local! {
    /// Message of the most recent panic caught on this thread.
    pub(crate) static LAST_PANIC: RefCell<String> = const { RefCell::new(String::new()) };
}

pub(crate) fn record_panic(payload: Box<dyn Any + Send>) {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    };
    LAST_PANIC.with(|cell| *cell.borrow_mut() = message);
}

/// Copy the last caught panic message into `buf`.
///
/// Returns the full message length in bytes (without terminator), or 0 if
/// no panic was caught on this thread. If `buf` is non-null, up to
/// `cap - 1` bytes are copied and NUL-terminated. Pass a null `buf` to
/// query the length.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_last_panic_message(buf: *mut c_char, cap: usize) -> i32 {
    LAST_PANIC.with(|cell| {
        let message = cell.borrow();
        let bytes = message.as_bytes();
        if !buf.is_null() && cap > 0 {
            let n = bytes.len().min(cap - 1);
            // SAFETY: buf is valid for cap bytes per caller contract and
            // n < cap leaves room for the terminator.
            unsafe {
                std::ptr::copy_nonoverlapping(bytes.as_ptr(), buf.cast::<u8>(), n);
                *buf.add(n) = 0;
            }
        }
        i32::try_from(bytes.len()).unwrap_or(i32::MAX)
    })
}
