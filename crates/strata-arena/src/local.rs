//! Per-thread arena and last-error slot.
//!
//! Each thread lazily creates its own [`Arena`] with
//! [`ArenaConfig::BUILD_CAPACITY`](crate::config::ArenaConfig::BUILD_CAPACITY)
//! on first use; it is dropped when the thread exits. Failures are not
//! returned directly. Instead the operation yields `None` (or does
//! nothing, for [`free`]) and the error is stored in a thread-local slot
//! that [`last_error`] reads back. The slot is overwritten by every
//! failure and left untouched by successes, so only consult it right
//! after an operation reported failure.
//!
//! Handles from one thread's arena are rejected by every other thread's
//! arena with [`InvalidHandle::ForeignArena`](crate::error::InvalidHandle).

use std::cell::RefCell;

use crate::arena::Arena;
use crate::error::ArenaError;
use crate::handle::BlockHandle;

thread_local! {
    /// This thread's arena.
    static ARENA: RefCell<Arena> = RefCell::new(Arena::default());
    /// Most recent failure of a thread-scoped operation on this thread.
    static LAST_ERROR: RefCell<Option<ArenaError>> = const { RefCell::new(None) };
}

/// Run `f` with exclusive access to this thread's arena.
///
/// # Panics
///
/// Panics if called re-entrantly from inside `f` (including through the
/// other functions of this module).
pub fn with_arena<R>(f: impl FnOnce(&mut Arena) -> R) -> R {
    ARENA.with(|cell| f(&mut cell.borrow_mut()))
}

/// Store `err` as this thread's last error.
pub fn set_last_error(err: ArenaError) {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(err));
}

/// The most recent failure on this thread, if any.
pub fn last_error() -> Option<ArenaError> {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

/// Display text of [`last_error`].
pub fn last_error_message() -> Option<String> {
    LAST_ERROR.with(|slot| slot.borrow().as_ref().map(ToString::to_string))
}

/// Empty this thread's last-error slot.
pub fn clear_last_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

fn record<T>(result: Result<T, ArenaError>) -> Option<T> {
    result.map_err(set_last_error).ok()
}

/// Allocate `size` payload bytes from this thread's arena.
pub fn allocate(size: usize) -> Option<BlockHandle> {
    record(with_arena(|arena| arena.allocate(size)))
}

/// Like [`allocate`], with the payload zeroed.
pub fn allocate_zeroed(size: usize) -> Option<BlockHandle> {
    record(with_arena(|arena| arena.allocate_zeroed(size)))
}

/// Free a block of this thread's arena. `None` is recorded as an invalid
/// argument.
pub fn free(handle: Option<BlockHandle>) {
    let result = match handle {
        Some(handle) => with_arena(|arena| arena.free(handle)),
        None => Err(ArenaError::null_handle()),
    };
    record(result);
}

/// Resize a block of this thread's arena. See [`Arena::resize`].
pub fn resize(handle: Option<BlockHandle>, size: usize) -> Option<BlockHandle> {
    let result = match handle {
        Some(handle) => with_arena(|arena| arena.resize(handle, size)),
        None => Err(ArenaError::null_handle()),
    };
    record(result)
}
