//! C-compatible status codes.
//!
//! [`StrataStatus`] is a `repr(i32)` enum covering every failure the C
//! surface can report. Conversion from [`ArenaError`] is provided.

use strata_arena::ArenaError;

/// C-compatible status code returned by the status-reporting FFI functions.
///
/// `Ok` = 0, all errors are negative. Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrataStatus {
    /// Success.
    Ok = 0,
    /// Handle is null, stale, or names no block of this thread's arena.
    InvalidHandle = -1,
    /// A pointer argument is null where data is required.
    InvalidArgument = -2,
    /// Requested size exceeds the largest size class.
    SizeTooLarge = -3,
    /// No free block fits and the arena has no raw space left.
    ArenaFull = -4,
    /// A payload copy would run past the end of the block.
    OutOfBounds = -5,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl From<&ArenaError> for StrataStatus {
    fn from(e: &ArenaError) -> Self {
        match e {
            ArenaError::InvalidArgument { .. } => StrataStatus::InvalidHandle,
            ArenaError::SizeTooLarge { .. } => StrataStatus::SizeTooLarge,
            ArenaError::ArenaFull { .. } => StrataStatus::ArenaFull,
            ArenaError::OutOfBounds { .. } => StrataStatus::OutOfBounds,
            ArenaError::NullBuffer { .. } | ArenaError::InvalidConfig { .. } => {
                StrataStatus::InvalidArgument
            }
        }
    }
}
