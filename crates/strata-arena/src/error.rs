//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// Why a [`BlockHandle`](crate::handle::BlockHandle) was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidHandle {
    /// No handle was supplied (the null pointer of the C surface).
    Null,
    /// The handle was issued by a different arena.
    ForeignArena,
    /// The handle's offset is not the start of any block in this arena.
    UnknownBlock,
    /// The block was freed, released, or resized since the handle was issued.
    Stale,
}

impl fmt::Display for InvalidHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null handle"),
            Self::ForeignArena => f.write_str("handle belongs to another arena"),
            Self::UnknownBlock => f.write_str("handle does not name a block"),
            Self::Stale => f.write_str("handle is stale (block is no longer live)"),
        }
    }
}

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The request needs a size class beyond the arena's largest class.
    SizeTooLarge {
        /// Payload bytes requested.
        requested: usize,
        /// Largest payload this arena can ever serve.
        max: usize,
    },
    /// No free block of the needed class exists and the bump offset
    /// cannot fit a new block.
    ArenaFull {
        /// Total block bytes (header included) the request needs.
        required: usize,
        /// Uncarved bytes left at the end of the buffer.
        remaining: usize,
    },
    /// The handle does not refer to a live block of this arena.
    InvalidArgument {
        /// Which check rejected the handle.
        reason: InvalidHandle,
    },
    /// A payload copy would run past the end of the block.
    OutOfBounds {
        /// Bytes the caller tried to copy.
        requested: usize,
        /// Usable payload bytes of the block.
        available: usize,
    },
    /// A payload copy was given no buffer to copy from or into.
    NullBuffer {
        /// Bytes the caller asked to copy.
        len: usize,
    },
    /// Arena configuration failed validation.
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
}

/// Coarse classification of an [`ArenaError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`ArenaError::SizeTooLarge`].
    SizeTooLarge,
    /// See [`ArenaError::ArenaFull`].
    ArenaFull,
    /// See [`ArenaError::InvalidArgument`], [`ArenaError::OutOfBounds`],
    /// and [`ArenaError::NullBuffer`].
    InvalidArgument,
    /// See [`ArenaError::InvalidConfig`].
    InvalidConfig,
}

impl ArenaError {
    pub(crate) fn invalid(reason: InvalidHandle) -> Self {
        Self::InvalidArgument { reason }
    }

    /// The error for a missing handle.
    pub fn null_handle() -> Self {
        Self::invalid(InvalidHandle::Null)
    }

    /// Coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SizeTooLarge { .. } => ErrorKind::SizeTooLarge,
            Self::ArenaFull { .. } => ErrorKind::ArenaFull,
            Self::InvalidArgument { .. } | Self::OutOfBounds { .. } | Self::NullBuffer { .. } => {
                ErrorKind::InvalidArgument
            }
            Self::InvalidConfig { .. } => ErrorKind::InvalidConfig,
        }
    }
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeTooLarge { requested, max } => {
                write!(
                    f,
                    "size too large: requested {requested} bytes, largest payload is {max} bytes"
                )
            }
            Self::ArenaFull {
                required,
                remaining,
            } => {
                write!(
                    f,
                    "arena is full: block needs {required} bytes, {remaining} bytes remaining"
                )
            }
            Self::InvalidArgument { reason } => {
                write!(f, "invalid argument: {reason}")
            }
            Self::OutOfBounds {
                requested,
                available,
            } => {
                write!(
                    f,
                    "payload access out of bounds: requested {requested} bytes, block holds {available} bytes"
                )
            }
            Self::NullBuffer { len } => {
                write!(f, "invalid argument: null buffer ({len} bytes to copy)")
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid arena config: {reason}")
            }
        }
    }
}

impl Error for ArenaError {}
