//! Block handles and arena identities.
//!
//! A [`BlockHandle`] names a block by (arena, offset, generation). The
//! generation allows O(1) staleness checks: every time a block stops being
//! live its slot generation is bumped, so double frees and use-after-free
//! are rejected instead of corrupting the free lists.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::block::HEADER_SIZE;

/// Process-unique identity of an [`Arena`](crate::arena::Arena).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ArenaId(u32);

impl ArenaId {
    /// Allocate a fresh identity.
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ArenaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArenaId({})", self.0)
    }
}

/// Reference to one allocation inside an arena.
///
/// Handles are plain values: copying one does not extend the block's
/// lifetime, and a handle to a freed block simply fails validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use]
pub struct BlockHandle {
    pub(crate) arena: ArenaId,
    /// Byte offset of the block header within the arena buffer.
    pub(crate) offset: u32,
    pub(crate) generation: u32,
}

impl BlockHandle {
    pub(crate) fn new(arena: ArenaId, offset: u32, generation: u32) -> Self {
        Self {
            arena,
            offset,
            generation,
        }
    }

    /// The arena that issued this handle.
    pub fn arena(&self) -> ArenaId {
        self.arena
    }

    /// Byte offset of the block within the arena buffer.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Slot generation at the time the handle was issued.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Byte offset of the payload within the arena buffer.
    pub fn payload_offset(&self) -> usize {
        self.offset as usize + HEADER_SIZE
    }
}

impl fmt::Display for BlockHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BlockHandle(arena={}, off={}, gen={})",
            self.arena.0, self.offset, self.generation
        )
    }
}
