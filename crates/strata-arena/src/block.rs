//! Block records, layout constants, and size-class arithmetic.
//!
//! Every block occupies `total_size` contiguous bytes of the arena buffer:
//! a reserved header region of [`HEADER_SIZE`] bytes followed by the
//! payload. The record describing the block lives in a `BlockTable`
//! keyed by the block's byte offset, not inside the buffer, so callers
//! writing through a payload slice can never corrupt allocator state.

use std::ops::{Index, IndexMut, Range};

use indexmap::IndexMap;

/// Alignment of every block offset, block size, and payload offset.
pub const ALIGNMENT: usize = 16;

/// Bytes reserved in front of each payload.
pub const HEADER_SIZE: usize = round_up(std::mem::size_of::<Block>());

/// Round `n` up to the next multiple of [`ALIGNMENT`].
pub const fn round_up(n: usize) -> usize {
    (n + ALIGNMENT - 1) & !(ALIGNMENT - 1)
}

/// Total block size (header plus rounded payload) for a payload request.
///
/// Zero-byte requests are served as one alignment unit. Returns `None` if
/// the computation overflows `usize`.
pub const fn total_size(payload: usize) -> Option<usize> {
    let payload = if payload == 0 { 1 } else { payload };
    match payload.checked_add(ALIGNMENT - 1) {
        Some(padded) => (padded & !(ALIGNMENT - 1)).checked_add(HEADER_SIZE),
        None => None,
    }
}

/// Size class of a block with the given total size.
///
/// Classes are linear: class `n` holds blocks whose payload region is
/// `(n + 1) * ALIGNMENT` bytes.
pub const fn size_class(total_size: usize) -> usize {
    (total_size - HEADER_SIZE) / ALIGNMENT - 1
}

/// Whether a block is handed out or parked in a free list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockState {
    /// Owned by a caller through a live handle.
    Live,
    /// Parked in the free list of its size class.
    Free,
}

/// Allocator bookkeeping for one carved block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Block {
    pub(crate) total_size: u32,
    pub(crate) state: BlockState,
    /// Address-order neighbours (block offsets).
    pub(crate) next: Option<u32>,
    pub(crate) prev: Option<u32>,
    /// Free-list neighbours within the block's size class.
    pub(crate) next_free: Option<u32>,
    pub(crate) prev_free: Option<u32>,
}

impl Block {
    /// A freshly carved live block appended after `prev`.
    pub(crate) fn carved(total_size: u32, prev: Option<u32>) -> Self {
        Self {
            total_size,
            state: BlockState::Live,
            next: None,
            prev,
            next_free: None,
            prev_free: None,
        }
    }

    pub(crate) fn class(&self) -> usize {
        size_class(self.total_size as usize)
    }

    pub(crate) fn is_free(&self) -> bool {
        self.state == BlockState::Free
    }
}

/// Byte range of the payload of a block starting at `offset`.
pub(crate) fn payload_range(offset: u32, total_size: u32) -> Range<usize> {
    let start = offset as usize + HEADER_SIZE;
    start..offset as usize + total_size as usize
}

/// Read-only view of a block, returned by arena introspection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockInfo {
    /// Byte offset of the block header within the arena buffer.
    pub offset: u32,
    /// Header plus payload bytes.
    pub total_size: u32,
    /// Live or free.
    pub state: BlockState,
    /// Offset of the next block in address order.
    pub next: Option<u32>,
    /// Offset of the previous block in address order.
    pub prev: Option<u32>,
}

impl BlockInfo {
    pub(crate) fn new(offset: u32, block: &Block) -> Self {
        Self {
            offset,
            total_size: block.total_size,
            state: block.state,
            next: block.next,
            prev: block.prev,
        }
    }

    /// Size class this block is indexed under.
    pub fn class(&self) -> usize {
        size_class(self.total_size as usize)
    }

    /// Byte offset of the payload within the arena buffer.
    pub fn payload_offset(&self) -> usize {
        self.offset as usize + HEADER_SIZE
    }

    /// Usable payload bytes.
    pub fn payload_len(&self) -> usize {
        self.total_size as usize - HEADER_SIZE
    }
}

/// Offset-keyed block records plus a per-offset generation counter.
///
/// Generations outlive the records: when a block is removed its slot keeps
/// the bumped generation, so a handle to a released block stays stale even
/// after the same offset is carved again.
pub(crate) struct BlockTable {
    records: IndexMap<u32, Block>,
    /// One counter per alignment unit of the buffer. Never zero.
    generations: Vec<u32>,
}

impl BlockTable {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            records: IndexMap::new(),
            generations: vec![1; capacity / ALIGNMENT],
        }
    }

    pub(crate) fn get(&self, offset: u32) -> Option<&Block> {
        self.records.get(&offset)
    }

    pub(crate) fn insert(&mut self, offset: u32, block: Block) {
        self.records.insert(offset, block);
    }

    pub(crate) fn remove(&mut self, offset: u32) -> Option<Block> {
        self.records.swap_remove(&offset)
    }

    /// Current generation of the slot at `offset`, or `None` if `offset` is
    /// not an aligned position inside the buffer.
    pub(crate) fn generation(&self, offset: u32) -> Option<u32> {
        if offset as usize % ALIGNMENT != 0 {
            return None;
        }
        self.generations.get(offset as usize / ALIGNMENT).copied()
    }

    /// Generation to stamp on a handle for the carved block at `offset`.
    pub(crate) fn current(&self, offset: u32) -> u32 {
        self.generations[offset as usize / ALIGNMENT]
    }

    /// Invalidate every handle issued for the block at `offset`.
    pub(crate) fn retire(&mut self, offset: u32) {
        let slot = &mut self.generations[offset as usize / ALIGNMENT];
        *slot = slot.wrapping_add(1).max(1);
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = &Block> {
        self.records.values()
    }

    /// Retire every live block and drop all records.
    pub(crate) fn clear(&mut self) {
        let live: Vec<u32> = self
            .records
            .iter()
            .filter(|(_, b)| b.state == BlockState::Live)
            .map(|(&offset, _)| offset)
            .collect();
        for offset in live {
            self.retire(offset);
        }
        self.records.clear();
    }
}

impl Index<u32> for BlockTable {
    type Output = Block;

    fn index(&self, offset: u32) -> &Block {
        &self.records[&offset]
    }
}

impl IndexMut<u32> for BlockTable {
    fn index_mut(&mut self, offset: u32) -> &mut Block {
        &mut self.records[&offset]
    }
}
