//! The arena store and its block allocator.
//!
//! [`Arena`] owns a fixed byte buffer and serves allocations from it in
//! strict priority order:
//!
//! 1. pop the most recently freed block of the exact size class, else
//! 2. carve a new block at the bump offset, else
//! 3. fail with [`ArenaError::ArenaFull`].
//!
//! Freeing the block at the end of the carved region hands its bytes back
//! to raw space. Freeing any other block parks it in its class's free list
//! and merges it with free address-order neighbours.
//!
//! ```text
//! buffer: [ A | B (free) | C | D (free) |      raw      ]
//!           ^                            ^               ^
//!           0                          offset         capacity
//! chain:  A <-> B <-> C <-> D            (tail = D)
//! ```

use std::cmp;

use tracing::{debug, trace};

use crate::block::{
    payload_range, size_class, total_size, Block, BlockInfo, BlockTable, HEADER_SIZE,
};
use crate::config::ArenaConfig;
use crate::error::{ArenaError, InvalidHandle};
use crate::free_list::FreeLists;
use crate::handle::{ArenaId, BlockHandle};

/// Point-in-time occupancy of an arena.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    /// Buffer size in bytes.
    pub capacity: usize,
    /// Bytes between the start of the buffer and the bump offset.
    pub carved_bytes: usize,
    /// Number of blocks handed out to callers.
    pub live_blocks: usize,
    /// Bytes (headers included) held by live blocks.
    pub live_bytes: usize,
    /// Number of blocks parked in free lists.
    pub free_blocks: usize,
    /// Bytes (headers included) held by free blocks.
    pub free_bytes: usize,
}

/// Fixed-capacity arena with size-class free lists.
///
/// An arena is owned by exactly one context; every operation takes
/// `&mut self`, so no synchronisation is involved. See the
/// [`local`](crate::local) module for the per-thread instance.
pub struct Arena {
    id: ArenaId,
    buffer: Box<[u8]>,
    /// Bump offset: bytes carved from the start of `buffer`.
    offset: u32,
    /// Last block in address order.
    tail: Option<u32>,
    blocks: BlockTable,
    free_lists: FreeLists,
    config: ArenaConfig,
}

fn rejected(op: &'static str, err: ArenaError) -> ArenaError {
    debug!(op, error = %err, "arena operation rejected");
    err
}

impl Arena {
    /// Create an arena with the given configuration.
    ///
    /// Returns `Err(ArenaError::InvalidConfig)` if the capacity is not
    /// usable (see [`ArenaConfig::validate`]).
    pub fn new(config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    /// Create an arena of `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Result<Self, ArenaError> {
        Self::new(ArenaConfig::new(capacity))
    }

    fn from_validated(config: ArenaConfig) -> Self {
        Self {
            id: ArenaId::next(),
            buffer: vec![0; config.capacity].into_boxed_slice(),
            offset: 0,
            tail: None,
            blocks: BlockTable::new(config.capacity),
            free_lists: FreeLists::new(config.class_count()),
            config,
        }
    }

    /// This arena's identity, carried by every handle it issues.
    pub fn id(&self) -> ArenaId {
        self.id
    }

    /// The configuration the arena was built with.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Buffer size in bytes.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes carved so far (the bump offset).
    pub fn offset(&self) -> usize {
        self.offset as usize
    }

    /// Uncarved bytes left at the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.offset as usize
    }

    /// Number of size classes.
    pub fn class_count(&self) -> usize {
        self.config.class_count()
    }

    /// Last block in address order, if any block is carved.
    pub fn tail(&self) -> Option<BlockInfo> {
        self.tail.and_then(|offset| self.block_at(offset))
    }

    /// The block starting at `offset`, live or free.
    pub fn block_at(&self, offset: u32) -> Option<BlockInfo> {
        self.blocks
            .get(offset)
            .map(|block| BlockInfo::new(offset, block))
    }

    /// The live block behind `handle`.
    pub fn block(&self, handle: BlockHandle) -> Result<BlockInfo, ArenaError> {
        let offset = self.validate(handle)?;
        Ok(BlockInfo::new(offset, &self.blocks[offset]))
    }

    /// All carved blocks in address order.
    pub fn blocks(&self) -> impl Iterator<Item = BlockInfo> + '_ {
        // The first carved block always sits at offset 0: it can only leave
        // the chain by being released as the tail.
        let head = self.tail.map(|_| 0u32);
        std::iter::successors(head, move |&offset| {
            self.blocks.get(offset).and_then(|b| b.next)
        })
        .filter_map(move |offset| self.block_at(offset))
    }

    /// Free blocks of `class`, most recently freed first.
    pub fn free_list(&self, class: usize) -> impl Iterator<Item = BlockInfo> + '_ {
        self.free_lists
            .iter(&self.blocks, class)
            .filter_map(move |offset| self.block_at(offset))
    }

    /// Number of live blocks.
    pub fn live_count(&self) -> usize {
        self.blocks.values().filter(|b| !b.is_free()).count()
    }

    /// Number of blocks parked in free lists.
    pub fn free_count(&self) -> usize {
        self.blocks.len() - self.live_count()
    }

    /// Occupancy summary.
    pub fn stats(&self) -> ArenaStats {
        let mut stats = ArenaStats {
            capacity: self.capacity(),
            carved_bytes: self.offset(),
            ..ArenaStats::default()
        };
        for block in self.blocks.values() {
            if block.is_free() {
                stats.free_blocks += 1;
                stats.free_bytes += block.total_size as usize;
            } else {
                stats.live_blocks += 1;
                stats.live_bytes += block.total_size as usize;
            }
        }
        stats
    }

    /// Build a handle for this arena from its raw parts.
    ///
    /// The handle is not checked here; operations validate it on use.
    /// Intended for bindings that carry handles as plain integers.
    pub fn handle_at(&self, offset: u32, generation: u32) -> BlockHandle {
        BlockHandle::new(self.id, offset, generation)
    }

    /// Current generation of the slot at `offset`, or `None` if `offset` is
    /// not an aligned position inside the buffer.
    ///
    /// Live blocks carry this generation in their handles; any handle with
    /// an older one is stale.
    pub fn generation_at(&self, offset: u32) -> Option<u32> {
        self.blocks.generation(offset)
    }

    /// Allocate a block with at least `size` payload bytes.
    ///
    /// The payload contents are unspecified (bytes of earlier blocks are
    /// not cleared); use [`Arena::allocate_zeroed`] for zeroed memory.
    pub fn allocate(&mut self, size: usize) -> Result<BlockHandle, ArenaError> {
        let total = self
            .required_total(size)
            .map_err(|e| rejected("allocate", e))?;
        let class = size_class(total);

        if let Some(offset) = self.free_lists.top(class) {
            self.free_lists.remove(&mut self.blocks, offset);
            trace!(offset, total_size = total, class, "reused free block");
            return Ok(self.issue(offset));
        }

        let remaining = self.remaining();
        if total > remaining {
            return Err(rejected(
                "allocate",
                ArenaError::ArenaFull {
                    required: total,
                    remaining,
                },
            ));
        }
        // total <= remaining <= capacity <= u32::MAX
        Ok(self.carve(total as u32))
    }

    /// Allocate like [`Arena::allocate`], then zero the whole payload.
    pub fn allocate_zeroed(&mut self, size: usize) -> Result<BlockHandle, ArenaError> {
        let handle = self.allocate(size)?;
        let offset = handle.offset;
        let range = payload_range(offset, self.blocks[offset].total_size);
        self.buffer[range].fill(0);
        Ok(handle)
    }

    /// Free the block behind `handle`.
    ///
    /// Fails with `ArenaError::InvalidArgument` and leaves the arena
    /// untouched if the handle is foreign, stale, or names no block.
    pub fn free(&mut self, handle: BlockHandle) -> Result<(), ArenaError> {
        let offset = self.validate(handle).map_err(|e| rejected("free", e))?;
        self.release(offset);
        Ok(())
    }

    /// Resize the block behind `handle` to hold `new_size` payload bytes.
    ///
    /// If the new size maps to the block's current total size the same
    /// handle is returned. Otherwise the old block is freed, a new one is
    /// allocated, and the first `min(old, new)` payload bytes are carried
    /// over. `old` is stale afterwards.
    ///
    /// A size beyond the largest class fails before anything is freed. If
    /// the new allocation fails with `ArenaFull`, the old block has already
    /// been freed.
    pub fn resize(
        &mut self,
        handle: BlockHandle,
        new_size: usize,
    ) -> Result<BlockHandle, ArenaError> {
        let old = self.validate(handle).map_err(|e| rejected("resize", e))?;
        let total = self
            .required_total(new_size)
            .map_err(|e| rejected("resize", e))?;
        let old_total = self.blocks[old].total_size;
        if old_total as usize == total {
            trace!(offset = old, total_size = total, "resized in place");
            return Ok(handle);
        }

        // Records live outside the buffer, so releasing the old block leaves
        // its payload bytes in place until they are copied below.
        let src = payload_range(old, old_total);
        self.release(old);
        let new = self.allocate(new_size)?;
        let dst = new.payload_offset();
        let keep = cmp::min(src.len(), total - HEADER_SIZE);
        if src.start != dst {
            self.buffer.copy_within(src.start..src.start + keep, dst);
        }
        trace!(from = old, to = new.offset, copied = keep, "resized block");
        Ok(new)
    }

    /// Payload bytes of the live block behind `handle`.
    pub fn payload(&self, handle: BlockHandle) -> Result<&[u8], ArenaError> {
        let offset = self.validate(handle)?;
        let range = payload_range(offset, self.blocks[offset].total_size);
        Ok(&self.buffer[range])
    }

    /// Mutable payload bytes of the live block behind `handle`.
    pub fn payload_mut(&mut self, handle: BlockHandle) -> Result<&mut [u8], ArenaError> {
        let offset = self.validate(handle)?;
        let range = payload_range(offset, self.blocks[offset].total_size);
        Ok(&mut self.buffer[range])
    }

    /// Usable payload bytes of the block behind `handle`.
    pub fn usable_size(&self, handle: BlockHandle) -> Result<usize, ArenaError> {
        self.block(handle).map(|info| info.payload_len())
    }

    /// Copy `bytes` to the start of the payload.
    pub fn write_bytes(&mut self, handle: BlockHandle, bytes: &[u8]) -> Result<(), ArenaError> {
        let payload = self.payload_mut(handle)?;
        if bytes.len() > payload.len() {
            return Err(ArenaError::OutOfBounds {
                requested: bytes.len(),
                available: payload.len(),
            });
        }
        payload[..bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Fill `out` from the start of the payload.
    pub fn read_bytes(&self, handle: BlockHandle, out: &mut [u8]) -> Result<(), ArenaError> {
        let payload = self.payload(handle)?;
        if out.len() > payload.len() {
            return Err(ArenaError::OutOfBounds {
                requested: out.len(),
                available: payload.len(),
            });
        }
        out.copy_from_slice(&payload[..out.len()]);
        Ok(())
    }

    /// Drop every block and return to the freshly created state.
    ///
    /// All outstanding handles become stale. The buffer is not zeroed.
    pub fn reset(&mut self) {
        self.blocks.clear();
        self.free_lists.clear();
        self.tail = None;
        self.offset = 0;
        trace!(arena = self.id.get(), "arena reset");
    }

    fn required_total(&self, size: usize) -> Result<usize, ArenaError> {
        let too_large = || ArenaError::SizeTooLarge {
            requested: size,
            max: self.config.max_payload(),
        };
        let total = total_size(size).ok_or_else(too_large)?;
        if size_class(total) >= self.config.class_count() {
            return Err(too_large());
        }
        Ok(total)
    }

    /// Resolve `handle` to the offset of a live block of this arena.
    fn validate(&self, handle: BlockHandle) -> Result<u32, ArenaError> {
        if handle.arena != self.id {
            return Err(ArenaError::invalid(InvalidHandle::ForeignArena));
        }
        let generation = self
            .blocks
            .generation(handle.offset)
            .ok_or_else(|| ArenaError::invalid(InvalidHandle::UnknownBlock))?;
        match self.blocks.get(handle.offset) {
            Some(block) if generation == handle.generation && !block.is_free() => {
                Ok(handle.offset)
            }
            None if generation == handle.generation => {
                Err(ArenaError::invalid(InvalidHandle::UnknownBlock))
            }
            _ => Err(ArenaError::invalid(InvalidHandle::Stale)),
        }
    }

    fn issue(&self, offset: u32) -> BlockHandle {
        BlockHandle::new(self.id, offset, self.blocks.current(offset))
    }

    fn carve(&mut self, total: u32) -> BlockHandle {
        let offset = self.offset;
        self.blocks.insert(offset, Block::carved(total, self.tail));
        if let Some(tail) = self.tail {
            self.blocks[tail].next = Some(offset);
        }
        self.tail = Some(offset);
        self.offset += total;
        trace!(offset, total_size = total, "carved block");
        self.issue(offset)
    }

    /// Take a validated live block out of service.
    fn release(&mut self, offset: u32) {
        self.blocks.retire(offset);

        if self.blocks[offset].next.is_none() {
            let total = self.blocks[offset].total_size;
            self.unlink(offset);
            self.blocks.remove(offset);
            self.offset -= total;
            trace!(offset, total_size = total, "released tail block");
            return;
        }

        self.free_lists.push(&mut self.blocks, offset);
        trace!(
            offset,
            total_size = self.blocks[offset].total_size,
            "parked free block"
        );
        self.coalesce(offset);
    }

    /// Merge the just-freed block at `offset` with free address neighbours.
    ///
    /// Only the immediate successor and predecessor are inspected.
    fn coalesce(&mut self, offset: u32) {
        if let Some(next) = self.blocks[offset].next {
            if self.blocks[next].is_free() {
                self.merge(offset, next);
            }
        }
        if let Some(prev) = self.blocks[offset].prev {
            if self.blocks[prev].is_free() {
                self.merge(prev, offset);
            }
        }
    }

    /// Fold the free block `absorbed` into its free predecessor `survivor`.
    fn merge(&mut self, survivor: u32, absorbed: u32) {
        self.free_lists.remove(&mut self.blocks, survivor);
        self.free_lists.remove(&mut self.blocks, absorbed);
        let extra = self.blocks[absorbed].total_size;
        self.unlink(absorbed);
        self.blocks.remove(absorbed);
        self.blocks[survivor].total_size += extra;
        self.free_lists.push(&mut self.blocks, survivor);
        trace!(
            offset = survivor,
            absorbed,
            total_size = self.blocks[survivor].total_size,
            class = self.blocks[survivor].class(),
            "coalesced free neighbours"
        );
    }

    /// Remove the block at `offset` from the address chain.
    fn unlink(&mut self, offset: u32) {
        let (next, prev) = {
            let block = &self.blocks[offset];
            (block.next, block.prev)
        };
        if self.tail == Some(offset) {
            self.tail = prev;
        }
        if let Some(next) = next {
            self.blocks[next].prev = prev;
        }
        if let Some(prev) = prev {
            self.blocks[prev].next = next;
        }
    }
}

impl Default for Arena {
    fn default() -> Self {
        // BUILD_CAPACITY is checked at compile time in `config`.
        Self::from_validated(ArenaConfig::default())
    }
}
