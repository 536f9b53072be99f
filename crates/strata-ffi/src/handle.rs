//! Encoding of block handles as opaque `u64` values.
//!
//! Layout, high to low: 16-bit arena tag, 24-bit slot (block offset in
//! [`ALIGNMENT`] units), low 24 bits of the generation. The tag is never
//! zero, so no block encodes to `0`, which is reserved as the null handle.
//!
//! A raw handle is resolved against the calling thread's arena. The tag
//! lets that arena reject handles produced by another thread instead of
//! addressing its own block at the same offset. Tags repeat every 65535
//! arenas, and generations are compared modulo 2^24.

use strata_arena::{
    local, Arena, ArenaConfig, ArenaError, ArenaId, BlockHandle, InvalidHandle, ALIGNMENT,
};

const SLOT_BITS: u32 = 24;
const GENERATION_BITS: u32 = 24;
const GENERATION_MASK: u64 = (1 << GENERATION_BITS) - 1;
const SLOT_MASK: u64 = (1 << SLOT_BITS) - 1;

// Every aligned offset of the thread arena must fit the slot field.
const _: () = assert!(ArenaConfig::BUILD_CAPACITY / ALIGNMENT <= 1 << SLOT_BITS);

/// Non-zero 16-bit tag of an arena.
fn tag(id: ArenaId) -> u64 {
    u64::from(id.get().wrapping_sub(1) % 0xFFFF) + 1
}

/// Pack a handle into its C representation.
pub(crate) fn encode(handle: BlockHandle) -> u64 {
    let slot = u64::from(handle.offset()) / ALIGNMENT as u64;
    (tag(handle.arena()) << (SLOT_BITS + GENERATION_BITS))
        | (slot << GENERATION_BITS)
        | (u64::from(handle.generation()) & GENERATION_MASK)
}

/// Split a raw handle into (tag, offset, truncated generation). `None` for
/// the null handle.
pub(crate) fn decode(raw: u64) -> Option<(u64, u32, u32)> {
    if raw == 0 {
        return None;
    }
    let tag = raw >> (SLOT_BITS + GENERATION_BITS);
    let slot = (raw >> GENERATION_BITS) & SLOT_MASK;
    // slot < 2^24, so the offset stays below 2^28.
    let offset = (slot * ALIGNMENT as u64) as u32;
    Some((tag, offset, (raw & GENERATION_MASK) as u32))
}

fn resolve(
    arena: &Arena,
    tag_bits: u64,
    offset: u32,
    generation: u32,
) -> Result<BlockHandle, ArenaError> {
    if tag_bits != tag(arena.id()) {
        return Err(ArenaError::InvalidArgument {
            reason: InvalidHandle::ForeignArena,
        });
    }
    let full = match arena.generation_at(offset) {
        Some(current) if u64::from(current) & GENERATION_MASK == u64::from(generation) => current,
        _ => generation,
    };
    Ok(arena.handle_at(offset, full))
}

/// Resolve a raw handle against this thread's arena.
///
/// Null and foreign handles fail here. Otherwise the handle is not yet
/// validated; arena operations reject stale or unknown handles themselves.
pub(crate) fn lookup(raw: u64) -> Result<BlockHandle, ArenaError> {
    let (tag_bits, offset, generation) = decode(raw).ok_or_else(ArenaError::null_handle)?;
    local::with_arena(|arena| resolve(arena, tag_bits, offset, generation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_null() {
        assert_eq!(decode(0), None);
        assert_eq!(lookup(0), Err(ArenaError::null_handle()));
    }

    #[test]
    fn layout_is_tag_slot_generation() {
        assert_eq!(decode(0x0001_0000_0400_0003), Some((1, 64, 3)));
        assert_eq!(decode(0x0002_0000_0000_0001), Some((2, 0, 1)));
    }

    #[test]
    fn tags_are_never_zero() {
        let first = Arena::with_capacity(1024).unwrap();
        assert_ne!(tag(first.id()), 0);
        assert!(tag(first.id()) <= 0xFFFF);
    }

    #[test]
    fn encode_lookup_round_trip() {
        let handle = local::allocate(32).unwrap();
        let raw = encode(handle);
        assert_ne!(raw, 0);
        assert_eq!(lookup(raw), Ok(handle));
        local::free(Some(handle));
    }

    #[test]
    fn other_arena_tag_is_foreign() {
        let mut other = Arena::with_capacity(1024).unwrap();
        let handle = other.allocate(16).unwrap();
        assert_eq!(
            lookup(encode(handle)),
            Err(ArenaError::InvalidArgument {
                reason: InvalidHandle::ForeignArena
            })
        );
    }

    #[test]
    fn resolved_handles_follow_the_slot_generation() {
        let mut arena = Arena::with_capacity(1024).unwrap();
        let a = arena.allocate(16).unwrap();
        let _b = arena.allocate(16).unwrap();
        let (tag_bits, offset, generation) = decode(encode(a)).unwrap();
        assert_eq!(resolve(&arena, tag_bits, offset, generation), Ok(a));

        arena.free(a).unwrap();
        let stale = resolve(&arena, tag_bits, offset, generation).unwrap();
        assert_eq!(
            arena.free(stale),
            Err(ArenaError::InvalidArgument {
                reason: InvalidHandle::Stale
            })
        );
    }
}
