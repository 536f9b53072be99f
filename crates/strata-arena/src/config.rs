//! Arena configuration parameters.

use crate::block::{ALIGNMENT, HEADER_SIZE};
use crate::error::ArenaError;

/// Configuration for an [`Arena`](crate::arena::Arena).
///
/// The capacity is fixed for the arena's lifetime: the buffer is allocated
/// once at construction and never grows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Size of the arena buffer in bytes.
    ///
    /// Default: [`ArenaConfig::BUILD_CAPACITY`]. Must be a multiple of
    /// [`ALIGNMENT`], larger than one block header, and at most `u32::MAX`.
    pub capacity: usize,
}

impl ArenaConfig {
    /// Base capacity: 128 KiB.
    pub const DEFAULT_CAPACITY: usize = 128 * 1024;

    /// Build-time multiplier applied to [`Self::DEFAULT_CAPACITY`].
    ///
    /// Read from `STRATA_ARENA_SIZE_MULTIPLIER` when the crate is compiled.
    /// A malformed or zero value fails the build.
    pub const CAPACITY_MULTIPLIER: usize =
        parse_multiplier(option_env!("STRATA_ARENA_SIZE_MULTIPLIER"));

    /// Capacity used by [`ArenaConfig::default`] and the thread-local arena.
    pub const BUILD_CAPACITY: usize = Self::DEFAULT_CAPACITY * Self::CAPACITY_MULTIPLIER;

    /// Create a config with the given buffer capacity in bytes.
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Check the capacity constraints documented on [`ArenaConfig::capacity`].
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.capacity % ALIGNMENT != 0 {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "capacity must be a multiple of {ALIGNMENT} (got {})",
                    self.capacity
                ),
            });
        }
        if self.capacity <= HEADER_SIZE {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "capacity must exceed the {HEADER_SIZE}-byte block header (got {})",
                    self.capacity
                ),
            });
        }
        if self.capacity > u32::MAX as usize {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "capacity must fit in 32-bit block offsets (got {})",
                    self.capacity
                ),
            });
        }
        Ok(())
    }

    /// Number of size classes an arena of this capacity maintains.
    pub fn class_count(&self) -> usize {
        (self.capacity - HEADER_SIZE) / ALIGNMENT
    }

    /// Largest payload a single allocation can request.
    pub fn max_payload(&self) -> usize {
        self.capacity - HEADER_SIZE
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::BUILD_CAPACITY)
    }
}

const _: () = assert!(ArenaConfig::BUILD_CAPACITY % ALIGNMENT == 0);
const _: () = assert!(ArenaConfig::BUILD_CAPACITY <= u32::MAX as usize);

const fn parse_multiplier(raw: Option<&str>) -> usize {
    let bytes = match raw {
        Some(s) => s.as_bytes(),
        None => return 1,
    };
    assert!(
        !bytes.is_empty(),
        "STRATA_ARENA_SIZE_MULTIPLIER must not be empty"
    );
    let mut value = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        assert!(
            bytes[i].is_ascii_digit(),
            "STRATA_ARENA_SIZE_MULTIPLIER must be a decimal integer"
        );
        value = value * 10 + (bytes[i] - b'0') as usize;
        i += 1;
    }
    assert!(value > 0, "STRATA_ARENA_SIZE_MULTIPLIER must be positive");
    value
}
