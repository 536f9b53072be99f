//! Fixed-capacity size-class arena with coalescing free lists.
//!
//! An [`Arena`] serves allocate, free, and resize requests from a single
//! byte buffer sized once at construction. Freed blocks are parked in
//! per-size-class LIFO free lists and merged with free neighbours; the
//! block at the end of the carved region is handed back to raw space
//! instead. Each thread can additionally use an implicit arena through
//! the [`local`] module.
//!
//! # Architecture
//!
//! ```text
//! Arena
//! ├── buffer: Box<[u8]>        (capacity bytes, never grows)
//! ├── offset / tail            (bump cursor and last block in address order)
//! ├── BlockTable               (offset → Block record, per-offset generations)
//! └── FreeLists                (one LIFO stack top per size class)
//! ```
//!
//! Block records live in a side table, not inside the buffer, and callers
//! reach blocks only through generation-checked [`BlockHandle`]s. Double
//! frees, frees of foreign handles, and use after free are reported as
//! [`ArenaError::InvalidArgument`] without touching arena state.
//!
//! # Size classes
//!
//! A request for `n` payload bytes occupies a block of
//! [`HEADER_SIZE`] + `n` rounded up to [`ALIGNMENT`]. Classes are linear
//! in the rounded payload: class `k` holds `(k + 1) * ALIGNMENT` payload
//! bytes. Free blocks are reused only by requests of their exact class.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod arena;
pub mod block;
pub mod config;
pub mod error;
mod free_list;
pub mod handle;
pub mod local;

// Public re-exports for the primary API surface.
pub use arena::{Arena, ArenaStats};
pub use block::{BlockInfo, BlockState, ALIGNMENT, HEADER_SIZE};
pub use config::ArenaConfig;
pub use error::{ArenaError, ErrorKind, InvalidHandle};
pub use handle::{ArenaId, BlockHandle};
