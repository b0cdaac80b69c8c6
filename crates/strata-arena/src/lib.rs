//! Block-chained bump arenas for Strata.
//!
//! An [`Arena`] hands out memory by bumping a cursor through a chain of
//! blocks obtained from the system allocator. Memory is never freed one
//! allocation at a time; it is reclaimed in bulk by resetting the arena,
//! by restoring a [`TempMarker`], or by dropping the arena. This crate is
//! the only one in the workspace that contains `unsafe` code.
//!
//! # Architecture
//!
//! ```text
//! Arena (id, config)
//! └── BlockChain (RefCell)
//!     ├── Block[] (RawBuffer + used cursor, creation serial)
//!     ├── current (index of the block being bumped)
//!     └── open markers (stack of TempMarker sequence numbers)
//! ```
//!
//! # Temporary regions
//!
//! - **Markers:** [`Arena::temp_begin`] captures the cursor,
//!   [`Arena::temp_end`] rolls the arena back to it and releases every
//!   block created in between.
//! - **Scratch:** [`Scratch`] wraps a marker in a guard that restores it on
//!   drop, including while unwinding.
//!
//! # Safety boundary
//!
//! Raw block memory is confined to `raw.rs`, with the typed helpers in
//! `typed.rs` forming references over it. Every other module is safe code.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod arena;
mod block;
pub mod config;
pub mod error;
pub mod id;
pub mod marker;
mod raw;
pub mod scratch;
pub mod stats;
mod typed;

// Public re-exports for the primary API surface.
pub use arena::Arena;
pub use block::BlockInfo;
pub use config::ArenaConfig;
pub use error::ArenaError;
pub use id::{ArenaId, BlockSerial};
pub use marker::{BlockRef, TempMarker};
pub use raw::BLOCK_ALIGN;
pub use scratch::Scratch;
pub use stats::ArenaStats;
