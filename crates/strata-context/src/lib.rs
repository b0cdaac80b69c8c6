//! Explicit execution contexts over Strata arenas.
//!
//! A [`Context`] pairs a long-lived global arena with a temporary arena
//! for per-task work, and carries typed extensions that subsystems attach
//! to it. There is no ambient "current" context: callers pass the context
//! to whatever needs it.
//!
//! # Ownership
//!
//! - **Owned global:** [`Context::new`] creates the global arena and frees
//!   it when the context drops.
//! - **Borrowed global:** [`Context::with_global`] allocates from a caller's
//!   arena, which keeps everything after the context is gone.
//!
//! The temporary arena is always owned. Scratch regions opened from the
//! context sit on the temporary arena.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod context;
pub mod error;
pub mod extensions;
pub mod slot;

pub use config::ContextConfig;
pub use context::Context;
pub use error::ContextError;
pub use extensions::Extensions;
pub use slot::ArenaSlot;
