//! Strata: block-chained arena allocation for Rust.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Strata sub-crates. For most users, adding `strata` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use strata::prelude::*;
//!
//! let mut arena = Arena::new(ArenaConfig::new(64 * 1024)).unwrap();
//! let greeting = arena.alloc_str("hello").unwrap();
//! assert_eq!(greeting, "hello");
//!
//! // Everything allocated inside the region is released when it closes.
//! let before = arena.stats();
//! arena.with_scratch(|scratch| {
//!     let tmp = scratch.alloc_slice_fill(1000, 0u32).unwrap();
//!     tmp[999] = 7;
//! });
//! assert_eq!(arena.stats(), before);
//!
//! // Contexts bundle a global arena, a temp arena, and typed extensions.
//! let mut ctx = Context::new(ContextConfig::default()).unwrap();
//! ctx.insert_extension(42u32).unwrap();
//! ctx.temp_alloc(256).unwrap();
//! ctx.reset_temp();
//! assert_eq!(ctx.extension::<u32>(), Some(&42));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`arena`] | `strata-arena` | `Arena`, temp markers, `Scratch`, config, errors, stats |
//! | [`context`] | `strata-context` | `Context`, `ArenaSlot`, typed extensions |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Arenas, temporary regions, and scratch (`strata-arena`).
///
/// The central type is [`arena::Arena`]; [`arena::TempMarker`] and
/// [`arena::Scratch`] are also in the [`prelude`].
pub use strata_arena as arena;

/// Execution contexts (`strata-context`).
///
/// [`context::Context`] pairs a global arena with a temporary one and
/// carries typed extensions.
pub use strata_context as context;

/// Common imports for typical Strata usage.
///
/// ```rust
/// use strata::prelude::*;
/// ```
pub mod prelude {
    // Arena
    pub use strata_arena::{Arena, ArenaConfig, ArenaStats, Scratch, TempMarker};

    // Context
    pub use strata_context::{ArenaSlot, Context, ContextConfig};

    // Errors
    pub use strata_arena::ArenaError;
    pub use strata_context::ContextError;
}
