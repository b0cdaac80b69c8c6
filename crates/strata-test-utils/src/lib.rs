//! Test utilities for Strata development.
//!
//! Provides proptest strategies for allocation workloads ([`strategies`])
//! and helpers for checking what an arena looks like before and after an
//! operation ([`StatsProbe`], [`is_aligned`]).

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod strategies;

use std::ptr::NonNull;

use strata_arena::{Arena, ArenaStats};

/// Whether `ptr` is a multiple of `align`.
pub fn is_aligned(ptr: NonNull<u8>, align: usize) -> bool {
    (ptr.as_ptr() as usize) % align == 0
}

/// Records an arena's statistics so a later state can be compared with it.
///
/// ```
/// use strata_arena::Arena;
/// use strata_test_utils::StatsProbe;
///
/// let mut arena = Arena::with_block_size(64).unwrap();
/// let probe = StatsProbe::capture(&arena);
/// let marker = arena.temp_begin();
/// arena.alloc(100).unwrap();
/// assert!(!probe.matches(&arena));
/// arena.temp_end(marker).unwrap();
/// probe.assert_restored(&arena);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct StatsProbe {
    stats: ArenaStats,
    growth_count: u64,
    current_block: Option<usize>,
}

impl StatsProbe {
    pub fn capture(arena: &Arena) -> Self {
        Self {
            stats: arena.stats(),
            growth_count: arena.growth_count(),
            current_block: arena.current_block(),
        }
    }

    pub fn stats(&self) -> ArenaStats {
        self.stats
    }

    /// Whether the arena's footprint and cursor equal the captured ones.
    pub fn matches(&self, arena: &Arena) -> bool {
        arena.stats() == self.stats && arena.current_block() == self.current_block
    }

    /// Panics with both states if the arena differs from the capture.
    pub fn assert_restored(&self, arena: &Arena) {
        assert_eq!(arena.stats(), self.stats, "arena stats were not restored");
        assert_eq!(
            arena.current_block(),
            self.current_block,
            "arena cursor was not restored"
        );
    }

    /// Blocks obtained from the system allocator since the capture.
    pub fn growth_since(&self, arena: &Arena) -> u64 {
        arena.growth_count() - self.growth_count
    }
}
