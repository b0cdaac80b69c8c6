//! Usage statistics derived from an arena's live block chain.

use std::fmt;

/// Aggregate usage of an arena at one instant.
///
/// Always recomputed from the blocks currently in the chain, so it
/// reflects a reset or marker restore exactly, with nothing carried over
/// from released or rewound blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    /// Sum of all block capacities.
    pub reserved_bytes: usize,
    /// Sum of all blocks' cursors, including alignment padding.
    pub used_bytes: usize,
    /// Number of blocks in the chain.
    pub block_count: usize,
    /// Allocations currently live across all blocks.
    pub allocation_count: usize,
}

impl ArenaStats {
    /// Fraction of reserved bytes in use, in `[0.0, 1.0]`.
    ///
    /// Returns `0.0` for an arena with no blocks.
    pub fn utilization(&self) -> f64 {
        if self.reserved_bytes == 0 {
            return 0.0;
        }
        self.used_bytes as f64 / self.reserved_bytes as f64
    }
}

impl fmt::Display for ArenaStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} bytes in {} block(s), {} allocation(s)",
            self.used_bytes, self.reserved_bytes, self.block_count, self.allocation_count
        )
    }
}
