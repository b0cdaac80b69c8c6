//! Temporary region markers.
//!
//! A [`TempMarker`] records where an arena's bump cursor stood at capture
//! time. It names the block directly (chain position plus creation serial)
//! together with that block's local cursor, never a byte offset into the
//! arena as a whole, so a restore stays exact however the chain grew in
//! between and wherever the blocks live in memory.

use std::fmt;

use crate::id::{ArenaId, BlockSerial};

/// Direct reference to a block in an arena's chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockRef {
    /// Position of the block in the chain.
    pub(crate) index: usize,
    /// Creation serial, checked on restore to catch a replaced block.
    pub(crate) serial: BlockSerial,
}

impl BlockRef {
    /// Position of the block in the chain.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Creation serial of the block.
    pub fn serial(&self) -> BlockSerial {
        self.serial
    }
}

/// Snapshot of an arena's allocation position.
///
/// Created by [`Arena::temp_begin`](crate::Arena::temp_begin) and consumed
/// by [`Arena::temp_end`](crate::Arena::temp_end), which rewinds, or
/// [`Arena::temp_commit`](crate::Arena::temp_commit), which keeps the
/// region's allocations. A marker owns no memory, but the arena tracks it
/// as open until it is consumed. Dropping one leaves both its allocations
/// and its open-marker entry in place until an enclosing `temp_end` or
/// `temp_commit`, a `reset`, or a `free`, so a region that is kept should
/// be committed.
///
/// A marker is neither `Copy` nor `Clone`, so it can be consumed at most
/// once. Markers nest like a stack: restoring a marker invalidates every
/// marker captured after it, and `reset`/`free` invalidate all of them.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a marker stays open until passed to `Arena::temp_end` or `Arena::temp_commit`"]
pub struct TempMarker {
    /// Arena the marker was captured on.
    pub(crate) arena: ArenaId,
    /// Unique sequence number within the arena.
    pub(crate) sequence: u64,
    /// Position in the arena's open-marker stack.
    pub(crate) depth: usize,
    /// The block that was current at capture, or `None` if the arena had
    /// no blocks yet.
    pub(crate) block: Option<BlockRef>,
    /// The block's `used` count at capture.
    pub(crate) used: usize,
    /// The block's allocation count at capture.
    pub(crate) allocations: usize,
    /// Number of blocks in the chain at capture.
    pub(crate) chain_len: usize,
}

impl TempMarker {
    /// Arena the marker belongs to.
    pub fn arena(&self) -> ArenaId {
        self.arena
    }

    /// Sequence number, unique within the arena.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Nesting depth: the number of markers already open at capture.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The block that was current at capture.
    pub fn block(&self) -> Option<BlockRef> {
        self.block
    }

    /// That block's cursor at capture.
    pub fn used(&self) -> usize {
        self.used
    }

    /// Number of blocks in the chain at capture.
    pub fn chain_len(&self) -> usize {
        self.chain_len
    }
}

impl fmt::Display for TempMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.block {
            Some(block) => write!(
                f,
                "TempMarker(arena={}, seq={}, block={}@{}, used={})",
                self.arena, self.sequence, block.index, block.serial, self.used
            ),
            None => write!(
                f,
                "TempMarker(arena={}, seq={}, empty)",
                self.arena, self.sequence
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Arena;

    #[test]
    fn marker_on_empty_arena_has_no_block() {
        let arena = Arena::with_block_size(64).unwrap();
        let marker = arena.temp_begin();
        assert!(marker.block().is_none());
        assert_eq!(marker.used(), 0);
        assert_eq!(marker.chain_len(), 0);
        assert!(marker.to_string().contains("empty"));
        let mut arena = arena;
        arena.temp_end(marker).unwrap();
    }

    #[test]
    fn marker_names_current_block_and_cursor() {
        let mut arena = Arena::with_block_size(64).unwrap();
        arena.alloc(40).unwrap();
        arena.alloc(40).unwrap();
        let marker = arena.temp_begin();
        let block = marker.block().unwrap();
        assert_eq!(block.index(), 1);
        assert_eq!(marker.used(), 40);
        assert_eq!(marker.chain_len(), 2);
        assert_eq!(marker.arena(), arena.id());
        arena.temp_end(marker).unwrap();
    }

    #[test]
    fn sequences_and_depths_increase() {
        let mut arena = Arena::with_block_size(64).unwrap();
        let outer = arena.temp_begin();
        let inner = arena.temp_begin();
        assert!(inner.sequence() > outer.sequence());
        assert_eq!(outer.depth(), 0);
        assert_eq!(inner.depth(), 1);
        arena.temp_end(inner).unwrap();
        arena.temp_end(outer).unwrap();
    }
}
