//! The block-chained bump arena.
//!
//! [`Arena`] owns an ordered chain of blocks and a cursor naming the
//! block currently being bumped. The lifecycle is:
//!
//! 1. `alloc*`: bump the current block; on overflow move to a later
//!    block kept by `reset`, or append a fresh one
//! 2. `temp_begin()` / `temp_end()` / `temp_commit()`: snapshot the cursor,
//!    then roll back to it or keep what was allocated since
//! 3. `reset()` / `reset_and_shrink()` / `free()`: bulk reclamation
//!
//! Allocation takes `&self`; every reclaiming operation takes `&mut self`,
//! so no reference handed out by the safe API can outlive the memory it
//! points into.

use std::alloc::Layout;
use std::cell::RefCell;
use std::fmt;
use std::ptr::NonNull;

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::block::{Block, BlockInfo};
use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::id::{ArenaId, BlockSerial};
use crate::marker::{BlockRef, TempMarker};
use crate::raw::{self, BLOCK_ALIGN};
use crate::stats::ArenaStats;

/// Region-based allocator over a chain of fixed-capacity blocks.
///
/// Memory is handed out by bumping a cursor and is only ever reclaimed in
/// bulk: by [`Arena::reset`], by restoring a [`TempMarker`], or by
/// [`Arena::free`] / drop. There is no per-allocation free.
///
/// An arena is `Send` but not `Sync`: it may move between threads, but a
/// single instance must not be shared for concurrent allocation.
///
/// # Block layout
///
/// ```text
/// blocks: [B0 used=64/64] -> [B1 used=40/64] -> [B2 used=0/128]
///                             ^ current          ^ kept by reset, reused on overflow
/// ```
pub struct Arena {
    id: ArenaId,
    config: ArenaConfig,
    chain: RefCell<BlockChain>,
}

/// Mutable bookkeeping behind the arena's `RefCell`.
struct BlockChain {
    /// Blocks in creation order.
    blocks: Vec<Block>,
    /// Index of the block currently being bumped. Every block after it is
    /// empty. Meaningless while `blocks` is empty.
    current: usize,
    /// Serial for the next block created.
    next_serial: u64,
    /// Sequence numbers of markers that are still open, outermost first.
    open_markers: SmallVec<[u64; 8]>,
    /// Sequence number for the next marker.
    next_marker_seq: u64,
    /// Lifetime count of blocks obtained from the system allocator.
    growth_count: u64,
}

impl BlockChain {
    fn new() -> Self {
        Self {
            blocks: Vec::new(),
            current: 0,
            next_serial: 0,
            open_markers: SmallVec::new(),
            next_marker_seq: 0,
            growth_count: 0,
        }
    }

    /// Serve a non-empty request, growing the chain if needed.
    fn bump(
        &mut self,
        size: usize,
        alignment: usize,
        config: &ArenaConfig,
        arena: ArenaId,
    ) -> Result<NonNull<u8>, ArenaError> {
        if let Some(block) = self.blocks.get_mut(self.current) {
            if let Some(ptr) = block.try_bump(size, alignment) {
                return Ok(ptr);
            }
        }

        // Blocks after the cursor were kept by a reset and are empty.
        // Reuse the first one that fits; skipped ones stay empty.
        for index in self.current + 1..self.blocks.len() {
            if let Some(ptr) = self.blocks[index].try_bump(size, alignment) {
                self.current = index;
                return Ok(ptr);
            }
        }

        self.grow(size, alignment, config, arena)
    }

    /// Append a fresh block sized for the request and allocate from it.
    fn grow(
        &mut self,
        size: usize,
        alignment: usize,
        config: &ArenaConfig,
        arena: ArenaId,
    ) -> Result<NonNull<u8>, ArenaError> {
        let capacity = config.effective_block_size().max(size);
        let reserved = self.reserved_bytes();
        if let Some(limit) = config.max_reserved_bytes {
            if reserved
                .checked_add(capacity)
                .is_none_or(|total| total > limit)
            {
                return Err(ArenaError::CapacityExceeded {
                    requested: capacity,
                    reserved,
                    limit,
                });
            }
        }

        let serial = BlockSerial(self.next_serial);
        let mut block = Block::new(serial, capacity, alignment.max(BLOCK_ALIGN), size)?;
        // The base is aligned to at least `alignment` and capacity >= size,
        // so a fresh block always fits the request at offset 0.
        let ptr = block
            .try_bump(size, alignment)
            .ok_or(ArenaError::OutOfMemory {
                requested: size,
                alignment,
            })?;

        self.next_serial += 1;
        self.growth_count += 1;
        self.blocks.push(block);
        self.current = self.blocks.len() - 1;
        debug!(
            arena = %arena,
            block = self.current,
            serial = %serial,
            capacity,
            reserved = reserved + capacity,
            "arena grew a new block"
        );
        Ok(ptr)
    }

    /// Release every block at chain position `start` or later.
    ///
    /// Returns the number of blocks and bytes released.
    fn release_from(&mut self, start: usize) -> (usize, usize) {
        if start >= self.blocks.len() {
            return (0, 0);
        }
        let released: usize = self.blocks[start..].iter().map(Block::capacity).sum();
        let count = self.blocks.len() - start;
        self.blocks.truncate(start);
        (count, released)
    }

    /// Check that `marker` was captured on `arena` and is still open.
    ///
    /// Returns the chain index of the marker's block, if it had one.
    fn validate(
        &self,
        marker: &TempMarker,
        arena: ArenaId,
    ) -> Result<Option<usize>, ArenaError> {
        if marker.arena != arena {
            return Err(ArenaError::ForeignMarker {
                marker_arena: marker.arena,
                arena,
            });
        }
        let stale = ArenaError::StaleMarker {
            sequence: marker.sequence,
        };
        if self.open_markers.get(marker.depth) != Some(&marker.sequence) {
            return Err(stale);
        }
        match marker.block {
            Some(block_ref) => match self.blocks.get(block_ref.index) {
                Some(b) if b.serial() == block_ref.serial => Ok(Some(block_ref.index)),
                _ => Err(stale),
            },
            None => Ok(None),
        }
    }

    fn reserved_bytes(&self) -> usize {
        self.blocks.iter().map(Block::capacity).sum()
    }

    fn stats(&self) -> ArenaStats {
        ArenaStats {
            reserved_bytes: self.reserved_bytes(),
            used_bytes: self.blocks.iter().map(Block::used).sum(),
            block_count: self.blocks.len(),
            allocation_count: self.blocks.iter().map(Block::allocations).sum(),
        }
    }

    fn assert_tail_empty(&self) {
        debug_assert!(
            self.blocks
                .iter()
                .skip(self.current + 1)
                .all(|b| b.used() == 0),
            "blocks after the cursor must be empty"
        );
    }
}

impl Arena {
    /// Create an arena from a validated config. No block is reserved until
    /// the first allocation.
    pub fn new(config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        Ok(Self {
            id: ArenaId::next(),
            config,
            chain: RefCell::new(BlockChain::new()),
        })
    }

    /// Create an arena whose blocks hold `block_size` bytes (`0` for the
    /// default).
    pub fn with_block_size(block_size: usize) -> Result<Self, ArenaError> {
        Self::new(ArenaConfig::new(block_size))
    }

    /// Unique identity of this arena.
    pub fn id(&self) -> ArenaId {
        self.id
    }

    /// The configuration this arena was built with.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Allocate `size` bytes at the configured default alignment.
    ///
    /// The memory is uninitialised. It stays valid until the next `reset`,
    /// `free`, or restore of a marker captured before this call.
    pub fn alloc(&self, size: usize) -> Result<NonNull<u8>, ArenaError> {
        self.alloc_aligned(size, self.config.default_alignment)
    }

    /// Allocate `size` bytes whose address is a multiple of `alignment`.
    ///
    /// If the current block cannot fit the request after padding, the
    /// arena moves on to a later empty block or appends a new block of
    /// `max(block_size, size)` bytes. The request is never split across
    /// blocks. Zero-sized requests return a dangling, well-aligned pointer
    /// and touch no block.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::InvalidAlignment`] if `alignment` is not a power of two.
    /// - [`ArenaError::SizeOverflow`] if no layout can describe the request.
    /// - [`ArenaError::CapacityExceeded`] if growth would cross the budget.
    /// - [`ArenaError::OutOfMemory`] if the system allocator fails.
    ///
    /// The arena is unchanged when an error is returned.
    pub fn alloc_aligned(&self, size: usize, alignment: usize) -> Result<NonNull<u8>, ArenaError> {
        if !alignment.is_power_of_two() {
            return Err(ArenaError::InvalidAlignment { alignment });
        }
        if size == 0 {
            return Ok(raw::dangling(alignment));
        }
        if size > isize::MAX as usize - (alignment - 1) {
            return Err(ArenaError::SizeOverflow {
                requested: size,
                alignment,
            });
        }
        self.chain
            .borrow_mut()
            .bump(size, alignment, &self.config, self.id)
    }

    /// Allocate memory fitting `layout`.
    pub fn alloc_layout(&self, layout: Layout) -> Result<NonNull<u8>, ArenaError> {
        self.alloc_aligned(layout.size(), layout.align())
    }

    /// Capture the current allocation position.
    ///
    /// No memory is allocated. Pass the marker to [`Arena::temp_end`] to
    /// discard everything allocated after this call.
    pub fn temp_begin(&self) -> TempMarker {
        let mut chain = self.chain.borrow_mut();
        let sequence = chain.next_marker_seq;
        chain.next_marker_seq += 1;
        let depth = chain.open_markers.len();
        chain.open_markers.push(sequence);

        let current = chain.current;
        let (block, used, allocations) = match chain.blocks.get(current) {
            Some(b) => (
                Some(BlockRef {
                    index: current,
                    serial: b.serial(),
                }),
                b.used(),
                b.allocations(),
            ),
            None => (None, 0, 0),
        };
        trace!(arena = %self.id, sequence, depth, used, "temp region opened");

        TempMarker {
            arena: self.id,
            sequence,
            depth,
            block,
            used,
            allocations,
            chain_len: chain.blocks.len(),
        }
    }

    /// Roll the arena back to exactly where `marker` was captured.
    ///
    /// Blocks created after the marker are released, the marker's block is
    /// rewound to its captured cursor, and it becomes current again. Any
    /// marker captured after this one becomes stale. Cost is O(k) in the
    /// number of blocks created since capture.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::ForeignMarker`] if the marker came from another arena.
    /// - [`ArenaError::StaleMarker`] if an enclosing marker was restored
    ///   first or the arena was reset or freed since capture.
    ///
    /// The arena is unchanged when an error is returned.
    pub fn temp_end(&mut self, marker: TempMarker) -> Result<(), ArenaError> {
        let chain = self.chain.get_mut();
        let target = chain.validate(&marker, self.id)?;
        debug_assert!(
            marker.chain_len <= chain.blocks.len(),
            "chain shrank below an open marker"
        );

        let (released_blocks, released_bytes) = chain.release_from(marker.chain_len);
        match target {
            Some(index) => {
                // Blocks between the marker's block and the old chain end
                // were kept by a reset and were empty at capture.
                for block in &mut chain.blocks[index + 1..] {
                    block.reset();
                }
                chain.blocks[index].truncate(marker.used, marker.allocations);
                chain.current = index;
            }
            None => chain.current = 0,
        }
        chain.open_markers.truncate(marker.depth);
        chain.assert_tail_empty();

        if released_blocks > 0 {
            debug!(
                arena = %self.id,
                sequence = marker.sequence,
                released_blocks,
                released_bytes,
                "temp region released blocks"
            );
        }
        trace!(arena = %self.id, sequence = marker.sequence, "temp region closed");
        Ok(())
    }

    /// Close the region opened by `marker`, keeping everything allocated
    /// in it.
    ///
    /// The marker and every marker captured after it stop being open, as
    /// with [`Arena::temp_end`], but nothing is rewound. A marker that is
    /// dropped instead stays registered until an enclosing `temp_end` or
    /// `temp_commit`, a `reset`, or a `free`.
    ///
    /// # Errors
    ///
    /// The same as [`Arena::temp_end`]. The arena is unchanged when an
    /// error is returned.
    pub fn temp_commit(&mut self, marker: TempMarker) -> Result<(), ArenaError> {
        let chain = self.chain.get_mut();
        chain.validate(&marker, self.id)?;
        chain.open_markers.truncate(marker.depth);
        trace!(arena = %self.id, sequence = marker.sequence, "temp region committed");
        Ok(())
    }

    /// Rewind every block to empty and make the head current again.
    ///
    /// No block is released, so later allocations reuse the reserved
    /// capacity without calling the system allocator. Invalidates every
    /// open marker.
    pub fn reset(&mut self) {
        let chain = self.chain.get_mut();
        for block in &mut chain.blocks {
            block.reset();
        }
        chain.current = 0;
        chain.open_markers.clear();
        debug!(arena = %self.id, blocks = chain.blocks.len(), "arena reset");
    }

    /// Rewind the arena and release every block except the head.
    ///
    /// Useful after a burst of growth to return memory while keeping one
    /// block warm. Invalidates every open marker.
    pub fn reset_and_shrink(&mut self) {
        let chain = self.chain.get_mut();
        let (released_blocks, released_bytes) = chain.release_from(1);
        if let Some(head) = chain.blocks.first_mut() {
            head.reset();
        }
        chain.current = 0;
        chain.open_markers.clear();
        debug!(
            arena = %self.id,
            released_blocks,
            released_bytes,
            "arena reset and shrunk"
        );
    }

    /// Release every block and return to the freshly constructed state.
    ///
    /// The configuration is kept, so the arena can be used again. Calling
    /// `free` on an arena with no blocks is a no-op. Invalidates every open
    /// marker.
    pub fn free(&mut self) {
        let chain = self.chain.get_mut();
        let (released_blocks, released_bytes) = chain.release_from(0);
        chain.current = 0;
        chain.open_markers.clear();
        if released_blocks > 0 {
            debug!(
                arena = %self.id,
                released_blocks,
                released_bytes,
                "arena freed"
            );
        }
    }

    /// Usage statistics recomputed from the live chain.
    pub fn stats(&self) -> ArenaStats {
        self.chain.borrow().stats()
    }

    /// Sum of all block capacities.
    pub fn reserved_bytes(&self) -> usize {
        self.chain.borrow().reserved_bytes()
    }

    /// Sum of all block cursors, including alignment padding.
    pub fn used_bytes(&self) -> usize {
        self.stats().used_bytes
    }

    /// Per-block bookkeeping, head first.
    pub fn blocks(&self) -> Vec<BlockInfo> {
        self.chain
            .borrow()
            .blocks
            .iter()
            .enumerate()
            .map(|(i, b)| b.info(i))
            .collect()
    }

    /// Index of the block currently being bumped, or `None` before the
    /// first allocation.
    pub fn current_block(&self) -> Option<usize> {
        let chain = self.chain.borrow();
        if chain.blocks.is_empty() {
            None
        } else {
            Some(chain.current)
        }
    }

    /// Bytes left in the current block before growth is needed.
    pub fn remaining_in_current(&self) -> usize {
        let chain = self.chain.borrow();
        chain.blocks.get(chain.current).map_or(0, Block::remaining)
    }

    /// Number of blocks ever obtained from the system allocator.
    ///
    /// A lifetime counter, unaffected by `reset` and restores. Comparing it
    /// before and after a workload shows whether the workload was served
    /// entirely from reserved capacity.
    pub fn growth_count(&self) -> u64 {
        self.chain.borrow().growth_count
    }

    /// Number of markers currently open.
    pub fn open_markers(&self) -> usize {
        self.chain.borrow().open_markers.len()
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            id: ArenaId::next(),
            config: ArenaConfig::default(),
            chain: RefCell::new(BlockChain::new()),
        }
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("stats", &self.stats())
            .field("current_block", &self.current_block())
            .finish()
    }
}
