//! Fixed-capacity memory blocks with bump allocation.
//!
//! A [`Block`] is one contiguous buffer from the system allocator plus a
//! cursor. The arena chains blocks together and only ever bumps the cursor
//! of its current block.

use std::ptr::NonNull;

use crate::error::ArenaError;
use crate::id::BlockSerial;
use crate::raw::{align_up, RawBuffer};

/// A single contiguous memory block with bump allocation.
///
/// Capacity is fixed at creation. The cursor (`used`) only moves forward
/// during allocation and is rewound by `reset` or a marker restore.
pub(crate) struct Block {
    serial: BlockSerial,
    buffer: RawBuffer,
    /// Bump pointer: bytes consumed from the start of the buffer,
    /// including alignment padding.
    used: usize,
    /// Number of successful allocations served since the last rewind.
    allocations: usize,
}

impl Block {
    /// Reserve a new block of `capacity` bytes with its base aligned to `align`.
    ///
    /// `requested` is the caller request that triggered the growth; it is
    /// only used to attribute errors.
    pub(crate) fn new(
        serial: BlockSerial,
        capacity: usize,
        align: usize,
        requested: usize,
    ) -> Result<Self, ArenaError> {
        Ok(Self {
            serial,
            buffer: RawBuffer::allocate(capacity, align, requested)?,
            used: 0,
            allocations: 0,
        })
    }

    /// Bump-allocate `size` bytes aligned to `align`.
    ///
    /// Padding is computed from the real address of the cursor, so the
    /// result is aligned even when `align` exceeds the block's own base
    /// alignment. Returns `None` if the block cannot hold the request.
    pub(crate) fn try_bump(&mut self, size: usize, align: usize) -> Option<NonNull<u8>> {
        let base = self.buffer.base().as_ptr() as usize;
        let cursor = base.checked_add(self.used)?;
        let start = align_up(cursor, align)? - base;
        let end = start.checked_add(size)?;
        if end > self.buffer.capacity() {
            return None;
        }
        let ptr = self.buffer.offset_ptr(start)?;
        self.used = end;
        self.allocations += 1;
        Some(ptr)
    }

    /// Rewind the cursor to empty without releasing the buffer.
    pub(crate) fn reset(&mut self) {
        self.used = 0;
        self.allocations = 0;
    }

    /// Rewind the cursor to a previously captured position.
    pub(crate) fn truncate(&mut self, used: usize, allocations: usize) {
        debug_assert!(
            used <= self.used,
            "block {} rewound forward: {} -> {}",
            self.serial,
            self.used,
            used
        );
        self.used = used;
        self.allocations = allocations;
    }

    pub(crate) fn serial(&self) -> BlockSerial {
        self.serial
    }

    /// Bytes consumed, including alignment padding.
    pub(crate) fn used(&self) -> usize {
        self.used
    }

    /// Total capacity in bytes.
    pub(crate) fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buffer.capacity() - self.used
    }

    pub(crate) fn allocations(&self) -> usize {
        self.allocations
    }

    /// Snapshot of this block's bookkeeping for diagnostics.
    pub(crate) fn info(&self, index: usize) -> BlockInfo {
        BlockInfo {
            index,
            serial: self.serial,
            capacity: self.capacity(),
            used: self.used,
            allocations: self.allocations,
            base_align: self.buffer.align(),
        }
    }
}

/// Read-only description of one block in an arena's chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockInfo {
    /// Position in the chain (0 is the head).
    pub index: usize,
    /// Creation serial within the owning arena.
    pub serial: BlockSerial,
    /// Total capacity in bytes.
    pub capacity: usize,
    /// Bytes consumed, including alignment padding.
    pub used: usize,
    /// Allocations served since the block was last rewound.
    pub allocations: usize,
    /// Alignment of the block's base address.
    pub base_align: usize,
}
