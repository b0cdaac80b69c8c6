//! Low-level primitives for arena memory operations.
//!
//! Every call into the system allocator lives here. Each `unsafe` block
//! carries a `// SAFETY:` comment stating the invariant it relies on.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::ptr::{self, NonNull};

use crate::error::ArenaError;

/// Minimum alignment of every block's base address.
///
/// Matches the strictest fundamental alignment on mainstream 64-bit
/// targets, so requests up to this alignment never need padding at the
/// start of a fresh block.
pub const BLOCK_ALIGN: usize = 16;

/// Round `addr` up to the next multiple of `align`.
///
/// Returns `None` if the result would overflow.
pub(crate) fn align_up(addr: usize, align: usize) -> Option<usize> {
    debug_assert!(align.is_power_of_two());
    let mask = align - 1;
    addr.checked_add(mask).map(|v| v & !mask)
}

/// A well-aligned, non-null pointer for zero-sized requests.
pub(crate) fn dangling(align: usize) -> NonNull<u8> {
    debug_assert!(align.is_power_of_two());
    // SAFETY: a power of two is never zero, so the pointer is non-null.
    unsafe { NonNull::new_unchecked(ptr::without_provenance_mut(align)) }
}

/// An owned allocation from the global allocator.
///
/// Released exactly once, on drop.
pub(crate) struct RawBuffer {
    ptr: NonNull<u8>,
    layout: Layout,
}

// SAFETY: `RawBuffer` exclusively owns its allocation; nothing else holds
// the pointer, so moving it to another thread moves sole ownership.
unsafe impl Send for RawBuffer {}

impl RawBuffer {
    /// Allocate `capacity` uninitialised bytes aligned to `align`.
    ///
    /// `capacity` must be non-zero. Reports the caller's original request
    /// in the error so exhaustion is attributed to the right allocation.
    pub(crate) fn allocate(
        capacity: usize,
        align: usize,
        requested: usize,
    ) -> Result<Self, ArenaError> {
        debug_assert!(capacity > 0, "blocks are never zero-sized");
        let layout =
            Layout::from_size_align(capacity, align).map_err(|_| ArenaError::SizeOverflow {
                requested,
                alignment: align,
            })?;
        // SAFETY: `layout` has non-zero size (asserted above and guaranteed by
        // every caller, which only creates blocks for non-empty requests or a
        // non-zero configured block size).
        let raw = unsafe { alloc::alloc(layout) };
        let ptr = NonNull::new(raw).ok_or(ArenaError::OutOfMemory {
            requested,
            alignment: align,
        })?;
        Ok(Self { ptr, layout })
    }

    /// Base address of the buffer.
    pub(crate) fn base(&self) -> NonNull<u8> {
        self.ptr
    }

    /// Pointer `offset` bytes past the base, or `None` if out of bounds.
    ///
    /// `offset == capacity` is allowed (one past the end), matching the
    /// position a zero-length tail allocation would take.
    pub(crate) fn offset_ptr(&self, offset: usize) -> Option<NonNull<u8>> {
        if offset > self.capacity() {
            return None;
        }
        NonNull::new(self.ptr.as_ptr().wrapping_add(offset))
    }

    /// Size of the buffer in bytes.
    pub(crate) fn capacity(&self) -> usize {
        self.layout.size()
    }

    /// Alignment of the buffer's base address.
    pub(crate) fn align(&self) -> usize {
        self.layout.align()
    }
}

impl Drop for RawBuffer {
    fn drop(&mut self) {
        // SAFETY: `ptr` was returned by `alloc::alloc(self.layout)` and is
        // released only here.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_up_rounds_to_multiple() {
        assert_eq!(align_up(0, 8), Some(0));
        assert_eq!(align_up(1, 8), Some(8));
        assert_eq!(align_up(8, 8), Some(8));
        assert_eq!(align_up(9, 16), Some(16));
        assert_eq!(align_up(17, 1), Some(17));
    }

    #[test]
    fn align_up_overflow_is_none() {
        assert_eq!(align_up(usize::MAX, 16), None);
    }

    #[test]
    fn dangling_is_aligned() {
        for shift in 0..12 {
            let align = 1usize << shift;
            assert_eq!(dangling(align).as_ptr() as usize % align, 0);
        }
    }

    #[test]
    fn buffer_base_honours_alignment() {
        let buf = RawBuffer::allocate(100, 256, 100).unwrap();
        assert_eq!(buf.base().as_ptr() as usize % 256, 0);
        assert_eq!(buf.capacity(), 100);
        assert_eq!(buf.align(), 256);
    }

    #[test]
    fn offset_ptr_is_bounds_checked() {
        let buf = RawBuffer::allocate(32, BLOCK_ALIGN, 32).unwrap();
        let base = buf.base().as_ptr() as usize;
        assert_eq!(buf.offset_ptr(0).unwrap().as_ptr() as usize, base);
        assert_eq!(buf.offset_ptr(32).unwrap().as_ptr() as usize, base + 32);
        assert!(buf.offset_ptr(33).is_none());
    }

    #[test]
    fn invalid_layout_is_size_overflow() {
        let result = RawBuffer::allocate(usize::MAX, BLOCK_ALIGN, usize::MAX);
        assert!(matches!(result, Err(ArenaError::SizeOverflow { .. })));
    }
}
