//! Initialising allocation helpers.
//!
//! These wrap the raw entry points and hand back references tied to the
//! arena borrow. Values placed in the arena are never dropped: their
//! memory is reclaimed in bulk and destructors do not run.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::ptr::{self, NonNull};
use std::slice;

use crate::arena::Arena;
use crate::error::ArenaError;

impl Arena {
    /// Allocate `size` zero-filled bytes at the default alignment.
    pub fn calloc(&self, size: usize) -> Result<NonNull<u8>, ArenaError> {
        let ptr = self.alloc(size)?;
        // SAFETY: `ptr` is valid for `size` bytes (or dangling with
        // `size == 0`, for which `write_bytes` is a no-op).
        unsafe { ptr::write_bytes(ptr.as_ptr(), 0, size) };
        Ok(ptr)
    }

    /// Allocate a zero-filled byte slice.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_bytes(&self, len: usize) -> Result<&mut [u8], ArenaError> {
        let ptr = self.calloc(len)?;
        // SAFETY: `calloc` returned `len` initialised bytes owned by no one
        // else; they live until a `&mut self` method reclaims them, which the
        // borrow on `self` prevents while the slice is alive.
        Ok(unsafe { slice::from_raw_parts_mut(ptr.as_ptr(), len) })
    }

    /// Move `value` into the arena.
    ///
    /// The value's destructor never runs.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_value<T>(&self, value: T) -> Result<&mut T, ArenaError> {
        let ptr = self.alloc_layout(Layout::new::<T>())?.cast::<T>();
        // SAFETY: `ptr` is aligned for `T` and valid for `size_of::<T>()`
        // bytes; writing initialises it before the reference is formed.
        unsafe {
            ptr.as_ptr().write(value);
            Ok(&mut *ptr.as_ptr())
        }
    }

    /// Copy a slice into the arena.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_slice_copy<T: Copy>(&self, src: &[T]) -> Result<&mut [T], ArenaError> {
        let ptr = self.alloc_layout(Layout::for_value(src))?.cast::<T>();
        // SAFETY: the destination is fresh arena memory sized and aligned for
        // `src.len()` values of `T`, so it cannot overlap `src`.
        unsafe {
            ptr::copy_nonoverlapping(src.as_ptr(), ptr.as_ptr(), src.len());
            Ok(slice::from_raw_parts_mut(ptr.as_ptr(), src.len()))
        }
    }

    /// Allocate `len` clones of `value`.
    ///
    /// Clones are never dropped.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_slice_fill<T: Clone>(&self, len: usize, value: T) -> Result<&mut [T], ArenaError> {
        let layout = Layout::array::<T>(len).map_err(|_| ArenaError::SizeOverflow {
            requested: len.saturating_mul(size_of::<T>()),
            alignment: align_of::<T>(),
        })?;
        let ptr = self.alloc_layout(layout)?.cast::<T>();
        for i in 0..len {
            // SAFETY: `i < len`, so the slot is in bounds of the allocation.
            unsafe { ptr.as_ptr().add(i).write(value.clone()) };
        }
        // SAFETY: all `len` slots were initialised above.
        Ok(unsafe { slice::from_raw_parts_mut(ptr.as_ptr(), len) })
    }

    /// Copy a string into the arena.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_str(&self, s: &str) -> Result<&mut str, ArenaError> {
        let bytes = self.alloc_slice_copy(s.as_bytes())?;
        // SAFETY: the bytes were copied verbatim from a valid `str`.
        Ok(unsafe { std::str::from_utf8_unchecked_mut(bytes) })
    }
}

#[cfg(test)]
mod tests {
    use crate::Arena;

    #[test]
    fn calloc_zero_fills_reused_memory() {
        let mut arena = Arena::with_block_size(256).unwrap();
        arena.alloc_slice_fill(128, 0xAAu8).unwrap();
        arena.reset();
        let bytes = arena.alloc_bytes(128).unwrap();
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn alloc_value_round_trips() {
        let arena = Arena::with_block_size(256).unwrap();
        let x = arena.alloc_value(0xDEAD_BEEF_u64).unwrap();
        let y = arena.alloc_value([1u16, 2, 3]).unwrap();
        *x += 1;
        y[2] = 9;
        assert_eq!(*x, 0xDEAD_BEF0);
        assert_eq!(*y, [1, 2, 9]);
        assert_eq!((&*x as *const u64) as usize % align_of::<u64>(), 0);
    }

    #[test]
    fn zero_sized_values_need_no_block() {
        let arena = Arena::with_block_size(64).unwrap();
        let _unit: &mut () = arena.alloc_value(()).unwrap();
        let empty = arena.alloc_slice_copy::<u32>(&[]).unwrap();
        assert!(empty.is_empty());
        assert_eq!(arena.stats().block_count, 0);
    }

    #[test]
    fn slices_and_strings_are_copied() {
        let arena = Arena::with_block_size(256).unwrap();
        let src = [1i32, -2, 3, -4];
        let copy = arena.alloc_slice_copy(&src).unwrap();
        copy[0] = 10;
        assert_eq!(copy, &[10, -2, 3, -4]);
        assert_eq!(src[0], 1);

        let s = arena.alloc_str("hello arena").unwrap();
        s.make_ascii_uppercase();
        assert_eq!(s, "HELLO ARENA");
    }

    #[test]
    fn fill_clones_value() {
        let arena = Arena::with_block_size(256).unwrap();
        let filled = arena.alloc_slice_fill(5, 7u8).unwrap();
        assert_eq!(filled, &[7, 7, 7, 7, 7]);
    }

    #[test]
    fn huge_fill_is_size_overflow() {
        let arena = Arena::with_block_size(64).unwrap();
        let result = arena.alloc_slice_fill(usize::MAX, 0u64);
        assert!(result.is_err());
    }

    #[test]
    fn references_survive_growth() {
        let arena = Arena::with_block_size(64).unwrap();
        let first = arena.alloc_slice_fill(48, 0x11u8).unwrap();
        for _ in 0..10 {
            arena.alloc_slice_fill(60, 0x22u8).unwrap();
        }
        assert!(first.iter().all(|&b| b == 0x11));
        assert!(arena.stats().block_count > 1);
    }
}
