//! Scoped scratch regions over a parent arena.
//!
//! [`Scratch`] captures a [`TempMarker`] on its parent when it begins and
//! restores it when it ends, so everything allocated through the scratch
//! is released on every exit path. It adds no state beyond the marker.
//!
//! A scratch region holds the parent mutably for its whole life. Nested
//! regions are opened from the enclosing scratch with [`Scratch::scratch`],
//! which reborrows it, so inner regions always close before outer ones.

use std::ops::Deref;

use tracing::warn;

use crate::arena::Arena;
use crate::error::ArenaError;
use crate::marker::TempMarker;

/// Temporary allocation region released on drop.
///
/// Allocate through it exactly as through the parent (it derefs to
/// [`Arena`]). References handed out borrow the scratch, so none can
/// survive its release.
///
/// # Example
///
/// ```
/// use strata_arena::Arena;
///
/// let mut arena = Arena::with_block_size(4096).unwrap();
/// arena.alloc(128).unwrap();
/// let before = arena.used_bytes();
/// {
///     let scratch = arena.scratch();
///     let tmp = scratch.alloc_bytes(1000).unwrap();
///     tmp[0] = 1;
/// }
/// assert_eq!(arena.used_bytes(), before);
/// ```
pub struct Scratch<'a> {
    arena: &'a mut Arena,
    /// `None` once released.
    marker: Option<TempMarker>,
}

impl<'a> Scratch<'a> {
    /// Open a scratch region on `arena`.
    pub fn begin(arena: &'a mut Arena) -> Self {
        let marker = arena.temp_begin();
        Self {
            arena,
            marker: Some(marker),
        }
    }

    /// Open a nested scratch region.
    ///
    /// The nested region must be released before this one can be used
    /// again.
    pub fn scratch(&mut self) -> Scratch<'_> {
        Scratch::begin(&mut *self.arena)
    }

    /// The marker this region restores on release.
    pub fn marker(&self) -> Option<&TempMarker> {
        self.marker.as_ref()
    }

    /// Release the region now, reporting any restore failure.
    ///
    /// Consumes the scratch, so a region is released at most once.
    pub fn end(mut self) -> Result<(), ArenaError> {
        self.release()
    }

    fn release(&mut self) -> Result<(), ArenaError> {
        match self.marker.take() {
            Some(marker) => self.arena.temp_end(marker),
            None => Ok(()),
        }
    }
}

impl Deref for Scratch<'_> {
    type Target = Arena;

    fn deref(&self) -> &Arena {
        &*self.arena
    }
}

impl Drop for Scratch<'_> {
    fn drop(&mut self) {
        let result = self.release();
        debug_assert!(result.is_ok(), "scratch release failed: {result:?}");
        if let Err(err) = result {
            warn!(error = %err, "scratch region could not restore its parent arena");
        }
    }
}

impl Arena {
    /// Open a scratch region on this arena.
    pub fn scratch(&mut self) -> Scratch<'_> {
        Scratch::begin(self)
    }

    /// Run `f` with a scratch region that is released when `f` returns or
    /// unwinds.
    pub fn with_scratch<R>(&mut self, f: impl FnOnce(&mut Scratch<'_>) -> R) -> R {
        let mut scratch = self.scratch();
        f(&mut scratch)
    }
}
