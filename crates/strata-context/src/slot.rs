//! Owned or borrowed arena storage.

use std::ops::{Deref, DerefMut};

use strata_arena::Arena;

/// An arena a context either owns or borrows from its caller.
///
/// Only the `Owned` variant releases memory when dropped. A borrowed arena
/// outlives the context and keeps everything allocated through it.
#[derive(Debug)]
pub enum ArenaSlot<'a> {
    /// The context created the arena and frees it on drop.
    Owned(Arena),
    /// The caller lent the arena for the context's lifetime.
    Borrowed(&'a mut Arena),
}

impl ArenaSlot<'_> {
    /// Whether the slot owns its arena.
    pub fn is_owned(&self) -> bool {
        matches!(self, Self::Owned(_))
    }

    /// Take the arena out if it is owned.
    pub fn into_owned(self) -> Option<Arena> {
        match self {
            Self::Owned(arena) => Some(arena),
            Self::Borrowed(_) => None,
        }
    }
}

impl Deref for ArenaSlot<'_> {
    type Target = Arena;

    fn deref(&self) -> &Arena {
        match self {
            Self::Owned(arena) => arena,
            Self::Borrowed(arena) => arena,
        }
    }
}

impl DerefMut for ArenaSlot<'_> {
    fn deref_mut(&mut self) -> &mut Arena {
        match self {
            Self::Owned(arena) => arena,
            Self::Borrowed(arena) => arena,
        }
    }
}

impl From<Arena> for ArenaSlot<'_> {
    fn from(arena: Arena) -> Self {
        Self::Owned(arena)
    }
}

impl<'a> From<&'a mut Arena> for ArenaSlot<'a> {
    fn from(arena: &'a mut Arena) -> Self {
        Self::Borrowed(arena)
    }
}
