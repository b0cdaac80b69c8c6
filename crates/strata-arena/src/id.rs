//! Identifiers for arenas and the blocks in their chains.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique [`ArenaId`] allocation.
static ARENA_INSTANCE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance identifier for an [`Arena`](crate::Arena).
///
/// Allocated from a monotonic atomic counter. Two distinct arenas always
/// have different IDs, even if one is dropped and the next is constructed
/// at the same address, so a marker can never be mistaken for one taken
/// on a different arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArenaId(u64);

impl ArenaId {
    /// Allocate a fresh, unique arena ID. Thread-safe.
    pub(crate) fn next() -> Self {
        Self(ARENA_INSTANCE_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ArenaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Creation serial of a block within one arena.
///
/// Serials increase with every block the arena creates and are never
/// reused, so chain order and serial order always agree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockSerial(pub(crate) u64);

impl fmt::Display for BlockSerial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
