//! Arena-specific error types.

use std::error::Error;
use std::fmt;

use crate::id::ArenaId;

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The system allocator could not supply a new block.
    OutOfMemory {
        /// Number of bytes requested by the caller.
        requested: usize,
        /// Alignment requested by the caller.
        alignment: usize,
    },
    /// Growing the arena would exceed its configured reservation budget.
    CapacityExceeded {
        /// Capacity of the block that would have been created.
        requested: usize,
        /// Bytes already reserved across all blocks.
        reserved: usize,
        /// The configured `max_reserved_bytes` limit.
        limit: usize,
    },
    /// The requested alignment is not a power of two.
    InvalidAlignment {
        /// The rejected alignment.
        alignment: usize,
    },
    /// The request cannot be expressed as a valid memory layout.
    SizeOverflow {
        /// Number of bytes requested.
        requested: usize,
        /// Alignment requested.
        alignment: usize,
    },
    /// The arena configuration was rejected at construction.
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
    /// A temporary marker was handed to an arena other than the one that
    /// created it.
    ForeignMarker {
        /// Arena the marker was captured on.
        marker_arena: ArenaId,
        /// Arena the marker was handed to.
        arena: ArenaId,
    },
    /// A temporary marker is no longer open: an enclosing marker was
    /// restored first, or the arena was reset or freed since capture.
    StaleMarker {
        /// Sequence number of the rejected marker.
        sequence: u64,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory {
                requested,
                alignment,
            } => {
                write!(
                    f,
                    "out of memory: could not reserve a block for {requested} bytes (align {alignment})"
                )
            }
            Self::CapacityExceeded {
                requested,
                reserved,
                limit,
            } => {
                write!(
                    f,
                    "arena capacity exceeded: new block of {requested} bytes on top of {reserved} reserved, limit {limit} bytes"
                )
            }
            Self::InvalidAlignment { alignment } => {
                write!(f, "alignment {alignment} is not a power of two")
            }
            Self::SizeOverflow {
                requested,
                alignment,
            } => {
                write!(
                    f,
                    "allocation of {requested} bytes with align {alignment} overflows the address space"
                )
            }
            Self::InvalidConfig { reason } => write!(f, "invalid arena config: {reason}"),
            Self::ForeignMarker {
                marker_arena,
                arena,
            } => {
                write!(
                    f,
                    "marker from arena {marker_arena} cannot restore arena {arena}"
                )
            }
            Self::StaleMarker { sequence } => {
                write!(f, "stale temporary marker #{sequence}")
            }
        }
    }
}

impl Error for ArenaError {}

impl ArenaError {
    /// Whether this error reports exhaustion rather than misuse.
    ///
    /// Exhaustion errors may succeed if retried with a smaller request or
    /// after memory has been reclaimed; misuse errors never will.
    pub fn is_exhaustion(&self) -> bool {
        matches!(
            self,
            Self::OutOfMemory { .. } | Self::CapacityExceeded { .. }
        )
    }
}
