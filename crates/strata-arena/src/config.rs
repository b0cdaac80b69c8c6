//! Arena configuration parameters.

use crate::error::ArenaError;

/// Configuration for the arena allocator.
///
/// Controls block sizing, the default alignment, and an optional budget on
/// reserved memory. Validated at construction; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Capacity in bytes of each new block.
    ///
    /// A block is created with `max(block_size, request)` bytes, so a
    /// single oversized request gets a dedicated block. `0` selects
    /// [`ArenaConfig::DEFAULT_BLOCK_SIZE`].
    pub block_size: usize,

    /// Alignment applied by `alloc` and `calloc`.
    ///
    /// Default: 8. Must be a power of two.
    pub default_alignment: usize,

    /// Upper bound on the sum of all block capacities.
    ///
    /// `None` (the default) means growth is limited only by the system
    /// allocator. When set, growth that would cross the limit fails with
    /// [`ArenaError::CapacityExceeded`].
    pub max_reserved_bytes: Option<usize>,
}

impl ArenaConfig {
    /// Default block size: 1 MiB.
    pub const DEFAULT_BLOCK_SIZE: usize = 1024 * 1024;

    /// Default alignment for `alloc` and `calloc`.
    pub const DEFAULT_ALIGNMENT: usize = 8;

    /// Create a config with the given block size (`0` for the default).
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size,
            default_alignment: Self::DEFAULT_ALIGNMENT,
            max_reserved_bytes: None,
        }
    }

    /// Set the block size (`0` for the default).
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Set the alignment used by `alloc` and `calloc`.
    pub fn with_default_alignment(mut self, alignment: usize) -> Self {
        self.default_alignment = alignment;
        self
    }

    /// Cap the total bytes the arena may reserve.
    pub fn with_max_reserved_bytes(mut self, limit: usize) -> Self {
        self.max_reserved_bytes = Some(limit);
        self
    }

    /// Block size after substituting the default for `0`.
    pub fn effective_block_size(&self) -> usize {
        if self.block_size == 0 {
            Self::DEFAULT_BLOCK_SIZE
        } else {
            self.block_size
        }
    }

    /// Check the config for values no arena could honour.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.block_size > isize::MAX as usize {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "block_size must not exceed isize::MAX (got {})",
                    self.block_size
                ),
            });
        }
        if !self.default_alignment.is_power_of_two() {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "default_alignment must be a power of two (got {})",
                    self.default_alignment
                ),
            });
        }
        if let Some(limit) = self.max_reserved_bytes {
            if limit == 0 {
                return Err(ArenaError::InvalidConfig {
                    reason: "max_reserved_bytes must be non-zero when set".to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(0)
    }
}
