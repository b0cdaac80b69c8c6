//! Context configuration.

use strata_arena::ArenaConfig;

use crate::error::ContextError;

/// Configuration for a [`Context`](crate::Context).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextConfig {
    /// Configuration of the owned global arena. Not applied when the
    /// context borrows a caller's arena.
    pub global: ArenaConfig,
    /// Configuration of the temporary arena.
    pub temp: ArenaConfig,
    /// Maximum number of distinct extension types the context holds.
    pub max_extensions: usize,
}

impl ContextConfig {
    /// Default cap on extension types.
    pub const DEFAULT_MAX_EXTENSIONS: usize = 32;

    /// Use `config` for the global arena.
    pub fn with_global(mut self, config: ArenaConfig) -> Self {
        self.global = config;
        self
    }

    /// Use `config` for the temporary arena.
    pub fn with_temp(mut self, config: ArenaConfig) -> Self {
        self.temp = config;
        self
    }

    /// Cap the number of extension types.
    pub fn with_max_extensions(mut self, max: usize) -> Self {
        self.max_extensions = max;
        self
    }

    /// Check both arena configurations and the extension cap.
    pub fn validate(&self) -> Result<(), ContextError> {
        self.global.validate()?;
        self.temp.validate()?;
        if self.max_extensions == 0 {
            return Err(ContextError::InvalidConfig {
                reason: "max_extensions must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            global: ArenaConfig::default(),
            temp: ArenaConfig::default(),
            max_extensions: Self::DEFAULT_MAX_EXTENSIONS,
        }
    }
}
