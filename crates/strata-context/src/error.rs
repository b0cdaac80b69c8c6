//! Context-level error types.

use std::error::Error;
use std::fmt;

use strata_arena::ArenaError;

/// Errors raised while building or extending a [`Context`](crate::Context).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContextError {
    /// One of the context's arenas rejected its configuration or an
    /// allocation.
    Arena(ArenaError),
    /// The context already holds its maximum number of extension types.
    ExtensionLimit {
        /// The configured `max_extensions`.
        limit: usize,
        /// Type name of the rejected extension.
        type_name: &'static str,
    },
    /// The context configuration is invalid.
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arena(e) => write!(f, "arena: {e}"),
            Self::ExtensionLimit { limit, type_name } => {
                write!(f, "cannot add extension {type_name}: limit of {limit} reached")
            }
            Self::InvalidConfig { reason } => write!(f, "invalid context config: {reason}"),
        }
    }
}

impl Error for ContextError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Arena(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ArenaError> for ContextError {
    fn from(e: ArenaError) -> Self {
        Self::Arena(e)
    }
}
