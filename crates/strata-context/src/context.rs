//! The execution context.

use std::any::Any;
use std::ptr::NonNull;

use strata_arena::{Arena, ArenaConfig, ArenaError, Scratch};
use tracing::debug;

use crate::config::ContextConfig;
use crate::error::ContextError;
use crate::extensions::Extensions;
use crate::slot::ArenaSlot;

/// Bundles a long-lived global arena, a temporary arena, and typed
/// extensions, passed explicitly to the code that needs them.
///
/// On drop, extensions are dropped first (in insertion order), then the
/// temporary arena, then the global arena if the context owns it.
///
/// ```
/// use strata_context::{Context, ContextConfig};
///
/// let mut ctx = Context::new(ContextConfig::default()).unwrap();
/// let name = ctx.global().alloc_str("player").unwrap().len();
/// ctx.with_scratch(|scratch| {
///     let buf = scratch.alloc_bytes(4096).unwrap();
///     buf[0] = 1;
/// });
/// assert_eq!(name, 6);
/// assert_eq!(ctx.temp().used_bytes(), 0);
/// ```
#[derive(Debug)]
pub struct Context<'a> {
    extensions: Extensions,
    temp: Arena,
    global: ArenaSlot<'a>,
}

impl Context<'static> {
    /// Create a context that owns a new global arena.
    pub fn new(config: ContextConfig) -> Result<Self, ContextError> {
        config.validate()?;
        let global = Arena::new(config.global)?;
        Self::assemble(ArenaSlot::Owned(global), config.temp, config.max_extensions)
    }
}

impl<'a> Context<'a> {
    /// Create a context that allocates global memory from `global`.
    ///
    /// `config.global` is not applied; the borrowed arena keeps its own
    /// configuration and everything allocated through it.
    pub fn with_global(global: &'a mut Arena, config: ContextConfig) -> Result<Self, ContextError> {
        config.validate()?;
        Self::assemble(
            ArenaSlot::Borrowed(global),
            config.temp,
            config.max_extensions,
        )
    }

    fn assemble(
        global: ArenaSlot<'a>,
        temp: ArenaConfig,
        max_extensions: usize,
    ) -> Result<Self, ContextError> {
        let temp = Arena::new(temp)?;
        debug!(
            global = %global.id(),
            temp = %temp.id(),
            owns_global = global.is_owned(),
            "context created"
        );
        Ok(Self {
            extensions: Extensions::new(max_extensions),
            temp,
            global,
        })
    }

    /// Allocate `size` bytes from the global arena.
    pub fn alloc(&self, size: usize) -> Result<NonNull<u8>, ArenaError> {
        self.global.alloc(size)
    }

    /// Allocate `size` bytes from the temporary arena.
    pub fn temp_alloc(&self, size: usize) -> Result<NonNull<u8>, ArenaError> {
        self.temp.alloc(size)
    }

    /// The global arena.
    pub fn global(&self) -> &Arena {
        &self.global
    }

    /// Mutable access to the global arena, for markers and resets.
    pub fn global_mut(&mut self) -> &mut Arena {
        &mut self.global
    }

    /// The temporary arena.
    pub fn temp(&self) -> &Arena {
        &self.temp
    }

    /// Mutable access to the temporary arena.
    pub fn temp_mut(&mut self) -> &mut Arena {
        &mut self.temp
    }

    /// Open a scratch region over the temporary arena.
    pub fn scratch(&mut self) -> Scratch<'_> {
        self.temp.scratch()
    }

    /// Run `f` with a scratch region over the temporary arena.
    pub fn with_scratch<R>(&mut self, f: impl FnOnce(&mut Scratch<'_>) -> R) -> R {
        self.temp.with_scratch(f)
    }

    /// Discard everything in the temporary arena, keeping its blocks.
    pub fn reset_temp(&mut self) {
        self.temp.reset();
    }

    /// Whether dropping the context frees the global arena.
    pub fn owns_global_arena(&self) -> bool {
        self.global.is_owned()
    }

    /// Store an extension value, returning the previous one of the same
    /// type.
    pub fn insert_extension<T: Any + Send>(&mut self, value: T) -> Result<Option<T>, ContextError> {
        self.extensions.insert(value)
    }

    /// The extension of type `T`, if present.
    pub fn extension<T: Any + Send>(&self) -> Option<&T> {
        self.extensions.get::<T>()
    }

    /// Mutable access to the extension of type `T`.
    pub fn extension_mut<T: Any + Send>(&mut self) -> Option<&mut T> {
        self.extensions.get_mut::<T>()
    }

    /// Remove and return the extension of type `T`.
    pub fn remove_extension<T: Any + Send>(&mut self) -> Option<T> {
        self.extensions.remove::<T>()
    }

    /// Number of extensions stored.
    pub fn extension_count(&self) -> usize {
        self.extensions.len()
    }

    /// Whether an extension of type `T` is stored.
    pub fn has_extension<T: Any + Send>(&self) -> bool {
        self.extensions.contains::<T>()
    }

    /// Maximum number of extension types this context accepts.
    pub fn extension_limit(&self) -> usize {
        self.extensions.limit()
    }

    /// Tear the context down and hand back the global arena if it was
    /// owned. Extensions and the temporary arena are dropped.
    pub fn into_global_arena(self) -> Option<Arena> {
        let Self {
            extensions,
            temp,
            global,
        } = self;
        drop(extensions);
        drop(temp);
        global.into_owned()
    }
}
