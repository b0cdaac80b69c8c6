//! Typed per-context extension storage.
//!
//! Each extension type has at most one value per context, keyed by its
//! `TypeId`. Values are kept in insertion order and dropped in that order
//! when the owning context goes away, which is where an extension does any
//! finalisation.

use std::any::{type_name, Any, TypeId};

use indexmap::IndexMap;
use tracing::debug;

use crate::error::ContextError;

/// Heterogeneous map from extension type to its single value.
pub struct Extensions {
    entries: IndexMap<TypeId, Box<dyn Any + Send>>,
    limit: usize,
}

impl Extensions {
    /// Empty storage holding at most `limit` extension types.
    pub fn new(limit: usize) -> Self {
        Self {
            entries: IndexMap::new(),
            limit,
        }
    }

    /// Store `value`, returning the previous value of the same type.
    ///
    /// Replacing keeps the extension's original position in drop order.
    ///
    /// # Errors
    ///
    /// [`ContextError::ExtensionLimit`] if `T` is new and the storage is
    /// full. The existing extensions are untouched.
    pub fn insert<T: Any + Send>(&mut self, value: T) -> Result<Option<T>, ContextError> {
        let key = TypeId::of::<T>();
        if let Some(slot) = self.entries.get_mut(&key) {
            let previous = std::mem::replace(slot, Box::new(value));
            return Ok(previous.downcast::<T>().ok().map(|boxed| *boxed));
        }
        if self.entries.len() >= self.limit {
            return Err(ContextError::ExtensionLimit {
                limit: self.limit,
                type_name: type_name::<T>(),
            });
        }
        self.entries.insert(key, Box::new(value));
        debug!(
            extension = type_name::<T>(),
            count = self.entries.len(),
            "extension registered"
        );
        Ok(None)
    }

    /// The stored value of type `T`.
    pub fn get<T: Any + Send>(&self) -> Option<&T> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<T>())
    }

    /// Mutable access to the stored value of type `T`.
    pub fn get_mut<T: Any + Send>(&mut self) -> Option<&mut T> {
        self.entries
            .get_mut(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_mut::<T>())
    }

    /// Take the value of type `T` out, preserving the order of the rest.
    pub fn remove<T: Any + Send>(&mut self) -> Option<T> {
        let boxed = self.entries.shift_remove(&TypeId::of::<T>())?;
        debug!(extension = type_name::<T>(), "extension removed");
        boxed.downcast::<T>().ok().map(|boxed| *boxed)
    }

    /// Whether a value of type `T` is stored.
    pub fn contains<T: Any + Send>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Number of stored extensions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no extension is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of extension types.
    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl std::fmt::Debug for Extensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extensions")
            .field("len", &self.entries.len())
            .field("limit", &self.limit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, PartialEq)]
    struct Counter(u32);

    struct Logger {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Drop for Logger {
        fn drop(&mut self) {
            self.log.lock().unwrap().push(self.name);
        }
    }

    struct Second(Logger);

    #[test]
    fn insert_get_replace() {
        let mut ext = Extensions::new(4);
        assert_eq!(ext.insert(Counter(1)).unwrap(), None);
        assert_eq!(ext.get::<Counter>(), Some(&Counter(1)));
        ext.get_mut::<Counter>().unwrap().0 += 5;
        assert_eq!(ext.insert(Counter(0)).unwrap(), Some(Counter(6)));
        assert_eq!(ext.len(), 1);
        assert!(ext.get::<String>().is_none());
    }

    #[test]
    fn remove_returns_value() {
        let mut ext = Extensions::new(4);
        ext.insert(String::from("hi")).unwrap();
        assert!(ext.contains::<String>());
        assert_eq!(ext.remove::<String>().as_deref(), Some("hi"));
        assert!(ext.is_empty());
        assert_eq!(ext.remove::<String>(), None);
    }

    #[test]
    fn limit_rejects_new_types_only() {
        let mut ext = Extensions::new(1);
        ext.insert(1u8).unwrap();
        let err = ext.insert(2u16).unwrap_err();
        assert!(matches!(err, ContextError::ExtensionLimit { limit: 1, .. }));
        assert_eq!(ext.insert(3u8).unwrap(), Some(1));
        assert_eq!(ext.len(), 1);
    }

    #[test]
    fn drops_in_insertion_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        {
            let mut ext = Extensions::new(4);
            ext.insert(Logger {
                name: "first",
                log: Arc::clone(&log),
            })
            .unwrap();
            ext.insert(Second(Logger {
                name: "second",
                log: Arc::clone(&log),
            }))
            .unwrap();
        }
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }
}
