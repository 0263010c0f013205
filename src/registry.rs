//! Per-process store container.
//!
//! Stores are constructed once at startup, put into a [`StoreRegistry`], and
//! looked up by type wherever they are needed. The registry is a cheap handle,
//! so it can be cloned into every consumer instead of relying on globals.

use crate::error::RegistryError;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Type-indexed collection of store handles. One value per type.
#[derive(Clone, Default)]
pub struct StoreRegistry {
    entries: Arc<RwLock<FxHashMap<TypeId, Entry>>>,
}

struct Entry {
    name: &'static str,
    value: Box<dyn Any + Send + Sync>,
}

impl StoreRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `store`, returning the value it replaced, if any.
    pub fn insert<T>(&self, store: T) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let name = type_name::<T>();
        let previous = self.entries.write().insert(
            TypeId::of::<T>(),
            Entry {
                name,
                value: Box::new(store),
            },
        );
        match previous {
            Some(entry) => {
                warn!(store = name, "store replaced in registry");
                entry.value.downcast::<T>().ok().map(|boxed| *boxed)
            }
            None => {
                debug!(store = name, "store registered");
                None
            }
        }
    }

    /// Handle to the store of type `T`.
    pub fn get<T>(&self) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.entries
            .read()
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.value.downcast_ref::<T>())
            .cloned()
    }

    /// Like [`get`](Self::get), but a missing store is an error.
    ///
    /// # Errors
    /// Returns [`RegistryError::Missing`] when no `T` was registered.
    pub fn require<T>(&self) -> Result<T, RegistryError>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.get::<T>().ok_or(RegistryError::Missing {
            type_name: type_name::<T>(),
        })
    }

    /// Whether a store of type `T` is registered.
    pub fn contains<T: 'static>(&self) -> bool {
        self.entries.read().contains_key(&TypeId::of::<T>())
    }

    /// Number of registered stores.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether no store is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl fmt::Debug for StoreRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.read();
        let mut names: Vec<&str> = entries.values().map(|entry| entry.name).collect();
        names.sort_unstable();
        f.debug_struct("StoreRegistry").field("stores", &names).finish()
    }
}
