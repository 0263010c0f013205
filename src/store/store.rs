use super::subscription::{Listeners, Subscription};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// A thread-safe store for a single piece of state.
///
/// The state lives behind an `Arc` so that subscribers can be handed the
/// freshly committed value without holding the store lock. Writers
/// copy-on-write only while a snapshot is still shared.
pub struct Store<T> {
    state: Arc<RwLock<Arc<T>>>,
    listeners: Arc<RwLock<Listeners<T>>>,
}

impl<T> Store<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a new store with the given initial state.
    pub fn new(initial: T) -> Self {
        Self {
            state: Arc::new(RwLock::new(Arc::new(initial))),
            listeners: Arc::new(RwLock::new(Listeners::new())),
        }
    }

    /// Get a clone of the current state.
    pub fn get(&self) -> T {
        T::clone(&self.state.read())
    }

    /// Get a shared handle to the current state without cloning it.
    pub fn snapshot(&self) -> Arc<T> {
        Arc::clone(&self.state.read())
    }

    /// Read state through a closure.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        let state = self.state.read();
        f(&state)
    }

    /// Update the state using a function.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        self.update_if(|state| {
            f(state);
            true
        });
    }

    /// Update the state only if the closure reports a change.
    ///
    /// The closure runs under the write lock, so a check made inside it and
    /// the mutation it guards are atomic. Subscribers are notified only when
    /// it returns `true`. Mutations made before returning `false` are still
    /// kept, so the closure should decide before touching the state.
    pub fn update_if<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut T) -> bool,
    {
        let committed = {
            let mut state = self.state.write();
            if f(Arc::make_mut(&mut state)) {
                Some(Arc::clone(&state))
            } else {
                None
            }
        };

        match committed {
            Some(snapshot) => {
                self.notify(&snapshot);
                true
            }
            None => false,
        }
    }

    /// Set a new state value.
    pub fn set(&self, new_state: T) {
        let snapshot = Arc::new(new_state);
        *self.state.write() = Arc::clone(&snapshot);
        self.notify(&snapshot);
    }

    /// Subscribe to state changes.
    ///
    /// The callback runs after every committed update, with no store lock
    /// held, so it may read the store. It stays registered until the returned
    /// [`Subscription`] is dropped.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.listeners.write().insert(Arc::new(callback));
        Subscription::new(id, Arc::downgrade(&self.listeners))
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.listeners.read().len()
    }

    fn notify(&self, snapshot: &T) {
        let listeners = self.listeners.read().snapshot();
        for listener in listeners {
            listener(snapshot);
        }
    }
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            listeners: Arc::clone(&self.listeners),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &*self.state.read())
            .field("subscribers", &self.listeners.read().len())
            .finish()
    }
}
