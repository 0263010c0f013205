use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, Weak};

pub(crate) type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Registered listeners of one store, keyed by registration id.
pub(crate) struct Listeners<T> {
    next_id: u64,
    entries: Vec<(u64, Listener<T>)>,
}

impl<T> Listeners<T> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    pub(crate) fn insert(&mut self, listener: Listener<T>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Clones the listener handles so they can be called without the lock held.
    pub(crate) fn snapshot(&self) -> Vec<Listener<T>> {
        self.entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }
}

/// Disposer returned by `subscribe`.
///
/// The listener stays registered for as long as this value is alive. Dropping
/// it, or calling [`Subscription::unsubscribe`], removes the listener. A
/// subscription that outlives its store does nothing when dropped.
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub(crate) fn new<T>(id: u64, listeners: Weak<RwLock<Listeners<T>>>) -> Self
    where
        T: Send + Sync + 'static,
    {
        Self {
            detach: Some(Box::new(move || {
                if let Some(listeners) = listeners.upgrade() {
                    listeners.write().remove(id);
                }
            })),
        }
    }

    /// Remove the listener now.
    pub fn unsubscribe(mut self) {
        self.detach_now();
    }

    /// Keep the listener registered for the rest of the store's lifetime.
    pub fn forget(mut self) {
        self.detach = None;
    }

    fn detach_now(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.detach.is_some())
            .finish()
    }
}
