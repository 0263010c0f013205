//! Persistent key-value collaborator.
//!
//! Values are stored as JSON text. [`MemoryKv`] keeps them in process memory
//! and is what tests and fixture-backed apps use; a platform backend
//! implements [`KeyValueStore`] the same way.

use crate::error::KvError;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;
use tracing::trace;

/// Async JSON key-value storage.
pub trait KeyValueStore: Send + Sync {
    /// Load and decode the value under `key`, or `None` if nothing is stored.
    fn get_json<T>(&self, key: &str) -> impl Future<Output = Result<Option<T>, KvError>> + Send
    where
        T: DeserializeOwned + Send;

    /// Encode and store `value` under `key`, replacing any previous value.
    fn set_json<T>(&self, key: &str, value: &T) -> impl Future<Output = Result<(), KvError>> + Send
    where
        T: Serialize + Sync;

    /// Delete `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), KvError>> + Send;
}

/// In-memory [`KeyValueStore`]. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    entries: Arc<RwLock<FxHashMap<String, String>>>,
}

impl MemoryKv {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw JSON text stored under `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    /// Store raw text under `key` without encoding it.
    pub fn insert_raw(&self, key: impl Into<String>, text: impl Into<String>) {
        self.entries.write().insert(key.into(), text.into());
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryKv {
    fn get_json<T>(&self, key: &str) -> impl Future<Output = Result<Option<T>, KvError>> + Send
    where
        T: DeserializeOwned + Send,
    {
        let entries = Arc::clone(&self.entries);
        let key = key.to_owned();
        async move {
            let text = entries.read().get(&key).cloned();
            let Some(text) = text else {
                trace!(%key, "kv miss");
                return Ok(None);
            };
            serde_json::from_str(&text)
                .map(Some)
                .map_err(|source| KvError::Decode { key: Cow::Owned(key), source })
        }
    }

    fn set_json<T>(&self, key: &str, value: &T) -> impl Future<Output = Result<(), KvError>> + Send
    where
        T: Serialize + Sync,
    {
        let encoded = serde_json::to_string(value)
            .map_err(|source| KvError::Encode { key: Cow::Owned(key.to_owned()), source });
        let entries = Arc::clone(&self.entries);
        let key = key.to_owned();
        async move {
            let text = encoded?;
            trace!(%key, bytes = text.len(), "kv write");
            entries.write().insert(key, text);
            Ok(())
        }
    }

    fn remove(&self, key: &str) -> impl Future<Output = Result<(), KvError>> + Send {
        let entries = Arc::clone(&self.entries);
        let key = key.to_owned();
        async move {
            let removed = entries.write().remove(&key).is_some();
            trace!(%key, removed, "kv remove");
            Ok::<(), KvError>(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Prefs {
        theme: String,
        units: String,
    }

    #[tokio::test]
    async fn set_then_get() {
        let kv = MemoryKv::new();
        let prefs = Prefs {
            theme: "dark".into(),
            units: "metric".into(),
        };
        kv.set_json("prefs", &prefs).await.unwrap();

        let loaded: Option<Prefs> = kv.get_json("prefs").await.unwrap();
        assert_eq!(loaded, Some(prefs));
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let kv = MemoryKv::new();
        let loaded: Option<Prefs> = kv.get_json("nothing").await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn remove_deletes_and_tolerates_missing() {
        let kv = MemoryKv::new();
        kv.set_json("n", &1_u32).await.unwrap();
        kv.remove("n").await.unwrap();
        kv.remove("n").await.unwrap();
        assert!(kv.is_empty());
    }

    #[tokio::test]
    async fn operations_take_effect_when_awaited() {
        let kv = MemoryKv::new();
        kv.insert_raw("n", "1");

        let read = kv.get_json::<u32>("n");
        let write = kv.set_json("m", &2_u32);
        let remove = kv.remove("n");
        kv.insert_raw("n", "3");

        assert_eq!(read.await.unwrap(), Some(3));
        drop(write);
        drop(remove);
        assert_eq!(kv.raw("n").as_deref(), Some("3"));
        assert!(kv.raw("m").is_none());
    }

    #[tokio::test]
    async fn corrupt_value_is_a_decode_error() {
        let kv = MemoryKv::new();
        kv.insert_raw("prefs", "{not json");

        let error = kv.get_json::<Prefs>("prefs").await.unwrap_err();
        assert!(matches!(error, KvError::Decode { ref key, .. } if key == "prefs"));
    }
}
