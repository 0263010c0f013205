//! # Pantry
//!
//! Observable async resource stores for client applications.
//!
//! ## Stores
//!
//! - `Store<T>` - Thread-safe state container with subscriptions
//! - `ResourceStore<S>` - A collection of records loaded from a `DataSource`,
//!   with an `idle | loading | success | error` status and the last failure
//!
//! Resource stores keep the previous items visible while a refresh is in
//! flight and replace them only when the refresh succeeds. Failures never
//! escape `fetch`; they are recorded on the state for the view to render.
//!
//! ## Collaborators
//!
//! - `KeyValueStore` / `MemoryKv` - async JSON key-value storage
//! - `SessionStore` - session state that is unknown until hydrated
//! - `StoreRegistry` - per-process container for store handles
//!
//! ## Logging
//!
//! Transitions are reported through `tracing` at `debug` and `trace` level.
//! Install a subscriber in the application to see them.

pub mod config;
pub mod domain;
pub mod error;
pub mod kv;
pub mod registry;
pub mod resource;
pub mod session;
pub mod store;

// Re-export main types for convenience
pub use config::{CommitPolicy, StoreConfig};
pub use error::{
    ConfigError, FetchError, FetchErrorKind, KvError, RegistryError, DEFAULT_ERROR_MESSAGE,
};
pub use kv::{KeyValueStore, MemoryKv};
pub use registry::StoreRegistry;
pub use resource::{
    from_fn, Commit, DataSource, Failure, FixtureSource, Record, ResourceState, ResourceStore,
    Status,
};
pub use session::{Access, SessionState, SessionStore};
pub use store::{Store, Subscription};
