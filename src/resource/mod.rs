//! Remote resource stores.
//!
//! A [`ResourceStore`] wraps a [`DataSource`] behind a status machine:
//!
//! ```text
//! idle --fetch--> loading --ok--> success
//!                 loading --err-> error
//! success | error --fetch--> loading
//! ```
//!
//! Entering `loading` clears the error and keeps the old items visible.
//! Overlapping fetches are settled by the store's [`CommitPolicy`](crate::CommitPolicy).

mod resource;
mod source;
mod state;

pub use resource::{Commit, ResourceStore, ResourceStoreBuilder};
pub use source::{from_fn, DataSource, FixtureSource, FnSource};
pub use state::{Failure, Record, ResourceState, Status};
