//! Generic observable state containers.
//!
//! A [`Store`] holds one value, hands out snapshots, and notifies its
//! subscribers after every committed change. The resource and session stores
//! are built on top of it.

mod store;
mod subscription;

pub use store::Store;
pub use subscription::Subscription;
