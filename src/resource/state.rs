use crate::error::{FetchError, FetchErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// A domain value with a stable identifier.
pub trait Record: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + fmt::Debug + Send + Sync;

    fn id(&self) -> &Self::Id;
}

/// Fetch lifecycle phase of a resource store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

impl Status {
    /// Whether a fetch is in flight.
    #[must_use]
    pub const fn is_loading(self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Whether at least one fetch has finished, successfully or not.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success => "success",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// The captured failure of the last fetch, ready to show to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    kind: FetchErrorKind,
    message: String,
}

impl Failure {
    /// Category of the failure.
    #[must_use]
    pub const fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    /// Never empty.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&FetchError> for Failure {
    fn from(error: &FetchError) -> Self {
        Self {
            kind: error.kind(),
            message: error.user_message().into_owned(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Snapshot of a resource store.
///
/// Only the owning [`ResourceStore`](super::ResourceStore) can move it
/// between phases, which keeps these invariants:
/// - `status == Error` implies `error` is set,
/// - `status == Loading` implies `error` is cleared,
/// - `items` is only ever replaced as a whole, by a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceState<R> {
    items: Vec<R>,
    status: Status,
    error: Option<Failure>,
}

impl<R> ResourceState<R> {
    pub(crate) const fn new() -> Self {
        Self {
            items: Vec::new(),
            status: Status::Idle,
            error: None,
        }
    }

    /// Records in fetch-result order. Possibly stale while loading or after an error.
    pub fn items(&self) -> &[R] {
        &self.items
    }

    /// Take ownership of the records.
    pub fn into_items(self) -> Vec<R> {
        self.items
    }

    /// Current fetch phase.
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Failure of the last fetch; cleared when the next one starts.
    pub const fn error(&self) -> Option<&Failure> {
        self.error.as_ref()
    }

    /// User-facing message of the current failure.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(Failure::message)
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no records are held.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn begin_loading(&mut self) {
        self.status = Status::Loading;
        self.error = None;
    }

    pub(crate) fn succeed(&mut self, items: Vec<R>) {
        self.items = items;
        self.status = Status::Success;
        self.error = None;
    }

    pub(crate) fn fail(&mut self, error: &FetchError) {
        self.status = Status::Error;
        self.error = Some(Failure::from(error));
    }
}

impl<R: Record> ResourceState<R> {
    /// Look up a record by id.
    pub fn find(&self, id: &R::Id) -> Option<&R> {
        self.items.iter().find(|item| item.id() == id)
    }
}

impl<R> Default for ResourceState<R> {
    fn default() -> Self {
        Self::new()
    }
}
