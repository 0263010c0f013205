use super::source::DataSource;
use super::state::{ResourceState, Status};
use crate::config::{CommitPolicy, StoreConfig};
use crate::error::FetchError;
use crate::store::{Store, Subscription};
use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

const DEFAULT_STORE_NAME: &str = "resource";

/// Result of one fetch, as seen by the caller.
///
/// A fetch never fails from the caller's point of view; the failure, if any,
/// is recorded in the store state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// The outcome was written to the store.
    Applied { ticket: u64, status: Status },
    /// A newer fetch was issued before this one resolved, so its outcome was dropped.
    Discarded { ticket: u64 },
}

impl Commit {
    /// Ticket issued to the fetch that produced this commit.
    #[must_use]
    pub const fn ticket(&self) -> u64 {
        match self {
            Self::Applied { ticket, .. } | Self::Discarded { ticket } => *ticket,
        }
    }

    /// Whether the outcome reached the store.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    /// Status written by this commit, if it was applied.
    #[must_use]
    pub const fn status(&self) -> Option<Status> {
        match self {
            Self::Applied { status, .. } => Some(*status),
            Self::Discarded { .. } => None,
        }
    }
}

struct Inner<S: DataSource> {
    name: Cow<'static, str>,
    source: S,
    state: Store<ResourceState<S::Record>>,
    issued: AtomicU64,
    policy: CommitPolicy,
}

impl<S: DataSource> Inner<S> {
    /// Issue a ticket and enter loading as one step under the write lock, so
    /// the newest ticket is never older than the last loading transition.
    fn begin(&self) -> u64 {
        let mut ticket = 0;
        self.state.update(|state| {
            ticket = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
            state.begin_loading();
        });
        debug!(store = %self.name, ticket, "fetch started");
        ticket
    }

    fn commit(&self, ticket: u64, outcome: Result<Vec<S::Record>, FetchError>) -> Commit {
        let status = match &outcome {
            Ok(_) => Status::Success,
            Err(_) => Status::Error,
        };
        if let Err(error) = &outcome {
            debug!(store = %self.name, ticket, kind = %error.kind(), %error, "fetch failed");
        }

        let applied = self.state.update_if(|state| {
            if self.policy == CommitPolicy::LatestIssued
                && ticket != self.issued.load(Ordering::SeqCst)
            {
                return false;
            }
            match outcome {
                Ok(items) => state.succeed(items),
                Err(error) => state.fail(&error),
            }
            true
        });

        if applied {
            trace!(store = %self.name, ticket, %status, "fetch committed");
            Commit::Applied { ticket, status }
        } else {
            debug!(store = %self.name, ticket, "stale fetch discarded");
            Commit::Discarded { ticket }
        }
    }
}

/// Observable collection of records loaded from a [`DataSource`].
///
/// Cloning yields another handle to the same store. Every fetch moves the
/// store to [`Status::Loading`] immediately, keeps the previous items visible
/// while the source runs, and then either replaces the items wholesale
/// ([`Status::Success`]) or records the failure and keeps the old items
/// ([`Status::Error`]).
///
/// ```
/// use pantry::{FixtureSource, Record, ResourceStore, Status};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Entry { id: &'static str }
///
/// impl Record for Entry {
///     type Id = &'static str;
///     fn id(&self) -> &Self::Id { &self.id }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = ResourceStore::new(FixtureSource::new(vec![Entry { id: "a" }, Entry { id: "b" }]));
/// assert_eq!(store.state().status(), Status::Idle);
///
/// let pending = store.fetch();
/// assert_eq!(store.state().status(), Status::Loading);
///
/// pending.await;
/// let state = store.state();
/// assert_eq!(state.status(), Status::Success);
/// assert_eq!(state.items(), &[Entry { id: "a" }, Entry { id: "b" }]);
/// # }
/// ```
pub struct ResourceStore<S: DataSource> {
    inner: Arc<Inner<S>>,
}

impl<S: DataSource> ResourceStore<S> {
    /// Create a store with the default commit policy.
    pub fn new(source: S) -> Self {
        Self::builder(source).build()
    }

    /// Start configuring a store around `source`.
    pub fn builder(source: S) -> ResourceStoreBuilder<S> {
        ResourceStoreBuilder {
            source,
            name: Cow::Borrowed(DEFAULT_STORE_NAME),
            policy: CommitPolicy::default(),
        }
    }

    /// Name used in log events.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// How overlapping fetches are settled.
    pub fn policy(&self) -> CommitPolicy {
        self.inner.policy
    }

    /// The data source this store fetches from.
    pub fn source(&self) -> &S {
        &self.inner.source
    }

    /// Clone of the current state.
    pub fn state(&self) -> ResourceState<S::Record> {
        self.inner.state.get()
    }

    /// Shared handle to the current state without cloning the items.
    pub fn snapshot(&self) -> Arc<ResourceState<S::Record>> {
        self.inner.state.snapshot()
    }

    /// Run `f` against the current state under the read lock.
    pub fn read<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&ResourceState<S::Record>) -> T,
    {
        self.inner.state.read(f)
    }

    /// Register a listener called after every committed transition.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ResourceState<S::Record>) + Send + Sync + 'static,
    {
        self.inner.state.subscribe(listener)
    }

    /// Highest ticket handed out so far; `0` before the first fetch.
    pub fn last_ticket(&self) -> u64 {
        self.inner.issued.load(Ordering::SeqCst)
    }

    /// Start a fetch with explicit options.
    ///
    /// The store enters [`Status::Loading`] before this returns, so the
    /// transition is visible before the returned future is polled. The future
    /// owns a handle to the store and can be spawned.
    pub fn fetch_with(&self, query: S::Query) -> impl Future<Output = Commit> + Send + 'static {
        let inner = Arc::clone(&self.inner);
        let ticket = inner.begin();
        async move {
            let outcome = inner.source.fetch(query).await;
            inner.commit(ticket, outcome)
        }
    }
}

impl<S> ResourceStore<S>
where
    S: DataSource,
    S::Query: Default,
{
    /// Start a fetch with default options. See [`fetch_with`](Self::fetch_with).
    pub fn fetch(&self) -> impl Future<Output = Commit> + Send + 'static {
        self.fetch_with(S::Query::default())
    }
}

impl<S: DataSource> Clone for ResourceStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: DataSource> fmt::Debug for ResourceStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (status, items) = self.read(|state| (state.status(), state.len()));
        f.debug_struct("ResourceStore")
            .field("name", &self.inner.name)
            .field("policy", &self.inner.policy)
            .field("status", &status)
            .field("items", &items)
            .field("last_ticket", &self.last_ticket())
            .finish()
    }
}

/// Builder for [`ResourceStore`].
#[derive(Debug)]
pub struct ResourceStoreBuilder<S> {
    source: S,
    name: Cow<'static, str>,
    policy: CommitPolicy,
}

impl<S: DataSource> ResourceStoreBuilder<S> {
    /// Name used in log events.
    #[must_use]
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// How overlapping fetches are settled.
    #[must_use]
    pub fn policy(mut self, policy: CommitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Take the commit policy from `config`.
    #[must_use]
    pub fn config(self, config: &StoreConfig) -> Self {
        self.policy(config.commit_policy)
    }

    /// Create the store in the idle state.
    pub fn build(self) -> ResourceStore<S> {
        ResourceStore {
            inner: Arc::new(Inner {
                name: self.name,
                source: self.source,
                state: Store::new(ResourceState::new()),
                issued: AtomicU64::new(0),
                policy: self.policy,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{from_fn, FixtureSource, Record};
    use std::sync::atomic::AtomicUsize;

    #[derive(Clone, Debug, PartialEq, Eq)]
    struct Item(&'static str);

    impl Record for Item {
        type Id = &'static str;

        fn id(&self) -> &Self::Id {
            &self.0
        }
    }

    #[tokio::test]
    async fn fetch_commits_items() {
        let store = ResourceStore::new(FixtureSource::new(vec![Item("a"), Item("b")]));
        let commit = store.fetch().await;

        assert_eq!(commit, Commit::Applied { ticket: 1, status: Status::Success });
        assert_eq!(store.state().items(), &[Item("a"), Item("b")]);
        assert_eq!(store.last_ticket(), 1);
    }

    #[tokio::test]
    async fn loading_is_visible_before_polling() {
        let store = ResourceStore::new(FixtureSource::new(vec![Item("a")]));
        let pending = store.fetch();
        assert_eq!(store.state().status(), Status::Loading);
        assert!(pending.await.is_applied());
    }

    #[tokio::test]
    async fn failure_keeps_previous_items() {
        let source = FixtureSource::new(vec![Item("a")]);
        let store = ResourceStore::new(source.clone());
        store.fetch().await;

        source.fail_with(FetchError::network("boom"));
        let commit = store.fetch().await;

        let state = store.state();
        assert_eq!(commit.status(), Some(Status::Error));
        assert_eq!(state.error_message(), Some("boom"));
        assert_eq!(state.items(), &[Item("a")]);
    }

    #[tokio::test]
    async fn query_reaches_source() {
        let store = ResourceStore::new(from_fn(|prefix: &'static str| async move {
            Ok::<_, FetchError>(vec![Item(prefix)])
        }));
        store.fetch_with("x").await;
        assert_eq!(store.state().items(), &[Item("x")]);
    }

    #[tokio::test]
    async fn subscribers_see_each_transition() {
        let store = ResourceStore::new(FixtureSource::new(vec![Item("a")]));
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let _subscription = store.subscribe(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        store.fetch().await;

        // loading + success
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn builder_sets_name_and_policy() {
        let config = StoreConfig {
            commit_policy: CommitPolicy::LastResolved,
            ..StoreConfig::default()
        };
        let store = ResourceStore::builder(FixtureSource::<Item>::new(Vec::new()))
            .name("habits")
            .config(&config)
            .build();

        assert_eq!(store.name(), "habits");
        assert_eq!(store.policy(), CommitPolicy::LastResolved);
        assert!(format!("{store:?}").contains("habits"));
    }
}
