use super::state::Record;
use crate::error::FetchError;
use parking_lot::RwLock;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Where a [`ResourceStore`](super::ResourceStore) gets its records from.
///
/// `Query` carries per-call fetch options; sources without options use `()`.
pub trait DataSource: Send + Sync + 'static {
    type Record: Record;
    type Query: Send + 'static;

    fn fetch(
        &self,
        query: Self::Query,
    ) -> impl Future<Output = Result<Vec<Self::Record>, FetchError>> + Send;
}

impl<S: DataSource> DataSource for Arc<S> {
    type Record = S::Record;
    type Query = S::Query;

    fn fetch(
        &self,
        query: Self::Query,
    ) -> impl Future<Output = Result<Vec<Self::Record>, FetchError>> + Send {
        S::fetch(self, query)
    }
}

/// Data source backed by an async closure. Built with [`from_fn`].
pub struct FnSource<F, R, Q> {
    f: F,
    _marker: std::marker::PhantomData<fn(Q) -> R>,
}

/// Adapt an async closure into a [`DataSource`].
///
/// ```
/// use pantry::{from_fn, FetchError, Record, ResourceStore, Status};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Habit { id: u32 }
///
/// impl Record for Habit {
///     type Id = u32;
///     fn id(&self) -> &u32 { &self.id }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = ResourceStore::new(from_fn(|(): ()| async {
///     Ok::<_, FetchError>(vec![Habit { id: 1 }])
/// }));
/// store.fetch().await;
/// assert_eq!(store.state().status(), Status::Success);
/// # }
/// ```
pub fn from_fn<F, Fut, R, Q>(f: F) -> FnSource<F, R, Q>
where
    F: Fn(Q) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<R>, FetchError>> + Send,
    R: Record,
    Q: Send + 'static,
{
    FnSource {
        f,
        _marker: std::marker::PhantomData,
    }
}

impl<F, Fut, R, Q> DataSource for FnSource<F, R, Q>
where
    F: Fn(Q) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<R>, FetchError>> + Send,
    R: Record,
    Q: Send + 'static,
{
    type Record = R;
    type Query = Q;

    fn fetch(&self, query: Q) -> impl Future<Output = Result<Vec<R>, FetchError>> + Send {
        (self.f)(query)
    }
}

impl<F, R, Q> fmt::Debug for FnSource<F, R, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSource").finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct Script<R> {
    items: Vec<R>,
    failure: Option<FetchError>,
}

/// In-memory fixture standing in for a network call.
///
/// Every fetch sleeps for the configured latency, then returns the scripted
/// items or the scripted failure. Clones share the same script, so a test can
/// keep a handle and re-script the source while a store owns another.
#[derive(Debug)]
pub struct FixtureSource<R> {
    script: Arc<RwLock<Script<R>>>,
    latency: Duration,
}

impl<R: Record> FixtureSource<R> {
    /// A fixture that answers with `items` and no delay.
    pub fn new(items: Vec<R>) -> Self {
        Self {
            script: Arc::new(RwLock::new(Script { items, failure: None })),
            latency: Duration::ZERO,
        }
    }

    /// A fixture whose fetches fail until [`recover`](Self::recover) is called.
    pub fn failing(error: FetchError) -> Self {
        let source = Self::new(Vec::new());
        source.fail_with(error);
        source
    }

    /// Delay every fetch by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Simulated network delay per fetch.
    pub const fn latency(&self) -> Duration {
        self.latency
    }

    /// Replace the records returned by later fetches.
    pub fn set_items(&self, items: Vec<R>) {
        self.script.write().items = items;
    }

    /// Make later fetches fail with `error`.
    pub fn fail_with(&self, error: FetchError) {
        self.script.write().failure = Some(error);
    }

    /// Clear the scripted failure.
    pub fn recover(&self) {
        self.script.write().failure = None;
    }
}

impl<R: Clone> Script<R> {
    fn outcome(&self) -> Result<Vec<R>, FetchError> {
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(self.items.clone()),
        }
    }
}

impl<R> Clone for FixtureSource<R> {
    fn clone(&self) -> Self {
        Self {
            script: Arc::clone(&self.script),
            latency: self.latency,
        }
    }
}

impl<R: Record> DataSource for FixtureSource<R> {
    type Record = R;
    type Query = ();

    fn fetch(&self, (): ()) -> impl Future<Output = Result<Vec<R>, FetchError>> + Send {
        let latency = self.latency;
        let script = Arc::clone(&self.script);
        async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            let outcome = script.read().outcome();
            outcome
        }
    }
}
