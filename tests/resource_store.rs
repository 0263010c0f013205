//! Lifecycle and race behavior of resource stores.

mod common;

use common::{init_tracing, items, Item, Scripted};
use pantry::{
    from_fn, Commit, CommitPolicy, DataSource, FetchError, FetchErrorKind, FixtureSource,
    ResourceStore, Status, DEFAULT_ERROR_MESSAGE,
};
use std::sync::{Arc, Barrier, Mutex};
use std::time::Duration;

fn scripted_store(
    policy: CommitPolicy,
) -> ResourceStore<impl DataSource<Record = Item, Query = Scripted>> {
    init_tracing();
    let source = from_fn(|script: Scripted| async move {
        tokio::time::sleep(script.delay).await;
        script.outcome
    });
    ResourceStore::builder(source).name("scripted").policy(policy).build()
}

#[tokio::test]
async fn starts_idle_and_empty() {
    let store = scripted_store(CommitPolicy::default());
    let state = store.state();

    assert_eq!(state.status(), Status::Idle);
    assert!(state.is_empty());
    assert_eq!(state.error(), None);
    assert_eq!(store.last_ticket(), 0);
}

#[tokio::test(start_paused = true)]
async fn fetch_enters_loading_before_source_resolves() {
    let store = scripted_store(CommitPolicy::default());
    let pending = store.fetch_with(Scripted::ok(100, &["a"]));

    assert_eq!(store.state().status(), Status::Loading);

    let handle = tokio::spawn(pending);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(store.state().status(), Status::Loading);

    handle.await.unwrap();
    assert_eq!(store.state().status(), Status::Success);
}

#[tokio::test(start_paused = true)]
async fn success_replaces_items_in_order() {
    let store = scripted_store(CommitPolicy::default());
    store.fetch_with(Scripted::ok(10, &["c", "a", "b"])).await;
    store.fetch_with(Scripted::ok(10, &["b", "a"])).await;

    let state = store.state();
    assert_eq!(state.status(), Status::Success);
    assert_eq!(state.items(), items(&["b", "a"]).as_slice());
}

#[tokio::test(start_paused = true)]
async fn failure_records_message_and_keeps_items() {
    let store = scripted_store(CommitPolicy::default());
    store.fetch_with(Scripted::ok(10, &["a", "b"])).await;

    let commit = store
        .fetch_with(Scripted::err(10, FetchError::unknown("boom")))
        .await;

    let state = store.state();
    assert_eq!(commit.status(), Some(Status::Error));
    assert_eq!(state.status(), Status::Error);
    assert_eq!(state.error_message(), Some("boom"));
    assert_eq!(state.items(), items(&["a", "b"]).as_slice());
}

#[tokio::test(start_paused = true)]
async fn failure_without_message_uses_default() {
    let store = scripted_store(CommitPolicy::default());
    store
        .fetch_with(Scripted::err(10, FetchError::silent(FetchErrorKind::Unknown)))
        .await;

    let state = store.state();
    let message = state.error_message().unwrap();
    assert!(!message.is_empty());
    assert_eq!(message, DEFAULT_ERROR_MESSAGE);
}

#[tokio::test(start_paused = true)]
async fn failure_kind_picks_its_own_default() {
    let store = scripted_store(CommitPolicy::default());
    store
        .fetch_with(Scripted::err(10, FetchError::silent(FetchErrorKind::Network)))
        .await;

    let state = store.state();
    let failure = state.error().unwrap();
    assert_eq!(failure.kind(), FetchErrorKind::Network);
    assert_eq!(failure.message(), FetchErrorKind::Network.default_message());
}

#[tokio::test(start_paused = true)]
async fn refetch_after_error_clears_error_on_loading() {
    let source = FixtureSource::failing(FetchError::network("offline"))
        .with_latency(Duration::from_millis(100));
    let store = ResourceStore::new(source.clone());
    store.fetch().await;
    assert_eq!(store.state().status(), Status::Error);

    source.recover();
    source.set_items(items(&["a"]));
    let pending = store.fetch();

    let state = store.state();
    assert_eq!(state.status(), Status::Loading);
    assert_eq!(state.error(), None);

    pending.await;
    assert_eq!(store.state().items(), items(&["a"]).as_slice());
}

#[tokio::test(start_paused = true)]
async fn last_resolved_policy_lets_the_slower_fetch_win() {
    let store = scripted_store(CommitPolicy::LastResolved);
    let first = store.fetch_with(Scripted::ok(200, &["first"]));
    let second = store.fetch_with(Scripted::ok(50, &["second"]));

    let (first, second) = tokio::join!(first, second);

    assert!(first.is_applied());
    assert!(second.is_applied());
    assert_eq!(store.state().items(), items(&["first"]).as_slice());
}

#[tokio::test(start_paused = true)]
async fn latest_issued_policy_discards_stale_commits() {
    let store = scripted_store(CommitPolicy::LatestIssued);
    let first = store.fetch_with(Scripted::ok(200, &["first"]));
    let second = store.fetch_with(Scripted::ok(50, &["second"]));

    let (first, second) = tokio::join!(first, second);

    assert_eq!(first, Commit::Discarded { ticket: 1 });
    assert_eq!(second, Commit::Applied { ticket: 2, status: Status::Success });
    assert_eq!(store.state().items(), items(&["second"]).as_slice());
}

#[tokio::test(start_paused = true)]
async fn stale_failure_does_not_clobber_newer_success() {
    let store = scripted_store(CommitPolicy::LatestIssued);
    let first = store.fetch_with(Scripted::err(200, FetchError::network("late")));
    let second = store.fetch_with(Scripted::ok(50, &["fresh"]));

    let (first, _) = tokio::join!(first, second);

    let state = store.state();
    assert!(!first.is_applied());
    assert_eq!(state.status(), Status::Success);
    assert_eq!(state.error(), None);
}

#[tokio::test(start_paused = true)]
async fn newest_fetch_still_loading_keeps_store_loading() {
    let store = scripted_store(CommitPolicy::LatestIssued);
    let first = tokio::spawn(store.fetch_with(Scripted::ok(50, &["first"])));
    let second = tokio::spawn(store.fetch_with(Scripted::ok(200, &["second"])));

    assert!(!first.await.unwrap().is_applied());
    assert_eq!(store.state().status(), Status::Loading);

    assert!(second.await.unwrap().is_applied());
    assert_eq!(store.state().items(), items(&["second"]).as_slice());
}

#[tokio::test(start_paused = true)]
async fn subscribers_observe_loading_then_result() {
    let store = scripted_store(CommitPolicy::default());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);
    let subscription = store.subscribe(move |state| {
        seen_clone.lock().unwrap().push(state.status());
    });

    store.fetch_with(Scripted::ok(10, &["a"])).await;
    store
        .fetch_with(Scripted::err(10, FetchError::unknown("nope")))
        .await;
    drop(subscription);
    store.fetch_with(Scripted::ok(10, &["b"])).await;

    assert_eq!(
        *seen.lock().unwrap(),
        [Status::Loading, Status::Success, Status::Loading, Status::Error]
    );
}

#[tokio::test(start_paused = true)]
async fn discarded_commits_do_not_notify() {
    let store = scripted_store(CommitPolicy::LatestIssued);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);
    let _subscription = store.subscribe(move |state| {
        seen_clone.lock().unwrap().push(state.status());
    });

    let first = store.fetch_with(Scripted::ok(200, &["first"]));
    let second = store.fetch_with(Scripted::ok(50, &["second"]));
    tokio::join!(first, second);

    assert_eq!(
        *seen.lock().unwrap(),
        [Status::Loading, Status::Loading, Status::Success]
    );
}

#[tokio::test(start_paused = true)]
async fn fixture_scenario_with_simulated_delay() {
    init_tracing();
    let source = FixtureSource::new(items(&["a", "b"])).with_latency(Duration::from_millis(250));
    let store = ResourceStore::new(source);

    store.fetch().await;

    let state = store.state();
    assert_eq!(state.status(), Status::Success);
    assert_eq!(state.items(), [Item { id: "a" }, Item { id: "b" }].as_slice());
    assert_eq!(state.find(&"b"), Some(&Item { id: "b" }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_fetches_settle_on_latest_ticket() {
    let store = ResourceStore::new(FixtureSource::new(items(&["a"])));
    let handles: Vec<_> = (0..32).map(|_| tokio::spawn(store.fetch())).collect();

    let mut applied = 0;
    for handle in handles {
        if handle.await.unwrap().is_applied() {
            applied += 1;
        }
    }

    assert!(applied >= 1);
    assert_eq!(store.last_ticket(), 32);
    assert_eq!(store.state().status(), Status::Success);
}

#[test]
fn racing_fetch_starts_never_strand_the_store_in_loading() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .build()
        .unwrap();
    let store = ResourceStore::new(FixtureSource::new(items(&["a"])));

    for round in 1..=500_u64 {
        let barrier = Barrier::new(2);
        std::thread::scope(|scope| {
            for _ in 0..2 {
                scope.spawn(|| {
                    barrier.wait();
                    runtime.block_on(store.fetch())
                });
            }
        });

        assert_eq!(store.last_ticket(), round * 2);
        assert_eq!(store.state().status(), Status::Success, "round {round}");
    }
}
