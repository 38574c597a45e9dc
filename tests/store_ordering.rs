mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{ordered_read, store_with_logger, CountingState};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use vector_state::StartMode;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_increments_and_decrements_cancel_out() {
    let (store, _logger) = store_with_logger(StartMode::Eager);

    let up = {
        let store = store.clone();
        tokio::spawn(async move {
            for _ in 0..1000 {
                store.set_state(|s| CountingState { count: s.count + 1 });
            }
        })
    };
    let down = {
        let store = store.clone();
        tokio::spawn(async move {
            for _ in 0..1000 {
                store.set_state(|s| CountingState { count: s.count - 1 });
            }
        })
    };
    up.await.unwrap();
    down.await.unwrap();

    assert_eq!(ordered_read(&store).await.count, 0);
    assert_eq!(store.stats().reducers_applied, 2000);
    store.clear();
}

#[tokio::test]
async fn reducer_queued_after_read_still_runs_first() {
    let (store, _logger) = store_with_logger(StartMode::Lazy);
    let order = Arc::new(Mutex::new(Vec::new()));
    let (tx, rx) = oneshot::channel();

    {
        let order = Arc::clone(&order);
        store.with_state(move |state| async move {
            order.lock().push("read");
            let _ = tx.send(state);
        });
    }
    {
        let order = Arc::clone(&order);
        store.set_state(move |s| {
            order.lock().push("reduce");
            CountingState { count: s.count + 1 }
        });
    }
    store.start();

    let seen = tokio::time::timeout(Duration::from_secs(5), rx)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(seen.count, 1);
    assert_eq!(*order.lock(), vec!["reduce", "read"]);
}

#[tokio::test]
async fn read_action_sees_preceding_reducer() {
    let (store, _logger) = store_with_logger(StartMode::Eager);
    store.set_state(|_| CountingState { count: 42 });

    assert_eq!(ordered_read(&store).await.count, 42);
}

#[tokio::test]
async fn slow_subscriber_sees_conflated_updates() {
    let (store, _logger) = store_with_logger(StartMode::Lazy);
    let mut observer = store.observable_state();
    assert_eq!(observer.next().await, Some(CountingState { count: 0 }));

    for _ in 0..1000 {
        store.set_state(|s| CountingState { count: s.count + 1 });
    }
    store.start();

    let mut seen = 0;
    let mut last = None;
    while let Ok(Some(state)) =
        tokio::time::timeout(Duration::from_secs(5), observer.next()).await
    {
        seen += 1;
        let done = state.count == 1000;
        last = Some(state);
        if done {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    assert!(seen < 1000, "observer saw every intermediate state");
    assert_eq!(last, Some(CountingState { count: 1000 }));
}

#[tokio::test]
async fn drain_runs_nested_jobs_to_completion() {
    let (store, _logger) = store_with_logger(StartMode::Lazy);
    let seen = Arc::new(Mutex::new(Vec::new()));

    {
        let nested = store.clone();
        store.set_state(move |s| {
            nested.set_state(|s| CountingState { count: s.count * 10 });
            CountingState { count: s.count + 1 }
        });
    }
    {
        let nested = store.clone();
        let seen = Arc::clone(&seen);
        store.with_state(move |state| async move {
            seen.lock().push(state.count);
            nested.set_state(|s| CountingState { count: s.count + 5 });
            nested.with_state(move |state| async move {
                seen.lock().push(state.count);
            });
        });
    }

    store.drain().await.unwrap();

    assert_eq!(store.current_state().unwrap().count, 15);
    assert_eq!(*seen.lock(), vec![10, 15]);
    assert!(!store.processor().is_running());
}

#[tokio::test]
async fn drain_is_rejected_once_started() {
    let (store, _logger) = store_with_logger(StartMode::Eager);
    assert_eq!(
        store.drain().await,
        Err(vector_state::StoreError::AlreadyStarted)
    );
}
