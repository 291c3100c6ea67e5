//! Integration tests for the memoized fetcher
//!
//! Drives expiry with a `ManualClock` and counts how often the underlying
//! operation runs.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use cachegrid::cache::{Clock, ManualClock, MemoizedFetcher};
use cachegrid::data::FetchError;
use chrono::Duration;

/// An operation that counts invocations, returns the call number, and can be
/// switched to fail with a 503.
#[derive(Clone, Default)]
struct Upstream {
    calls: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
    latency: Option<StdDuration>,
}

impl Upstream {
    fn with_latency(latency: StdDuration) -> Self {
        Self {
            latency: Some(latency),
            ..Default::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn fetcher(&self, ttl_secs: i64, clock: &ManualClock) -> MemoizedFetcher<Vec<u64>, FetchError> {
        let upstream = self.clone();
        MemoizedFetcher::new(Duration::seconds(ttl_secs), Arc::new(clock.clone()), move || {
            let upstream = upstream.clone();
            async move {
                let n = upstream.calls.fetch_add(1, Ordering::SeqCst) as u64 + 1;
                if let Some(latency) = upstream.latency {
                    tokio::time::sleep(latency).await;
                }
                if upstream.failing.load(Ordering::SeqCst) {
                    return Err(FetchError::Status(503));
                }
                Ok(vec![n; n as usize])
            }
        })
    }
}

#[tokio::test]
async fn test_calls_within_ttl_are_cache_hits() {
    let clock = ManualClock::default();
    let upstream = Upstream::default();
    let fetcher = upstream.fetcher(10, &clock);

    let first = fetcher.get_data().await.unwrap();
    for _ in 0..9 {
        clock.advance(Duration::seconds(1));
        let again = fetcher.get_data().await.unwrap();
        assert_eq!(again, first);
    }

    assert_eq!(upstream.calls(), 1);
}

#[tokio::test]
async fn test_two_hits_in_a_row_are_identical() {
    let clock = ManualClock::default();
    let upstream = Upstream::default();
    let fetcher = upstream.fetcher(10, &clock);
    fetcher.get_data().await.unwrap();

    let a = fetcher.get_data().await.unwrap();
    let b = fetcher.get_data().await.unwrap();

    assert_eq!(a, b);
}

#[tokio::test]
async fn test_ttl_scenario_zero_five_eleven() {
    let clock = ManualClock::default();
    let upstream = Upstream::default();
    let fetcher = upstream.fetcher(10, &clock);
    let t0 = clock.now();

    // t=0: fetch
    let at_zero = fetcher.get_data().await.unwrap();
    assert_eq!(at_zero.items, vec![1]);
    assert_eq!(at_zero.fetched_at, t0);

    // t=5: same items, no fetch
    clock.advance(Duration::seconds(5));
    let at_five = fetcher.get_data().await.unwrap();
    assert_eq!(at_five, at_zero);
    assert_eq!(upstream.calls(), 1);

    // t=11: new fetch, timestamp advances
    clock.advance(Duration::seconds(6));
    let at_eleven = fetcher.get_data().await.unwrap();
    assert_eq!(at_eleven.items, vec![2, 2]);
    assert_eq!(at_eleven.fetched_at, t0 + Duration::seconds(11));
    assert_eq!(upstream.calls(), 2);
}

#[tokio::test]
async fn test_expiry_strictly_increases_across_misses() {
    let clock = ManualClock::default();
    let upstream = Upstream::default();
    let fetcher = upstream.fetcher(10, &clock);

    let mut previous = None;
    for _ in 0..5 {
        fetcher.get_data().await.unwrap();
        let expires_at = fetcher.expires_at().unwrap();
        if let Some(previous) = previous {
            assert!(expires_at > previous);
        }
        previous = Some(expires_at);
        clock.advance(Duration::seconds(10));
    }

    assert_eq!(upstream.calls(), 5);
}

#[tokio::test]
async fn test_failure_does_not_matter_while_entry_is_fresh() {
    let clock = ManualClock::default();
    let upstream = Upstream::default();
    let fetcher = upstream.fetcher(10, &clock);
    let cached = fetcher.get_data().await.unwrap();

    upstream.set_failing(true);
    clock.advance(Duration::seconds(9));

    assert_eq!(fetcher.get_data().await.unwrap(), cached);
    assert_eq!(upstream.calls(), 1);
}

#[tokio::test]
async fn test_failure_after_expiry_propagates_and_keeps_stale_entry() {
    let clock = ManualClock::default();
    let upstream = Upstream::default();
    let fetcher = upstream.fetcher(10, &clock);
    fetcher.get_data().await.unwrap();
    let stale_expiry = fetcher.expires_at();

    upstream.set_failing(true);
    clock.advance(Duration::seconds(12));

    let err = fetcher.get_data().await.unwrap_err();
    assert!(matches!(*err, FetchError::Status(503)));
    assert_eq!(fetcher.expires_at(), stale_expiry, "stale entry left untouched");

    // Next call retries rather than caching the failure
    upstream.set_failing(false);
    let recovered = fetcher.get_data().await.unwrap();
    assert_eq!(recovered.items, vec![3, 3, 3]);
    assert_eq!(upstream.calls(), 3);
}

#[tokio::test]
async fn test_first_call_failure_then_retry() {
    let clock = ManualClock::default();
    let upstream = Upstream::default();
    upstream.set_failing(true);
    let fetcher = upstream.fetcher(10, &clock);

    assert!(fetcher.get_data().await.is_err());
    assert!(fetcher.expires_at().is_none());

    upstream.set_failing(false);
    assert_eq!(fetcher.get_data().await.unwrap().items, vec![2, 2]);
}

#[tokio::test]
async fn test_concurrent_misses_share_one_operation() {
    let clock = ManualClock::default();
    let upstream = Upstream::with_latency(StdDuration::from_millis(50));
    let fetcher = upstream.fetcher(10, &clock);

    let calls = (0..8).map(|_| fetcher.get_data());
    let results = futures::future::join_all(calls).await;

    assert_eq!(upstream.calls(), 1);
    let first = results[0].as_ref().unwrap();
    for result in &results {
        assert_eq!(result.as_ref().unwrap(), first);
    }
}

#[tokio::test]
async fn test_concurrent_misses_across_tasks_share_one_operation() {
    let clock = ManualClock::default();
    let upstream = Upstream::with_latency(StdDuration::from_millis(100));
    let fetcher = upstream.fetcher(10, &clock);

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let fetcher = fetcher.clone();
            tokio::spawn(async move { fetcher.get_data().await })
        })
        .collect();

    for task in futures::future::join_all(tasks).await {
        assert_eq!(task.unwrap().unwrap().items, vec![1]);
    }
    assert_eq!(upstream.calls(), 1);
}

#[tokio::test]
async fn test_concurrent_callers_all_see_the_failure() {
    let clock = ManualClock::default();
    let upstream = Upstream::with_latency(StdDuration::from_millis(50));
    upstream.set_failing(true);
    let fetcher = upstream.fetcher(10, &clock);

    let results = futures::future::join_all((0..3).map(|_| fetcher.get_data())).await;

    assert!(results.iter().all(|r| r.is_err()));
    assert_eq!(upstream.calls(), 1);
}

#[tokio::test]
async fn test_abandoned_fetch_is_resumed_not_restarted() {
    let clock = ManualClock::default();
    let upstream = Upstream::with_latency(StdDuration::from_millis(100));
    let fetcher = upstream.fetcher(10, &clock);

    // Caller gives up before the operation finishes
    let abandoned = tokio::time::timeout(StdDuration::from_millis(10), fetcher.get_data()).await;
    assert!(abandoned.is_err());

    let result = fetcher.get_data().await.unwrap();

    assert_eq!(result.items, vec![1]);
    assert_eq!(upstream.calls(), 1);
}

#[tokio::test]
async fn test_panicking_operation_is_retried_on_next_call() {
    let clock = ManualClock::default();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let fetcher: MemoizedFetcher<Vec<u64>, FetchError> =
        MemoizedFetcher::new(Duration::seconds(10), Arc::new(clock), move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) as u64 + 1;
            async move {
                if n == 1 {
                    panic!("upstream client bug");
                }
                Ok(vec![n])
            }
        });

    let first = tokio::spawn({
        let fetcher = fetcher.clone();
        async move { fetcher.get_data().await }
    })
    .await;
    assert!(first.unwrap_err().is_panic());
    assert!(fetcher.expires_at().is_none());

    let second = fetcher.get_data().await.unwrap();

    assert_eq!(second.items, vec![2]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_invalidate_then_get_refetches() {
    let clock = ManualClock::default();
    let upstream = Upstream::default();
    let fetcher = upstream.fetcher(10, &clock);
    fetcher.get_data().await.unwrap();

    fetcher.invalidate();

    assert!(!fetcher.is_fresh());
    assert_eq!(fetcher.get_data().await.unwrap().items, vec![2, 2]);
}
