//! Time-bounded memoization of an asynchronous fetch
//!
//! `MemoizedFetcher` wraps an async operation with a single in-memory cache
//! slot. Fresh entries are returned without touching the operation; a miss
//! invokes it once and stores the result with a new expiry. Concurrent misses
//! join the same in-flight operation instead of each starting their own.

use chrono::{DateTime, Duration, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};

/// Data returned by the fetcher, stamped with when it was produced
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult<T> {
    /// The fetched data
    pub items: T,
    /// When the underlying operation completed
    pub fetched_at: DateTime<Utc>,
}

/// The single value held by a cache slot
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: FetchResult<T>,
    expires_at: DateTime<Utc>,
}

/// The underlying operation, boxed so the fetcher's type only names `T` and `E`
type Operation<T, E> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, E>> + Send + Sync>;

/// An in-flight fetch that every caller on a miss awaits
type PendingFetch<T, E> = Shared<BoxFuture<'static, Result<FetchResult<T>, Arc<E>>>>;

struct Slot<T, E> {
    entry: Option<CacheEntry<T>>,
    pending: Option<PendingFetch<T, E>>,
}

struct Inner<T, E> {
    slot: Mutex<Slot<T, E>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    operation: Operation<T, E>,
}

/// Memoizes an async operation for a fixed time-to-live
///
/// Cloning is cheap and clones share the same cache slot.
pub struct MemoizedFetcher<T, E> {
    inner: Arc<Inner<T, E>>,
}

impl<T, E> Clone for MemoizedFetcher<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, E> fmt::Debug for MemoizedFetcher<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.inner.lock_slot();
        f.debug_struct("MemoizedFetcher")
            .field("ttl", &self.inner.ttl)
            .field("expires_at", &slot.entry.as_ref().map(|e| e.expires_at))
            .field("in_flight", &slot.pending.is_some())
            .finish()
    }
}

impl<T, E> MemoizedFetcher<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    /// Creates a fetcher for `operation` whose results stay fresh for `ttl`
    ///
    /// # Arguments
    /// * `ttl` - How long a successful result is served from the cache
    /// * `clock` - Time source used for `fetched_at` and expiry checks
    /// * `operation` - Produces the data; called once per cache miss
    ///
    /// The operation is invoked the first time its in-flight fetch is polled,
    /// never while the slot lock is held, so it may query the fetcher it
    /// belongs to.
    pub fn new<F, Fut>(ttl: Duration, clock: Arc<dyn Clock>, operation: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let operation: Operation<T, E> = Arc::new(move || operation().boxed());
        Self {
            inner: Arc::new(Inner {
                slot: Mutex::new(Slot {
                    entry: None,
                    pending: None,
                }),
                ttl,
                clock,
                operation,
            }),
        }
    }

    /// Creates a fetcher that reads the wall clock
    pub fn with_system_clock<F, Fut>(ttl: Duration, operation: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self::new(ttl, Arc::new(SystemClock), operation)
    }

    /// Returns the cached data if fresh, otherwise fetches and caches it
    ///
    /// # Behavior
    /// - Fresh entry: returned as-is, the operation is not invoked
    /// - Miss or expired entry: the operation runs once, its result is stored
    ///   with `expires_at = now + ttl` and returned
    /// - A miss while another fetch is in flight awaits that fetch
    /// - On failure the error reaches every waiting caller and the existing
    ///   entry (stale or not) stays in place
    pub async fn get_data(&self) -> Result<FetchResult<T>, Arc<E>> {
        let pending = {
            let mut slot = self.inner.lock_slot();
            let now = self.inner.clock.now();

            if let Some(entry) = slot.entry.as_ref().filter(|e| now < e.expires_at) {
                debug!(expires_at = %entry.expires_at, "cache hit");
                return Ok(entry.data.clone());
            }

            match slot.pending.clone() {
                Some(pending) => {
                    debug!("cache miss, joining in-flight fetch");
                    pending.clone()
                }
                None => {
                    info!(stale = slot.entry.is_some(), "cache miss, fetching");
                    let pending = Inner::start_fetch(&self.inner);
                    slot.pending = Some(pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    /// Returns the cached data only if it is still fresh
    pub fn peek(&self) -> Option<FetchResult<T>> {
        let slot = self.inner.lock_slot();
        let now = self.inner.clock.now();
        slot.entry
            .as_ref()
            .filter(|e| now < e.expires_at)
            .map(|e| e.data.clone())
    }

    /// Whether a call to `get_data` right now would be a cache hit
    pub fn is_fresh(&self) -> bool {
        let slot = self.inner.lock_slot();
        let now = self.inner.clock.now();
        slot.entry.as_ref().is_some_and(|e| now < e.expires_at)
    }

    /// Expiry of the stored entry, fresh or stale
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.inner.lock_slot().entry.as_ref().map(|e| e.expires_at)
    }

    /// Drops the stored entry so the next call misses
    ///
    /// An in-flight fetch is not cancelled and will still store its result.
    pub fn invalidate(&self) {
        let mut slot = self.inner.lock_slot();
        if slot.entry.take().is_some() {
            debug!("cache entry invalidated");
        }
    }

    /// The configured time-to-live
    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }
}

impl<T, E> Inner<T, E> {
    fn lock_slot(&self) -> MutexGuard<'_, Slot<T, E>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T, E> Inner<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    /// Wraps the operation in a shareable future that stores its own result,
    /// so the slot is updated exactly once per miss no matter which caller
    /// ends up driving it.
    fn start_fetch(this: &Arc<Self>) -> PendingFetch<T, E> {
        // Weak so an abandoned in-flight fetch does not keep the slot alive.
        let weak: Weak<Self> = Arc::downgrade(this);
        let clock = Arc::clone(&this.clock);
        let operation = Arc::clone(&this.operation);

        async move {
            let caught = AssertUnwindSafe(async move { (*operation)().await })
                .catch_unwind()
                .await;
            let outcome = match caught {
                Ok(outcome) => outcome,
                Err(payload) => {
                    if let Some(inner) = weak.upgrade() {
                        inner.abandon();
                    }
                    panic::resume_unwind(payload);
                }
            };
            let now = clock.now();
            match weak.upgrade() {
                Some(inner) => inner.complete(outcome, now),
                None => outcome
                    .map(|items| FetchResult {
                        items,
                        fetched_at: now,
                    })
                    .map_err(Arc::new),
            }
        }
        .boxed()
        .shared()
    }

    /// Clears the in-flight marker after the operation panicked
    fn abandon(&self) {
        self.lock_slot().pending = None;
        warn!("fetch panicked, next call starts a new one");
    }

    fn complete(
        &self,
        outcome: Result<T, E>,
        now: DateTime<Utc>,
    ) -> Result<FetchResult<T>, Arc<E>> {
        let mut slot = self.lock_slot();
        slot.pending = None;

        match outcome {
            Ok(items) => {
                let data = FetchResult {
                    items,
                    fetched_at: now,
                };
                let expires_at = now
                    .checked_add_signed(self.ttl)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC);
                info!(%expires_at, "fetch complete, cache entry stored");
                slot.entry = Some(CacheEntry {
                    data: data.clone(),
                    expires_at,
                });
                Ok(data)
            }
            Err(error) => {
                warn!(
                    %error,
                    kept_entry = slot.entry.is_some(),
                    "fetch failed, existing cache entry left untouched"
                );
                Err(Arc::new(error))
            }
        }
    }
}
