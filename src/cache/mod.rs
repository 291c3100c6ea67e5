//! In-memory cache for fetched data
//!
//! This module provides a memoizing fetcher that keeps the result of an async
//! operation for a fixed TTL. Expiry is decided by an injected `Clock`, and
//! concurrent cache misses share a single in-flight operation. Failed fetches
//! never evict what is already cached.

mod clock;
mod memo;

pub use clock::{Clock, ManualClock, SystemClock};
pub use memo::{FetchResult, MemoizedFetcher};
