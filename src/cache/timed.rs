//! Time-keyed memoizing cache with in-flight request sharing
//!
//! `TimedCache` stores the successful result of a fetch under a string key for
//! a fixed validity window. While a fetch for a key is pending, further callers
//! for that key await the same future instead of starting a new one.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Default validity window for cached entries (one hour)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// A stored fetch result
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    /// The cached value
    value: V,
    /// When the value was stored
    stored_at: Instant,
}

type PendingFetch<V, E> = Shared<BoxFuture<'static, Result<V, E>>>;

struct CacheState<V, E> {
    entries: HashMap<String, CacheEntry<V>>,
    in_flight: HashMap<String, PendingFetch<V, E>>,
}

/// Outcome of looking a key up under the lock
enum Lookup<V, E> {
    Hit(V),
    Pending(PendingFetch<V, E>),
}

/// In-memory cache that memoizes asynchronous fetches for a fixed duration
///
/// An entry is valid while `now - stored_at < ttl`. Expired entries are left
/// in place and overwritten by the next successful fetch; there is no other
/// eviction. Errors are shared with every caller waiting on the failed fetch
/// but are never stored, so the next call retries.
pub struct TimedCache<V, E> {
    ttl: Duration,
    state: Mutex<CacheState<V, E>>,
}

impl<V, E> TimedCache<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Creates an empty cache whose entries stay fresh for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                in_flight: HashMap::new(),
            }),
        }
    }

    /// Returns the validity window
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value for `key`, or runs `fetcher` and caches its result
    ///
    /// `fetcher` is only invoked when there is neither a fresh entry nor a
    /// fetch already in flight for `key`. It runs on the first poll of the
    /// shared fetch, after the lock is released, so it may call back into the
    /// cache. The value is written to the cache before it is returned to any
    /// caller.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetcher: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let pending = match self.lookup(key, fetcher) {
            Lookup::Hit(value) => return Ok(value),
            Lookup::Pending(pending) => pending,
        };

        let result = pending.clone().await;
        self.settle(key, &pending, &result);
        result
    }

    /// Whether `key` currently holds a fresh entry
    pub fn is_fresh(&self, key: &str) -> bool {
        let now = Instant::now();
        self.lock()
            .entries
            .get(key)
            .is_some_and(|entry| self.entry_is_fresh(entry, now))
    }

    /// Number of stored entries, fresh or expired
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup<F, Fut>(&self, key: &str, fetcher: F) -> Lookup<V, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let now = Instant::now();
        let mut state = self.lock();

        if let Some(entry) = state.entries.get(key) {
            if self.entry_is_fresh(entry, now) {
                tracing::debug!(key, "cache hit");
                return Lookup::Hit(entry.value.clone());
            }
        }

        if let Some(pending) = state.in_flight.get(key) {
            tracing::debug!(key, "joining in-flight fetch");
            return Lookup::Pending(pending.clone());
        }

        tracing::debug!(key, "cache miss, fetching");
        // Building the future must not call user code while the lock is held
        let pending = async move { fetcher().await }.boxed().shared();
        state.in_flight.insert(key.to_string(), pending.clone());
        Lookup::Pending(pending)
    }

    /// Clears the in-flight registration and stores a successful result
    ///
    /// Only the first waiter to finish does the bookkeeping. Later waiters
    /// find the registration already gone (or replaced by a newer fetch) and
    /// leave the cache alone.
    fn settle(&self, key: &str, pending: &PendingFetch<V, E>, result: &Result<V, E>) {
        let mut state = self.lock();

        let owns_registration = state
            .in_flight
            .get(key)
            .is_some_and(|registered| registered.ptr_eq(pending));
        if !owns_registration {
            return;
        }
        state.in_flight.remove(key);

        match result {
            Ok(value) => {
                state.entries.insert(
                    key.to_string(),
                    CacheEntry {
                        value: value.clone(),
                        stored_at: Instant::now(),
                    },
                );
            }
            Err(_) => {
                tracing::warn!(key, "fetch failed, result not cached");
            }
        }
    }

    fn entry_is_fresh(&self, entry: &CacheEntry<V>, now: Instant) -> bool {
        now.duration_since(entry.stored_at) < self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, CacheState<V, E>> {
        // User code never runs under the lock, so poisoned state is still consistent
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V, E> Default for TimedCache<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl<V, E> fmt::Debug for TimedCache<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("TimedCache")
            .field("ttl", &self.ttl)
            .field("entries", &state.entries.len())
            .field("in_flight", &state.in_flight.len())
            .finish()
    }
}
