//! Request cache with in-flight deduplication.
//!
//! [`RequestCache::get_or_fetch`] serves a fresh entry without calling the
//! fetcher, joins a fetch that is already running for the same key, or
//! starts a new one. Every caller of one fetch observes the same value or
//! the same error. Failures are never cached: the entry is dropped and the
//! next caller starts over.
//!
//! A fetch may be started on behalf of an owner (the credential it runs
//! with). [`RequestCache::get_or_fetch_as`] tells each caller whether the
//! fetch it waited on ran under its own owner, so an error that belongs to
//! one credential is not blamed on another.
//!
//! Entries are only evicted by being stale on read; there is no background
//! sweep and no bound on the number of keys. Callers must keep the key space
//! small and fixed.

use crate::errors::HrmError;
use crate::observability::metrics::record_cache_lookup;
use common::secret::{ExposeSecret, SecretString};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Default freshness window (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

type SharedFetch<T> = Shared<BoxFuture<'static, Result<Arc<T>, HrmError>>>;

struct CacheEntry<T> {
    data: Option<Arc<T>>,
    fetched_at: Instant,
    in_flight: Option<SharedFetch<T>>,
    /// Owner of the fetch in `in_flight`.
    owner: Option<SecretString>,
    /// Identifies the fetch that owns `in_flight`, so a late finisher cannot
    /// overwrite an entry that was invalidated and refetched meanwhile.
    generation: u64,
}

struct CacheState<T> {
    entries: HashMap<String, CacheEntry<T>>,
    next_generation: u64,
}

enum Lookup<T> {
    Fresh(Arc<T>),
    Wait {
        fetch: SharedFetch<T>,
        generation: u64,
        same_owner: bool,
    },
}

/// A failed fetch as seen by one caller of [`RequestCache::get_or_fetch_as`].
#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    pub error: HrmError,
    /// The failed fetch ran under the caller's own owner.
    pub same_owner: bool,
}

pub struct RequestCache<T> {
    name: &'static str,
    ttl: Duration,
    fetch_timeout: Option<Duration>,
    state: Arc<Mutex<CacheState<T>>>,
}

impl<T> Clone for RequestCache<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            ttl: self.ttl,
            fetch_timeout: self.fetch_timeout,
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> std::fmt::Debug for RequestCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestCache")
            .field("name", &self.name)
            .field("ttl", &self.ttl)
            .field("fetch_timeout", &self.fetch_timeout)
            .finish_non_exhaustive()
    }
}

impl<T> RequestCache<T>
where
    T: Send + Sync + 'static,
{
    /// `name` labels metrics and logs.
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            ttl,
            fetch_timeout: None,
            state: Arc::new(Mutex::new(CacheState {
                entries: HashMap::new(),
                next_generation: 0,
            })),
        }
    }

    /// Fail a fetch with [`HrmError::UpstreamTimeout`] once it has run for
    /// `limit`. The in-flight marker is cleared like any other failure.
    pub fn with_fetch_timeout(mut self, limit: Duration) -> Self {
        self.fetch_timeout = Some(limit);
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached value for `key`, or fetch it exactly once for all
    /// concurrent callers.
    ///
    /// # Errors
    ///
    /// Whatever `fetch` fails with, shared by every caller waiting on that
    /// fetch, or `UpstreamTimeout` if the fetch timeout elapses.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> Result<Arc<T>, HrmError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, HrmError>> + Send + 'static,
    {
        self.fetch_for(key, None, fetch).await.map_err(|f| f.error)
    }

    /// [`get_or_fetch`](Self::get_or_fetch) on behalf of `owner`. A fetch
    /// started by this call is recorded as `owner`'s.
    ///
    /// # Errors
    ///
    /// The shared fetch error, with `same_owner` set when the fetch that
    /// failed was started under `owner`.
    pub async fn get_or_fetch_as<F, Fut>(
        &self,
        key: &str,
        owner: &SecretString,
        fetch: F,
    ) -> Result<Arc<T>, FetchFailure>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, HrmError>> + Send + 'static,
    {
        self.fetch_for(key, Some(owner), fetch).await
    }

    async fn fetch_for<F, Fut>(
        &self,
        key: &str,
        owner: Option<&SecretString>,
        fetch: F,
    ) -> Result<Arc<T>, FetchFailure>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, HrmError>> + Send + 'static,
    {
        let (shared, generation, same_owner) = match self.lookup_or_start(key, owner, fetch).await {
            Lookup::Fresh(data) => return Ok(data),
            Lookup::Wait {
                fetch,
                generation,
                same_owner,
            } => (fetch, generation, same_owner),
        };

        let result = shared.await;
        self.settle(key, generation, &result).await;
        result.map_err(|error| FetchFailure { error, same_owner })
    }

    async fn lookup_or_start<F, Fut>(
        &self,
        key: &str,
        owner: Option<&SecretString>,
        fetch: F,
    ) -> Lookup<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, HrmError>> + Send + 'static,
    {
        let mut state = self.state.lock().await;

        if let Some(entry) = state.entries.get(key) {
            if let Some(data) = &entry.data {
                if entry.fetched_at.elapsed() < self.ttl {
                    record_cache_lookup(self.name, "hit");
                    return Lookup::Fresh(Arc::clone(data));
                }
            }
            if let Some(in_flight) = &entry.in_flight {
                record_cache_lookup(self.name, "joined");
                debug!(target: "hrm.cache", cache = self.name, key = %key, "Joining in-flight fetch");
                let same_owner = match (&entry.owner, owner) {
                    (Some(running), Some(caller)) => {
                        running.expose_secret() == caller.expose_secret()
                    }
                    (None, None) => true,
                    _ => false,
                };
                return Lookup::Wait {
                    fetch: in_flight.clone(),
                    generation: entry.generation,
                    same_owner,
                };
            }
        }

        let generation = state.next_generation;
        state.next_generation = state.next_generation.wrapping_add(1);

        let shared = self.spawn_fetch(fetch);
        record_cache_lookup(self.name, "miss");
        debug!(target: "hrm.cache", cache = self.name, key = %key, "Cache miss, fetching");

        match state.entries.get_mut(key) {
            // Stale entry: keep the old data until the refetch settles.
            Some(entry) => {
                entry.in_flight = Some(shared.clone());
                entry.owner = owner.cloned();
                entry.generation = generation;
            }
            None => {
                state.entries.insert(
                    key.to_string(),
                    CacheEntry {
                        data: None,
                        fetched_at: Instant::now(),
                        in_flight: Some(shared.clone()),
                        owner: owner.cloned(),
                        generation,
                    },
                );
            }
        }

        Lookup::Wait {
            fetch: shared,
            generation,
            same_owner: true,
        }
    }

    fn spawn_fetch<F, Fut>(&self, fetch: F) -> SharedFetch<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, HrmError>> + Send + 'static,
    {
        let fut = fetch();
        let limit = self.fetch_timeout;

        async move {
            let result = match limit {
                Some(limit) => tokio::time::timeout(limit, fut)
                    .await
                    .map_err(|_| HrmError::UpstreamTimeout)?,
                None => fut.await,
            };
            result.map(Arc::new)
        }
        .boxed()
        .shared()
    }

    /// Record the outcome of fetch `generation`. Every waiter calls this;
    /// only the first one for a still-current generation changes anything.
    async fn settle(&self, key: &str, generation: u64, result: &Result<Arc<T>, HrmError>) {
        let mut state = self.state.lock().await;

        let current = state
            .entries
            .get(key)
            .is_some_and(|e| e.generation == generation && e.in_flight.is_some());
        if !current {
            return;
        }

        match result {
            Ok(data) => {
                if let Some(entry) = state.entries.get_mut(key) {
                    entry.data = Some(Arc::clone(data));
                    entry.fetched_at = Instant::now();
                    entry.in_flight = None;
                    entry.owner = None;
                }
            }
            Err(e) => {
                state.entries.remove(key);
                let outcome = if matches!(e, HrmError::UpstreamTimeout) {
                    "timeout"
                } else {
                    "error"
                };
                record_cache_lookup(self.name, outcome);
                warn!(target: "hrm.cache", cache = self.name, key = %key, error = %e, "Fetch failed, entry dropped");
            }
        }
    }

    /// Drop `key`. Callers already waiting on its fetch still get the result,
    /// but it is not stored.
    pub async fn invalidate(&self, key: &str) {
        self.state.lock().await.entries.remove(key);
    }

    /// Number of keys currently held, fresh, stale, or in flight.
    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
