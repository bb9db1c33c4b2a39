//! Deduplicating API Cache
//!
//! Wraps a [`TtlCache`] so that, per key, at most one fetch is in flight at a
//! time. Concurrent callers for the same key attach to the running fetch and
//! observe the same value or the same error.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cache::{ApiCacheStats, Resource, TtlCache};
use crate::error::FetchError;

type SharedFetch<V, E> = Shared<BoxFuture<'static, Result<V, FetchError<E>>>>;

// == Pending Request ==
/// A registered in-flight fetch.
struct PendingRequest<V, E> {
    /// Distinguishes this fetch from a later one for the same key
    id: u64,
    result: SharedFetch<V, E>,
}

#[derive(Debug, Default)]
struct FetchCounters {
    fetches: u64,
    deduplicated: u64,
    failures: u64,
    discarded: u64,
}

struct CacheState<V, E> {
    store: TtlCache<V>,
    pending: HashMap<String, PendingRequest<V, E>>,
    /// Bumped by `clear`; completions from older generations are not stored
    generation: u64,
    next_id: u64,
    counters: FetchCounters,
}

impl<V: Clone, E> CacheState<V, E> {
    /// Records the outcome of fetch `id`. Storing the value and dropping the
    /// pending marker happen under the same lock.
    fn settle(
        &mut self,
        key: &str,
        id: u64,
        generation: u64,
        outcome: &Result<V, FetchError<E>>,
        ttl: Duration,
    ) {
        if self.pending.get(key).is_some_and(|pending| pending.id == id) {
            self.pending.remove(key);
        }

        match outcome {
            Ok(value) if generation == self.generation => {
                self.store.set(key, value.clone(), Some(ttl));
                debug!(key, "fetch stored");
            }
            Ok(_) => {
                self.counters.discarded += 1;
                debug!(key, "discarding fetch started before clear");
            }
            Err(_) => {
                self.counters.failures += 1;
            }
        }
    }
}

// == API Cache ==
/// TTL cache with in-flight request deduplication.
///
/// Cloning yields another handle to the same cache.
pub struct ApiCache<V, E> {
    state: Arc<Mutex<CacheState<V, E>>>,
    default_ttl: Duration,
}

impl<V, E> Clone for ApiCache<V, E> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            default_ttl: self.default_ttl,
        }
    }
}

impl<V, E> ApiCache<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + std::fmt::Display + 'static,
{
    // == Constructor ==
    /// Creates an empty cache with the given default TTL.
    pub fn new(default_ttl: Duration) -> Self {
        Self::with_store(TtlCache::new(default_ttl))
    }

    /// Wraps an existing TTL cache, adopting its default TTL.
    pub fn with_store(store: TtlCache<V>) -> Self {
        let default_ttl = store.default_ttl();
        Self {
            state: Arc::new(Mutex::new(CacheState {
                store,
                pending: HashMap::new(),
                generation: 0,
                next_id: 0,
                counters: FetchCounters::default(),
            })),
            default_ttl,
        }
    }

    // == Get ==
    /// Returns the cached value for `key`, fetching it if needed.
    ///
    /// `fetcher` is only invoked when there is neither a live entry nor a
    /// fetch already in flight for `key`. The fetch runs on its own task and
    /// completes even if every caller stops waiting. Failures are never
    /// cached; the next call after a failure starts a fresh fetch.
    ///
    /// # Arguments
    /// * `key` - Identity of the requested resource and query
    /// * `fetcher` - Produces the future that loads the value
    /// * `ttl` - TTL for the stored value (uses the default TTL if None)
    pub async fn get<F, Fut>(
        &self,
        key: impl Into<String>,
        fetcher: F,
        ttl: Option<Duration>,
    ) -> Result<V, FetchError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let key = key.into();
        let ttl = ttl.unwrap_or(self.default_ttl);

        let pending = {
            let mut state = self.state.lock().await;

            if let Some(value) = state.store.get(&key) {
                debug!(key = %key, "cache hit");
                return Ok(value);
            }

            let attached = state.pending.get(&key).map(|p| p.result.clone());
            match attached {
                Some(result) => {
                    state.counters.deduplicated += 1;
                    debug!(key = %key, "attaching to in-flight fetch");
                    result
                }
                None => {
                    debug!(key = %key, "cache miss, fetching");
                    self.start_fetch(&mut state, key, fetcher(), ttl)
                }
            }
        };

        pending.await
    }

    /// Spawns `fetch` and registers it as pending for `key`.
    ///
    /// Must be called with the state lock held so the settle step cannot run
    /// before registration.
    fn start_fetch<Fut>(
        &self,
        state: &mut CacheState<V, E>,
        key: String,
        fetch: Fut,
        ttl: Duration,
    ) -> SharedFetch<V, E>
    where
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let id = state.next_id;
        state.next_id += 1;
        state.counters.fetches += 1;
        let generation = state.generation;

        let shared_state = Arc::clone(&self.state);
        let task_key = key.clone();

        let task = tokio::spawn(async move {
            let outcome = match tokio::spawn(fetch).await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(err)) => {
                    warn!(key = %task_key, error = %err, "fetch failed");
                    Err(FetchError::Failed(err))
                }
                Err(join_err) => {
                    warn!(key = %task_key, error = %join_err, "fetch task aborted");
                    Err(FetchError::Aborted(join_err.to_string()))
                }
            };

            shared_state
                .lock()
                .await
                .settle(&task_key, id, generation, &outcome, ttl);
            outcome
        });

        let result = async move {
            task.await
                .unwrap_or_else(|join_err| Err(FetchError::Aborted(join_err.to_string())))
        }
        .boxed()
        .shared();

        state.pending.insert(
            key,
            PendingRequest {
                id,
                result: result.clone(),
            },
        );
        result
    }

    // == Invalidate ==
    /// Drops the cached value for `key` so the next `get` refetches.
    ///
    /// An in-flight fetch for `key` is left alone and will still store its
    /// result. Returns whether an entry was removed.
    pub async fn invalidate(&self, key: &str) -> bool {
        let removed = self.state.lock().await.store.delete(key);
        debug!(key, removed, "invalidate");
        removed
    }

    /// Drops every cached value whose key matches `predicate`.
    pub async fn invalidate_where<P>(&self, predicate: P) -> usize
    where
        P: FnMut(&str) -> bool,
    {
        self.state.lock().await.store.delete_where(predicate)
    }

    /// Drops every cached value built for `resource`.
    pub async fn invalidate_resource(&self, resource: Resource) -> usize {
        let removed = self.invalidate_where(|key| resource.owns(key)).await;
        debug!(%resource, removed, "invalidate resource");
        removed
    }

    // == Clear ==
    /// Removes all cached values.
    ///
    /// In-flight fetches stay registered, so callers arriving after the
    /// clear still attach to them instead of starting a second fetch. Their
    /// results are handed to waiters but not stored.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.store.clear();
        state.generation += 1;
    }

    // == Cleanup ==
    /// Purges expired entries. Returns the number removed.
    pub async fn cleanup(&self) -> usize {
        self.state.lock().await.store.cleanup()
    }

    // == Stats ==
    pub async fn stats(&self) -> ApiCacheStats {
        let state = self.state.lock().await;
        ApiCacheStats {
            cache: state.store.stats(),
            pending: state.pending.len(),
            fetches: state.counters.fetches,
            deduplicated: state.counters.deduplicated,
            failures: state.counters.failures,
            discarded: state.counters.discarded,
        }
    }

    /// Returns true if a fetch for `key` is currently registered.
    pub async fn is_pending(&self, key: &str) -> bool {
        self.state.lock().await.pending.contains_key(key)
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}
