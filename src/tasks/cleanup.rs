//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::ApiCache;

/// Spawns a background task that periodically purges expired cache entries.
///
/// Lazy expiry only removes keys that are read again; this task bounds the
/// memory held by keys that are never requested a second time.
///
/// # Arguments
/// * `cache` - Handle to the shared API cache
/// * `interval` - Time between cleanup runs
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache: ApiCache<Value, CacheError> = ApiCache::new(DEFAULT_TTL);
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task<V, E>(cache: ApiCache<V, E>, interval: Duration) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + std::fmt::Display + 'static,
{
    tokio::spawn(async move {
        info!(?interval, "Starting TTL cleanup task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.cleanup().await;

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestCache = ApiCache<String, String>;

    async fn prime(cache: &TestCache, key: &str, ttl: Duration) {
        cache
            .get(key, || async { Ok::<_, String>("value".to_string()) }, Some(ttl))
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_task_removes_expired_entries() {
        let cache = TestCache::new(Duration::from_secs(300));
        prime(&cache, "expire_soon", Duration::from_secs(1)).await;

        let handle = spawn_cleanup_task(cache.clone(), Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(2500)).await;

        // Removed without ever being read again
        let stats = cache.stats().await;
        assert_eq!(stats.cache.size, 0);
        assert_eq!(stats.cache.expirations, 1);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_task_preserves_valid_entries() {
        let cache = TestCache::new(Duration::from_secs(300));
        prime(&cache, "long_lived", Duration::from_secs(3600)).await;

        let handle = spawn_cleanup_task(cache.clone(), Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(cache.stats().await.cache.keys, vec!["long_lived".to_string()]);

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let cache = TestCache::new(Duration::from_secs(300));

        let handle = spawn_cleanup_task(cache, Duration::from_secs(1));

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
