//! Cache Statistics Module
//!
//! Diagnostic snapshots for the TTL cache and the deduplicating layer above it.

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time view of a TTL cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of physically stored entries (may include expired, not yet purged ones)
    pub size: usize,
    /// Stored keys, sorted
    pub keys: Vec<String>,
    /// Number of lookups that returned a value
    pub hits: u64,
    /// Number of lookups that returned nothing (missing or expired)
    pub misses: u64,
    /// Number of entries purged because their TTL elapsed
    pub expirations: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Records `count` entries purged for having expired.
    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }
}

// == Fetch Stats ==
/// Snapshot of the deduplicating API cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApiCacheStats {
    /// Underlying TTL cache
    pub cache: CacheStats,
    /// Fetches currently in flight
    pub pending: usize,
    /// Fetches started
    pub fetches: u64,
    /// Calls that attached to an already running fetch
    pub deduplicated: u64,
    /// Fetches that settled with an error
    pub failures: u64,
    /// Successful fetches not stored because the cache was cleared meanwhile
    pub discarded: u64,
}
