//! Cache Module
//!
//! Provides an in-memory TTL cache and a request-deduplicating API cache on
//! top of it, plus deterministic key builders.

mod dedup;
mod entry;
mod key;
mod stats;
mod store;


// Re-export public types
pub use dedup::ApiCache;
pub use entry::CacheEntry;
pub use key::{CacheKey, Resource};
pub use stats::{ApiCacheStats, CacheStats};
pub use store::TtlCache;

// == Public Constants ==
/// Default TTL for cached API responses
pub const DEFAULT_TTL: std::time::Duration = std::time::Duration::from_secs(5 * 60);
