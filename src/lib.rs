//! API Cache - an in-memory API response cache
//!
//! A TTL cache with in-flight request deduplication, and a small HTTP
//! gateway that serves upstream REST resources through it.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;
pub mod upstream;

pub use api::AppState;
pub use cache::{ApiCache, CacheKey, Resource, TtlCache};
pub use config::Config;
pub use error::{CacheError, FetchError};
pub use tasks::spawn_cleanup_task;
