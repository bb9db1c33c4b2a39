//! Request DTOs for the gateway API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::cache::Resource;
use crate::error::{CacheError, Result};

/// Query parameter that overrides the TTL of a cached response.
pub const TTL_PARAM: &str = "ttl_ms";

/// Request body for POST /cache/invalidate
///
/// Exactly one of `key` or `resource` must be given.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvalidateRequest {
    /// A single rendered cache key, e.g. `risks?page=2`
    #[serde(default)]
    pub key: Option<String>,
    /// A resource; every key built for it is invalidated
    #[serde(default)]
    pub resource: Option<Resource>,
}

impl InvalidateRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        match (&self.key, &self.resource) {
            (Some(_), Some(_)) => Some("Specify either key or resource, not both".to_string()),
            (None, None) => Some("Either key or resource is required".to_string()),
            (Some(key), None) if key.is_empty() => Some("Key cannot be empty".to_string()),
            _ => None,
        }
    }
}

/// Splits the TTL override out of a resource query.
///
/// The remaining parameters are what identifies the cached response.
pub fn take_ttl(params: &mut BTreeMap<String, String>) -> Result<Option<Duration>> {
    match params.remove(TTL_PARAM) {
        Some(raw) => raw
            .parse::<u64>()
            .map(|ms| Some(Duration::from_millis(ms)))
            .map_err(|_| CacheError::InvalidRequest(format!("Invalid {}: {}", TTL_PARAM, raw))),
        None => Ok(None),
    }
}
