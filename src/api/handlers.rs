//! API Handlers
//!
//! HTTP request handlers for each gateway endpoint.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

use crate::cache::{ApiCache, CacheKey, Resource};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    take_ttl, ClearResponse, HealthResponse, InvalidateRequest, InvalidateResponse, StatsResponse,
};
use crate::upstream::{HttpUpstream, Upstream};

/// Cache of upstream JSON responses.
pub type ResponseCache = ApiCache<Value, CacheError>;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Deduplicating response cache
    pub cache: ResponseCache,
    /// Backend the cache fetches from on a miss
    pub upstream: Arc<dyn Upstream>,
}

impl AppState {
    /// Creates a new AppState with the given cache and upstream.
    pub fn new(cache: ResponseCache, upstream: Arc<dyn Upstream>) -> Self {
        Self { cache, upstream }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Builds the HTTP upstream client and an empty cache with the
    /// configured default TTL.
    pub fn from_config(config: &Config) -> Result<Self> {
        let upstream = HttpUpstream::new(config.upstream_url.clone(), config.upstream_timeout())?;
        Ok(Self::new(
            ApiCache::new(config.default_ttl()),
            Arc::new(upstream),
        ))
    }

    /// Serves `key` from the cache, fetching it from the upstream on a miss.
    async fn serve(&self, key: CacheKey, ttl: Option<std::time::Duration>) -> Result<Json<Value>> {
        let upstream = Arc::clone(&self.upstream);
        let path = key.path();
        let query = key.params().clone();

        let value = self
            .cache
            .get(
                key,
                move || async move { upstream.fetch(&path, &query).await },
                ttl,
            )
            .await?;

        Ok(Json(value))
    }
}

/// Handler for GET /api/:resource
///
/// Returns a (possibly cached) collection listing. Query parameters are
/// forwarded upstream and form part of the cache key, except `ttl_ms`.
pub async fn list_handler(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Query(mut params): Query<BTreeMap<String, String>>,
) -> Result<Json<Value>> {
    let resource: Resource = resource.parse()?;
    let ttl = take_ttl(&mut params)?;

    state
        .serve(CacheKey::list(resource).with_params(params), ttl)
        .await
}

/// Handler for GET /api/:resource/:id
///
/// Returns a (possibly cached) single item.
pub async fn item_handler(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    Query(mut params): Query<BTreeMap<String, String>>,
) -> Result<Json<Value>> {
    let resource: Resource = resource.parse()?;
    let ttl = take_ttl(&mut params)?;

    state
        .serve(CacheKey::item(resource, id).with_params(params), ttl)
        .await
}

/// Handler for POST /cache/invalidate
///
/// Drops one key or every key of a resource. In-flight fetches are not affected.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let response = match (req.key, req.resource) {
        (Some(key), _) => {
            let removed = usize::from(state.cache.invalidate(&key).await);
            InvalidateResponse::new(key, removed)
        }
        (None, Some(resource)) => {
            let removed = state.cache.invalidate_resource(resource).await;
            InvalidateResponse::new(resource.as_str(), removed)
        }
        (None, None) => {
            return Err(CacheError::InvalidRequest(
                "Either key or resource is required".to_string(),
            ))
        }
    };

    Ok(Json(response))
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.cache.clear().await;
    Json(ClearResponse::new())
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(state.cache.stats().await))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
