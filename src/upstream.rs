//! Upstream Module
//!
//! The REST backend whose responses are cached. The gateway only ever talks
//! to it through the [`Upstream`] trait so tests can substitute a fake.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::{CacheError, Result};

// == Upstream Trait ==
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Fetches `path` (relative to the API root) with the given query parameters.
    async fn fetch(&self, path: &str, query: &BTreeMap<String, String>) -> Result<Value>;
}

// == HTTP Upstream ==
/// [`Upstream`] backed by a reqwest client.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUpstream {
    /// Creates a client for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CacheError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Full URL for a path relative to the API root.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn fetch(&self, path: &str, query: &BTreeMap<String, String>) -> Result<Value> {
        let url = self.url(path);
        debug!(%url, "upstream request");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CacheError::Upstream {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("Unknown status")
                    .to_string(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| CacheError::Upstream {
                status: status.as_u16(),
                message: format!("Invalid JSON body: {}", e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let upstream = HttpUpstream::new("http://backend:8080/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(upstream.url("risks/4"), "http://backend:8080/api/risks/4");
        assert_eq!(upstream.url("/skills"), "http://backend:8080/api/skills");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_unavailable() {
        // Reserve a free port, then close it so nothing is listening there
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let upstream =
            HttpUpstream::new(format!("http://{}", addr), Duration::from_millis(500)).unwrap();

        let result = upstream.fetch("risks", &BTreeMap::new()).await;
        assert!(matches!(result, Err(CacheError::Unavailable(_))));
    }
}
