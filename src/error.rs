//! Error types for the API cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Fetch Error ==
/// Outcome of a failed deduplicated fetch, shared by every caller that
/// waited on the same invocation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError<E> {
    /// The fetcher itself returned an error
    #[error("{0}")]
    Failed(E),

    /// The fetch task panicked or was torn down with the runtime
    #[error("fetch aborted: {0}")]
    Aborted(String),
}

impl<E> FetchError<E> {
    /// Returns the fetcher's error, if that is what failed.
    pub fn into_inner(self) -> Option<E> {
        match self {
            FetchError::Failed(err) => Some(err),
            FetchError::Aborted(_) => None,
        }
    }
}

// == Cache Error Enum ==
/// Unified error type for the caching gateway.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Upstream answered with a non-success status
    #[error("Upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Upstream could not be reached
    #[error("Upstream unavailable: {0}")]
    Unavailable(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FetchError<CacheError>> for CacheError {
    fn from(err: FetchError<CacheError>) -> Self {
        match err {
            FetchError::Failed(inner) => inner,
            FetchError::Aborted(msg) => CacheError::Internal(msg),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            CacheError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the caching gateway.
pub type Result<T> = std::result::Result<T, CacheError>;
