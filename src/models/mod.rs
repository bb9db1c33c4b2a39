//! Models Module
//!
//! Request and response DTOs for the gateway HTTP API.

mod requests;
mod responses;

pub use requests::{take_ttl, InvalidateRequest, TTL_PARAM};
pub use responses::{ClearResponse, HealthResponse, InvalidateResponse, StatsResponse};
