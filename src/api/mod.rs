//! HTTP API surface
//!
//! Thin axum handlers over the catalog and activity services. No transport
//! type crosses into the services: handlers unpack scalars, call the
//! service, and serialize plain recipe values back out.

pub mod activity;
pub mod health;
pub mod recipes;

use crate::error::ApiError;
use axum::http::HeaderMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub use health::health;

/// Header carrying the acting viewer's identity
pub const VIEWER_HEADER: &str = "x-viewer-id";

/// Default number of results for list endpoints
pub fn default_limit() -> usize {
    10
}

/// Cancellation token that fires after the configured outward-request
/// budget, bounding every provider/enrichment call made for one request
pub fn request_deadline(timeout: Duration) -> CancellationToken {
    let token = CancellationToken::new();
    let deadline = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        deadline.cancel();
    });
    token
}

/// Optional viewer identity from the request headers
pub fn viewer_from_headers(headers: &HeaderMap) -> Result<Option<i64>, ApiError> {
    let Some(value) = headers.get(VIEWER_HEADER) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<i64>().ok())
        .map(Some)
        .ok_or_else(|| ApiError::BadRequest(format!("{VIEWER_HEADER} must be an integer")))
}
