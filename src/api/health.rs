//! Health check endpoint

use crate::AppState;
use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let uptime_seconds = (Utc::now() - state.startup_time).num_seconds();

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": uptime_seconds,
    }))
}
