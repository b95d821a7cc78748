//! barkeep — cocktail recipe aggregation and deduplication cache
//!
//! Fans queries out to an external recipe provider, admits every recipe
//! into a local SQLite store exactly once per external identity, enriches
//! new admissions with an optional encyclopedic summary, and tracks
//! per-viewer view history and ratings over the cached recipes.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod services;

pub use crate::config::Config;
pub use crate::error::{ApiError, ApiResult, Error, Result};

use axum::{
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::services::{ActivityLog, RecipeCatalog};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Query fan-out over provider + cache
    pub catalog: RecipeCatalog,
    /// View history and ratings
    pub activity: ActivityLog,
    /// Budget for outward calls made on behalf of one request
    pub request_timeout: Duration,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        catalog: RecipeCatalog,
        activity: ActivityLog,
        request_timeout: Duration,
    ) -> Self {
        Self {
            db,
            catalog,
            activity,
            request_timeout,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/recipes/random", get(api::recipes::random))
        .route("/api/recipes/search", get(api::recipes::search))
        .route("/api/recipes/filter", get(api::recipes::filter_by_tag))
        .route("/api/recipes/by-ingredients", get(api::recipes::by_ingredients))
        .route("/api/recipes/history", get(api::activity::history))
        .route("/api/recipes/rated", get(api::activity::rated))
        .route("/api/recipes/rated/table", get(api::activity::rated_table))
        .route("/api/recipes/compare", post(api::recipes::compare))
        .route("/api/recipes/:id/rate", post(api::activity::rate))
        .route("/api/recipes/:id", get(api::recipes::get_by_id))
        .route("/health", get(api::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
