//! View history and rating endpoints

use crate::api::{default_limit, viewer_from_headers};
use crate::db::Recipe;
use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ViewerParams {
    pub viewer: i64,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub viewer: i64,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub score: i64,
}

#[derive(Debug, Serialize)]
pub struct RatedRow {
    pub title: String,
    pub score: i64,
}

/// GET /api/recipes/history?viewer=42&limit=10
pub async fn history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> ApiResult<Json<Vec<Recipe>>> {
    let recent = state
        .activity
        .recent_history(params.viewer, params.limit as i64)
        .await?;

    Ok(Json(recent))
}

/// POST /api/recipes/{id}/rate
pub async fn rate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<RateRequest>,
) -> ApiResult<StatusCode> {
    let viewer = viewer_from_headers(&headers)?
        .ok_or_else(|| ApiError::BadRequest("viewer header required to rate".to_string()))?;

    state.activity.rate(viewer, id, request.score).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/recipes/rated?viewer=42
pub async fn rated(
    State(state): State<AppState>,
    Query(params): Query<ViewerParams>,
) -> ApiResult<Json<Vec<Recipe>>> {
    let recipes = state.activity.rated_recipes(params.viewer).await?;
    Ok(Json(recipes))
}

/// GET /api/recipes/rated/table?viewer=42
pub async fn rated_table(
    State(state): State<AppState>,
    Query(params): Query<ViewerParams>,
) -> ApiResult<Json<Vec<RatedRow>>> {
    let rows = state
        .activity
        .rating_table(params.viewer)
        .await?
        .into_iter()
        .map(|(title, score)| RatedRow { title, score })
        .collect();

    Ok(Json(rows))
}
