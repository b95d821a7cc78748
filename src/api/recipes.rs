//! Recipe query endpoints

use crate::api::{default_limit, request_deadline, viewer_from_headers};
use crate::db::recipes::{self, Recipe};
use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct FilterParams {
    pub tag: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct ByIngredientsParams {
    /// Comma-separated ingredient list ("rum,lime")
    pub list: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub first: Uuid,
    pub second: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ComparePair {
    pub first: Recipe,
    pub second: Recipe,
}

/// GET /api/recipes/random
pub async fn random(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Recipe>> {
    let viewer = viewer_from_headers(&headers)?;
    let cancel = request_deadline(state.request_timeout);

    state
        .catalog
        .random(viewer, &cancel)
        .await
        .map_err(ApiError::from)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("no recipe available".to_string()))
}

/// GET /api/recipes/search?query=mojito&limit=10
pub async fn search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<Recipe>>> {
    let viewer = viewer_from_headers(&headers)?;
    let cancel = request_deadline(state.request_timeout);

    let found = state
        .catalog
        .search(&params.query, params.limit, viewer, &cancel)
        .await?;

    Ok(Json(found))
}

/// GET /api/recipes/filter?tag=Vodka&limit=10
pub async fn filter_by_tag(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> ApiResult<Json<Vec<Recipe>>> {
    let cancel = request_deadline(state.request_timeout);

    let found = state
        .catalog
        .filter_by_tag(&params.tag, params.limit, &cancel)
        .await?;

    Ok(Json(found))
}

/// GET /api/recipes/by-ingredients?list=rum,lime&limit=10
pub async fn by_ingredients(
    State(state): State<AppState>,
    Query(params): Query<ByIngredientsParams>,
) -> ApiResult<Json<Vec<Recipe>>> {
    let cancel = request_deadline(state.request_timeout);
    let ingredients: Vec<String> = params.list.split(',').map(|i| i.to_string()).collect();

    let found = state
        .catalog
        .by_ingredients(&ingredients, params.limit, &cancel)
        .await?;

    Ok(Json(found))
}

/// GET /api/recipes/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Recipe>> {
    recipes::find_by_guid(&state.db, id)
        .await
        .map_err(ApiError::from)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("recipe {id}")))
}

/// POST /api/recipes/compare
pub async fn compare(
    State(state): State<AppState>,
    Json(request): Json<CompareRequest>,
) -> ApiResult<Json<ComparePair>> {
    let first = recipes::find_by_guid(&state.db, request.first).await.map_err(ApiError::from)?;
    let second = recipes::find_by_guid(&state.db, request.second).await.map_err(ApiError::from)?;

    match (first, second) {
        (Some(first), Some(second)) => Ok(Json(ComparePair { first, second })),
        _ => Err(ApiError::NotFound(
            "one or both recipes not found".to_string(),
        )),
    }
}
