//! Integration tests for the HTTP API surface

mod helpers;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use barkeep::{build_router, AppState};
use helpers::{build_catalog, create_test_db, sample_record, StubProvider, StubSummaries};
use serde_json::Value;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt; // for `oneshot` method

/// App wired over stubs, plus the pool for direct assertions
fn setup_app(pool: &SqlitePool, provider: StubProvider) -> axum::Router {
    let provider = Arc::new(provider);
    let catalog = build_catalog(pool, provider, Arc::new(StubSummaries::default()));
    let activity = barkeep::services::ActivityLog::new(pool.clone());
    let state = AppState::new(pool.clone(), catalog, activity, Duration::from_secs(5));
    build_router(state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, viewer: Option<i64>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(viewer) = viewer {
        builder = builder.header("x-viewer-id", viewer.to_string());
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let (_dir, pool) = create_test_db().await;
    let app = setup_app(&pool, StubProvider::default());

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn search_returns_cached_recipes() {
    let (_dir, pool) = create_test_db().await;
    let app = setup_app(
        &pool,
        StubProvider {
            search_results: vec![sample_record("1", "Mojito")],
            ..StubProvider::default()
        },
    );

    let response = app
        .oneshot(get("/api/recipes/search?query=mojito"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body[0]["title"], "Mojito");
    assert!(body[0]["guid"].is_string(), "results carry local identifiers");
}

#[tokio::test]
async fn random_is_not_found_when_provider_is_down() {
    let (_dir, pool) = create_test_db().await;
    let app = setup_app(&pool, StubProvider::default());

    let response = app.oneshot(get("/api/recipes/random")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rating_round_trip_through_the_api() {
    let (_dir, pool) = create_test_db().await;
    let app = setup_app(
        &pool,
        StubProvider {
            search_results: vec![sample_record("1", "Mojito")],
            ..StubProvider::default()
        },
    );

    let response = app
        .clone()
        .oneshot(get("/api/recipes/search?query=mojito"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let guid = body[0]["guid"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/recipes/{guid}/rate"),
            Some(42),
            &serde_json::json!({"score": 4}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(get("/api/recipes/rated/table?viewer=42"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body[0]["title"], "Mojito");
    assert_eq!(body[0]["score"], 4);
}

#[tokio::test]
async fn invalid_score_is_a_bad_request() {
    let (_dir, pool) = create_test_db().await;
    let app = setup_app(
        &pool,
        StubProvider {
            search_results: vec![sample_record("1", "Mojito")],
            ..StubProvider::default()
        },
    );

    let response = app
        .clone()
        .oneshot(get("/api/recipes/search?query=mojito"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let guid = body[0]["guid"].as_str().unwrap().to_string();

    let response = app
        .oneshot(post_json(
            &format!("/api/recipes/{guid}/rate"),
            Some(42),
            &serde_json::json!({"score": 6}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn rating_without_viewer_header_is_rejected() {
    let (_dir, pool) = create_test_db().await;
    let app = setup_app(&pool, StubProvider::default());

    let response = app
        .oneshot(post_json(
            &format!("/api/recipes/{}/rate", uuid::Uuid::new_v4()),
            None,
            &serde_json::json!({"score": 3}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_recipe_id_is_not_found() {
    let (_dir, pool) = create_test_db().await;
    let app = setup_app(&pool, StubProvider::default());

    let response = app
        .oneshot(get(&format!("/api/recipes/{}", uuid::Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn viewer_header_feeds_history() {
    let (_dir, pool) = create_test_db().await;
    let app = setup_app(
        &pool,
        StubProvider {
            search_results: vec![sample_record("1", "Mojito")],
            ..StubProvider::default()
        },
    );

    let request = Request::builder()
        .method("GET")
        .uri("/api/recipes/search?query=mojito")
        .header("x-viewer-id", "42")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get("/api/recipes/history?viewer=42"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body[0]["title"], "Mojito");
}

#[tokio::test]
async fn compare_returns_both_recipes_or_404() {
    let (_dir, pool) = create_test_db().await;
    let app = setup_app(
        &pool,
        StubProvider {
            search_results: vec![sample_record("1", "Mojito"), sample_record("2", "Daiquiri")],
            ..StubProvider::default()
        },
    );

    let response = app
        .clone()
        .oneshot(get("/api/recipes/search?query=a"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let first = body[0]["guid"].as_str().unwrap();
    let second = body[1]["guid"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/recipes/compare",
            None,
            &serde_json::json!({"first": first, "second": second}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["first"]["title"], "Mojito");
    assert_eq!(body["second"]["title"], "Daiquiri");

    let response = app
        .oneshot(post_json(
            "/api/recipes/compare",
            None,
            &serde_json::json!({"first": first, "second": uuid::Uuid::new_v4()}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
