//! Shared test fixtures: temp database, stub provider, stub summaries

#![allow(dead_code)]

use async_trait::async_trait;
use barkeep::db::init_database;
use barkeep::services::{
    ActivityLog, ExternalRecord, RecipeCache, RecipeCatalog, RecipeProvider, SummarySource,
};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

pub const STUB_PROVIDER: &str = "stub";

/// Create temporary test database with the schema applied
///
/// Returns (TempDir, SqlitePool) - TempDir must be kept alive for the
/// duration of the test
pub async fn create_test_db() -> (TempDir, SqlitePool) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test_barkeep.db");
    let pool = init_database(&db_path).await.unwrap();
    (temp_dir, pool)
}

/// External record with predictable fields
pub fn sample_record(external_id: &str, title: &str) -> ExternalRecord {
    ExternalRecord {
        provider: STUB_PROVIDER,
        external_id: external_id.to_string(),
        title: title.to_string(),
        image_url: format!("https://img.example/{external_id}.jpg"),
        instructions: "Shake with ice, strain.".to_string(),
        ingredients: vec!["2 oz Rum".to_string(), "Lime".to_string()],
    }
}

/// Canned-response provider with per-method call counters
#[derive(Default)]
pub struct StubProvider {
    pub random_result: Option<ExternalRecord>,
    pub search_results: Vec<ExternalRecord>,
    pub tag_results: Vec<ExternalRecord>,
    pub ingredient_results: Vec<ExternalRecord>,
    pub random_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
    pub tag_calls: AtomicUsize,
    pub ingredient_calls: AtomicUsize,
}

#[async_trait]
impl RecipeProvider for StubProvider {
    fn provider_id(&self) -> &'static str {
        STUB_PROVIDER
    }

    async fn random_one(&self, _cancel: &CancellationToken) -> Option<ExternalRecord> {
        self.random_calls.fetch_add(1, Ordering::SeqCst);
        self.random_result.clone()
    }

    async fn search_by_text(
        &self,
        _query: &str,
        limit: usize,
        _cancel: &CancellationToken,
    ) -> Vec<ExternalRecord> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.search_results.iter().take(limit).cloned().collect()
    }

    async fn filter_by_tag(
        &self,
        _tag: &str,
        limit: usize,
        _cancel: &CancellationToken,
    ) -> Vec<ExternalRecord> {
        self.tag_calls.fetch_add(1, Ordering::SeqCst);
        self.tag_results.iter().take(limit).cloned().collect()
    }

    async fn filter_by_ingredients(
        &self,
        _ingredients: &[String],
        limit: usize,
        _cancel: &CancellationToken,
    ) -> Vec<ExternalRecord> {
        self.ingredient_calls.fetch_add(1, Ordering::SeqCst);
        self.ingredient_results.iter().take(limit).cloned().collect()
    }
}

/// Title → summary map with a record of every lookup made
#[derive(Default)]
pub struct StubSummaries {
    pub by_title: HashMap<String, String>,
    pub lookups: Mutex<Vec<String>>,
}

impl StubSummaries {
    pub fn with(title: &str, summary: &str) -> Self {
        let mut by_title = HashMap::new();
        by_title.insert(title.to_string(), summary.to_string());
        Self {
            by_title,
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.lock().unwrap().len()
    }
}

#[async_trait]
impl SummarySource for StubSummaries {
    async fn summary(&self, title: &str, _cancel: &CancellationToken) -> Option<String> {
        self.lookups.lock().unwrap().push(title.to_string());
        self.by_title.get(title).cloned()
    }
}

/// Wire a catalog over stub provider + stub summaries against the pool
pub fn build_catalog(
    pool: &SqlitePool,
    provider: Arc<StubProvider>,
    summaries: Arc<StubSummaries>,
) -> RecipeCatalog {
    let cache = RecipeCache::new(pool.clone(), summaries);
    let activity = ActivityLog::new(pool.clone());
    RecipeCatalog::new(provider, cache, activity)
}
