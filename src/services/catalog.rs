//! Recipe catalog: query fan-out over the provider and the cache
//!
//! Every query path funnels its provider results through the cache, so
//! callers only ever see canonical local recipes. Queries made on behalf of
//! a viewer also leave view events behind, best-effort: failing to write
//! history never fails the query itself.

use crate::db::Recipe;
use crate::services::activity::ActivityLog;
use crate::services::provider::RecipeProvider;
use crate::services::recipe_cache::RecipeCache;
use crate::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Aggregates provider queries into cached local recipes
#[derive(Clone)]
pub struct RecipeCatalog {
    provider: Arc<dyn RecipeProvider>,
    cache: RecipeCache,
    activity: ActivityLog,
}

impl RecipeCatalog {
    pub fn new(provider: Arc<dyn RecipeProvider>, cache: RecipeCache, activity: ActivityLog) -> Self {
        Self {
            provider,
            cache,
            activity,
        }
    }

    /// One random recipe; `None` when the provider has nothing to offer
    pub async fn random(
        &self,
        viewer: Option<i64>,
        cancel: &CancellationToken,
    ) -> Result<Option<Recipe>> {
        let Some(record) = self.provider.random_one(cancel).await else {
            return Ok(None);
        };

        let recipe = self.cache.ensure(&record, cancel).await?;
        self.record_views(viewer, std::slice::from_ref(&recipe)).await;

        Ok(Some(recipe))
    }

    /// Free-text search
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        viewer: Option<i64>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Recipe>> {
        let records = self.provider.search_by_text(query, limit, cancel).await;
        let recipes = self.cache.ensure_many(&records, cancel).await?;
        self.record_views(viewer, &recipes).await;

        Ok(recipes)
    }

    /// Tag/category filter. Tags are often also valid search terms, so an
    /// empty structured filter falls back to free-text search before
    /// reporting nothing found.
    pub async fn filter_by_tag(
        &self,
        tag: &str,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<Recipe>> {
        let mut records = self.provider.filter_by_tag(tag, limit, cancel).await;
        if records.is_empty() {
            debug!(tag = %tag, "tag filter empty, retrying as text search");
            records = self.provider.search_by_text(tag, limit, cancel).await;
        }

        self.cache.ensure_many(&records, cancel).await
    }

    /// Recipes matching every listed ingredient.
    ///
    /// Blank entries are dropped; an effectively empty list returns empty
    /// without touching the provider.
    pub async fn by_ingredients(
        &self,
        ingredients: &[String],
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<Recipe>> {
        let wanted: Vec<String> = ingredients
            .iter()
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .collect();

        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let records = self.provider.filter_by_ingredients(&wanted, limit, cancel).await;
        self.cache.ensure_many(&records, cancel).await
    }

    /// Best-effort view recording; at-least-once when it succeeds, logged
    /// and swallowed when it does not
    async fn record_views(&self, viewer: Option<i64>, recipes: &[Recipe]) {
        let Some(viewer_id) = viewer else {
            return;
        };

        for recipe in recipes {
            if let Err(e) = self.activity.record_view(viewer_id, recipe.guid).await {
                warn!(viewer_id, recipe = %recipe.guid, error = %e, "failed to record view");
            }
        }
    }
}
