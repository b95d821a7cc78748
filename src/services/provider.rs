//! Recipe provider seam
//!
//! The cache and catalog are written against this trait so any recipe API
//! can back them; `CocktailDbClient` is the shipped implementation.
//!
//! Failure contract: ordinary provider-side failure (timeout, 4xx/5xx,
//! malformed payload, cancellation) degrades to `None` / empty, never an
//! error. A provider outage turns a query into "no results", nothing more.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// A recipe as returned by the upstream provider, normalized but not yet
/// admitted to the local cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalRecord {
    /// Provider tag, stamped by the client that produced the record
    pub provider: &'static str,
    /// Provider-scoped identifier
    pub external_id: String,
    pub title: String,
    pub image_url: String,
    pub instructions: String,
    /// Display strings, one per ingredient slot, slot order preserved
    pub ingredients: Vec<String>,
}

#[async_trait]
pub trait RecipeProvider: Send + Sync {
    /// Provider tag recorded on every recipe admitted from this source
    fn provider_id(&self) -> &'static str;

    /// One random recipe, or `None` on failure
    async fn random_one(&self, cancel: &CancellationToken) -> Option<ExternalRecord>;

    /// Free-text search, at most `limit` records
    async fn search_by_text(
        &self,
        query: &str,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Vec<ExternalRecord>;

    /// Tag/category filter, at most `limit` records
    async fn filter_by_tag(
        &self,
        tag: &str,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Vec<ExternalRecord>;

    /// Recipes matching every listed ingredient, at most `limit` records
    async fn filter_by_ingredients(
        &self,
        ingredients: &[String],
        limit: usize,
        cancel: &CancellationToken,
    ) -> Vec<ExternalRecord>;
}
