//! Per-viewer activity: view history and ratings
//!
//! Reads and writes local state only; never calls outward.

use crate::db::{activity, recipes, Recipe};
use crate::{Error, Result};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

/// Valid rating scores, inclusive
const SCORE_RANGE: std::ops::RangeInclusive<i64> = 1..=5;

/// View-history and rating ledger over the cached recipes
#[derive(Clone)]
pub struct ActivityLog {
    db: SqlitePool,
}

impl ActivityLog {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Append one view event. Repeat views of the same recipe append again.
    pub async fn record_view(&self, viewer_id: i64, recipe_id: Uuid) -> Result<()> {
        activity::insert_view(&self.db, viewer_id, recipe_id).await
    }

    /// Rate a recipe 1–5. Re-rating the same recipe replaces the score.
    ///
    /// Rejects out-of-range scores and unknown recipe ids before writing.
    pub async fn rate(&self, viewer_id: i64, recipe_id: Uuid, score: i64) -> Result<()> {
        if !SCORE_RANGE.contains(&score) {
            return Err(Error::InvalidInput(format!(
                "score must be between 1 and 5, got {score}"
            )));
        }

        if recipes::find_by_guid(&self.db, recipe_id).await?.is_none() {
            return Err(Error::NotFound(format!("recipe {recipe_id}")));
        }

        activity::upsert_rating(&self.db, viewer_id, recipe_id, score).await?;
        debug!(viewer_id, recipe_id = %recipe_id, score, "rating stored");
        Ok(())
    }

    /// Most recent views, newest first; a recipe viewed three times appears
    /// three times
    pub async fn recent_history(&self, viewer_id: i64, limit: i64) -> Result<Vec<Recipe>> {
        activity::recent_views(&self.db, viewer_id, limit).await
    }

    /// Recipes the viewer has rated, best score first, one entry per recipe
    pub async fn rated_recipes(&self, viewer_id: i64) -> Result<Vec<Recipe>> {
        activity::rated_recipes(&self.db, viewer_id).await
    }

    /// (title, score) leaderboard for the viewer, best score first
    pub async fn rating_table(&self, viewer_id: i64) -> Result<Vec<(String, i64)>> {
        activity::rating_table(&self.db, viewer_id).await
    }
}
