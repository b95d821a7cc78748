//! Recipe admission and deduplication
//!
//! `ensure` maps an external record to the canonical local recipe, creating
//! it on first sight. The (provider, external_id) pair is the dedup key:
//! at most one row may ever exist for it, and a second sighting returns the
//! stored row untouched, so an enriched copy is never overwritten by an
//! unenriched one.
//!
//! Admission is serialized per external identity with a keyed lock, so
//! concurrent first sightings neither create duplicate rows nor fetch the
//! summary twice. The unique index plus the conflict-tolerant insert backs
//! the same guarantee at the store level.

use crate::db::recipes::{self, Recipe};
use crate::services::provider::ExternalRecord;
use crate::services::wikipedia_client::SummarySource;
use crate::{Error, Result};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

/// Upsert/dedup engine over the local recipe store
#[derive(Clone)]
pub struct RecipeCache {
    db: SqlitePool,
    summaries: Arc<dyn SummarySource>,
    /// Per-identity admission locks, keyed by "provider/external_id"
    admissions: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl RecipeCache {
    pub fn new(db: SqlitePool, summaries: Arc<dyn SummarySource>) -> Self {
        Self {
            db,
            summaries,
            admissions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Return the canonical recipe for an external record, admitting it on
    /// first sight.
    ///
    /// Enrichment runs once, at admission; its failure downgrades to an
    /// absent summary and is never retried for an already-cached recipe.
    pub async fn ensure(&self, record: &ExternalRecord, cancel: &CancellationToken) -> Result<Recipe> {
        if let Some(existing) =
            recipes::find_by_external(&self.db, record.provider, &record.external_id).await?
        {
            return Ok(existing);
        }

        let key = format!("{}/{}", record.provider, record.external_id);
        let lock = self.admission_lock(&key).await;
        let _guard = lock.lock().await;

        // Another task may have admitted this identity while we waited
        if let Some(existing) =
            recipes::find_by_external(&self.db, record.provider, &record.external_id).await?
        {
            debug!(key = %key, "lost admission race, reusing existing recipe");
            self.release_admission_lock(&key).await;
            return Ok(existing);
        }

        let summary = self.summaries.summary(&record.title, cancel).await;

        let recipe = Recipe {
            guid: Uuid::new_v4(),
            provider: record.provider.to_string(),
            external_id: record.external_id.clone(),
            title: record.title.clone(),
            image_url: record.image_url.clone(),
            instructions: record.instructions.clone(),
            ingredients: record.ingredients.clone(),
            summary,
        };

        recipes::insert_if_absent(&self.db, &recipe).await?;
        self.release_admission_lock(&key).await;

        // Re-select in case a concurrent writer outside this process won
        // the insert; the stored row is the canonical one either way.
        let stored = recipes::find_by_external(&self.db, record.provider, &record.external_id)
            .await?
            .ok_or_else(|| Error::Internal(format!("recipe vanished after admission: {key}")))?;

        info!(
            title = %stored.title,
            provider = %stored.provider,
            external_id = %stored.external_id,
            enriched = stored.summary.is_some(),
            "admitted recipe"
        );

        Ok(stored)
    }

    /// `ensure` each record, preserving input order.
    ///
    /// One record's enrichment failure never fails the batch; only a store
    /// failure does.
    pub async fn ensure_many(
        &self,
        records: &[ExternalRecord],
        cancel: &CancellationToken,
    ) -> Result<Vec<Recipe>> {
        let mut out = Vec::with_capacity(records.len());
        for record in records {
            out.push(self.ensure(record, cancel).await?);
        }
        Ok(out)
    }

    async fn admission_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut admissions = self.admissions.lock().await;
        admissions
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the keyed lock once the identity exists in the store; later
    /// callers hit the fast path and never look the key up again.
    async fn release_admission_lock(&self, key: &str) {
        let mut admissions = self.admissions.lock().await;
        admissions.remove(key);
    }
}
