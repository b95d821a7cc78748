//! Recipe persistence
//!
//! A recipe row is created once on first admission and never updated:
//! the unique (provider, external_id) index is the dedup key, and title,
//! image, instructions and summary are immutable after insert.

use crate::Result;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Canonical local recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Local identifier, stable for the recipe's lifetime
    pub guid: Uuid,
    /// Source provider tag (e.g. "thecocktaildb")
    pub provider: String,
    /// Provider-scoped external identifier
    pub external_id: String,
    pub title: String,
    pub image_url: String,
    pub instructions: String,
    /// Display strings ("2 oz White rum"), in provider slot order
    pub ingredients: Vec<String>,
    /// Encyclopedic summary; absent until enriched, never retried
    pub summary: Option<String>,
}

impl<'r> sqlx::FromRow<'r, SqliteRow> for Recipe {
    fn from_row(row: &'r SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        let guid: String = row.try_get("guid")?;
        let ingredients_json: String = row.try_get("ingredients")?;

        let guid = Uuid::parse_str(&guid).map_err(|e| sqlx::Error::ColumnDecode {
            index: "guid".into(),
            source: Box::new(e),
        })?;
        let ingredients: Vec<String> =
            serde_json::from_str(&ingredients_json).map_err(|e| sqlx::Error::ColumnDecode {
                index: "ingredients".into(),
                source: Box::new(e),
            })?;

        Ok(Self {
            guid,
            provider: row.try_get("provider")?,
            external_id: row.try_get("external_id")?,
            title: row.try_get("title")?,
            image_url: row.try_get("image_url")?,
            instructions: row.try_get("instructions")?,
            ingredients,
            summary: row.try_get("summary")?,
        })
    }
}

/// Insert a recipe unless the (provider, external_id) pair already exists.
///
/// Losing the race to another writer is fine: the conflict clause makes the
/// insert a no-op and the caller re-selects the canonical row.
pub async fn insert_if_absent(pool: &SqlitePool, recipe: &Recipe) -> Result<()> {
    let ingredients_json = serde_json::to_string(&recipe.ingredients)
        .map_err(|e| crate::Error::Internal(format!("failed to serialize ingredients: {e}")))?;

    sqlx::query(
        r#"
        INSERT INTO recipes (guid, provider, external_id, title, image_url, instructions, ingredients, summary)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(provider, external_id) DO NOTHING
        "#,
    )
    .bind(recipe.guid.to_string())
    .bind(&recipe.provider)
    .bind(&recipe.external_id)
    .bind(&recipe.title)
    .bind(&recipe.image_url)
    .bind(&recipe.instructions)
    .bind(&ingredients_json)
    .bind(&recipe.summary)
    .execute(pool)
    .await?;

    Ok(())
}

/// Look up the canonical recipe for an external identity
pub async fn find_by_external(
    pool: &SqlitePool,
    provider: &str,
    external_id: &str,
) -> Result<Option<Recipe>> {
    let recipe = sqlx::query_as::<_, Recipe>(
        "SELECT * FROM recipes WHERE provider = ? AND external_id = ?",
    )
    .bind(provider)
    .bind(external_id)
    .fetch_optional(pool)
    .await?;

    Ok(recipe)
}

/// Look up a recipe by its local identifier
pub async fn find_by_guid(pool: &SqlitePool, guid: Uuid) -> Result<Option<Recipe>> {
    let recipe = sqlx::query_as::<_, Recipe>("SELECT * FROM recipes WHERE guid = ?")
        .bind(guid.to_string())
        .fetch_optional(pool)
        .await?;

    Ok(recipe)
}
