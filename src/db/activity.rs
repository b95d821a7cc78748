//! View history and rating persistence
//!
//! View events are append-only, one row per view. Ratings hold at most one
//! row per (viewer, recipe) pair; re-rating overwrites the score in place.

use crate::db::recipes::Recipe;
use crate::Result;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Append a view event for a viewer
pub async fn insert_view(pool: &SqlitePool, viewer_id: i64, recipe_id: Uuid) -> Result<()> {
    sqlx::query("INSERT INTO view_events (guid, viewer_id, recipe_id) VALUES (?, ?, ?)")
        .bind(Uuid::new_v4().to_string())
        .bind(viewer_id)
        .bind(recipe_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

/// Upsert a rating: a second rating for the same (viewer, recipe) pair
/// replaces the score atomically instead of adding a row.
pub async fn upsert_rating(
    pool: &SqlitePool,
    viewer_id: i64,
    recipe_id: Uuid,
    score: i64,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO ratings (guid, viewer_id, recipe_id, score)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(viewer_id, recipe_id) DO UPDATE SET
            score = excluded.score,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(viewer_id)
    .bind(recipe_id.to_string())
    .bind(score)
    .execute(pool)
    .await?;

    Ok(())
}

/// Recent views for a viewer, most recent first, duplicates preserved.
///
/// Same-timestamp ties fall back to insertion order (rowid).
pub async fn recent_views(pool: &SqlitePool, viewer_id: i64, limit: i64) -> Result<Vec<Recipe>> {
    let recipes = sqlx::query_as::<_, Recipe>(
        r#"
        SELECT r.* FROM view_events v
        JOIN recipes r ON r.guid = v.recipe_id
        WHERE v.viewer_id = ?
        ORDER BY v.viewed_at DESC, v.rowid DESC
        LIMIT ?
        "#,
    )
    .bind(viewer_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(recipes)
}

/// Recipes the viewer has rated, best score first, one row per recipe
pub async fn rated_recipes(pool: &SqlitePool, viewer_id: i64) -> Result<Vec<Recipe>> {
    let recipes = sqlx::query_as::<_, Recipe>(
        r#"
        SELECT r.* FROM ratings rt
        JOIN recipes r ON r.guid = rt.recipe_id
        WHERE rt.viewer_id = ?
        ORDER BY rt.score DESC, rt.rowid ASC
        "#,
    )
    .bind(viewer_id)
    .fetch_all(pool)
    .await?;

    Ok(recipes)
}

/// (title, score) pairs for the viewer's ratings, best score first
pub async fn rating_table(pool: &SqlitePool, viewer_id: i64) -> Result<Vec<(String, i64)>> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT r.title, rt.score FROM ratings rt
        JOIN recipes r ON r.guid = rt.recipe_id
        WHERE rt.viewer_id = ?
        ORDER BY rt.score DESC, rt.rowid ASC
        "#,
    )
    .bind(viewer_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
