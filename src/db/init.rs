//! Database initialization
//!
//! Creates the SQLite database on first run and brings the schema up
//! idempotently. Safe to call on every startup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_recipes_table(&pool).await?;
    create_view_events_table(&pool).await?;
    create_ratings_table(&pool).await?;

    Ok(pool)
}

async fn create_recipes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS recipes (
            guid TEXT PRIMARY KEY,
            provider TEXT NOT NULL,
            external_id TEXT NOT NULL,
            title TEXT NOT NULL,
            image_url TEXT NOT NULL,
            instructions TEXT NOT NULL,
            ingredients TEXT NOT NULL,
            summary TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(provider, external_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_view_events_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS view_events (
            guid TEXT PRIMARY KEY,
            viewer_id INTEGER NOT NULL,
            recipe_id TEXT NOT NULL REFERENCES recipes(guid),
            viewed_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_view_events_viewer ON view_events(viewer_id, viewed_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_ratings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ratings (
            guid TEXT PRIMARY KEY,
            viewer_id INTEGER NOT NULL,
            recipe_id TEXT NOT NULL REFERENCES recipes(guid),
            score INTEGER NOT NULL,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(viewer_id, recipe_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
