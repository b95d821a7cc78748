//! barkeep service entrypoint

use anyhow::Result;
use barkeep::services::{ActivityLog, CocktailDbClient, RecipeCache, RecipeCatalog, WikipediaClient};
use barkeep::{build_router, db, AppState, Config};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting barkeep v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    info!("Database path: {}", config.database_path.display());

    let pool = db::init_database(&config.database_path).await?;

    let provider = Arc::new(CocktailDbClient::new(
        &config.cocktaildb_base_url,
        &config.cocktaildb_api_key,
        config.request_timeout,
    )?);
    let summaries = Arc::new(WikipediaClient::new(
        &config.wikipedia_base_url,
        config.request_timeout,
    )?);

    let cache = RecipeCache::new(pool.clone(), summaries);
    let activity = ActivityLog::new(pool.clone());
    let catalog = RecipeCatalog::new(provider, cache, activity.clone());

    let state = AppState::new(pool, catalog, activity, config.request_timeout);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("barkeep listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
