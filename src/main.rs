use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use pivault::api;
use pivault::config::Config;
use pivault::storage::{CachedStorage, SqliteStorage, Storage};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Arc::new(Config::from_env()?);
    info!("Loaded configuration");

    // Initialize storage
    info!("Using SQLite storage: {}", config.database.url);
    let sqlite = SqliteStorage::new(
        &config.database.url,
        config.database.max_connections,
        config.weather.retention_days,
        config.weather.rollover_offset(),
    )
    .await?;

    let storage: Arc<dyn Storage> = Arc::new(CachedStorage::new(
        Arc::new(sqlite),
        config.cache.max_entries,
        config.cache.ttl_secs,
    ));

    info!("Initializing database...");
    storage.init().await?;
    info!("Database initialized successfully");

    if config.weather.api_key.is_some() {
        info!("Ingest API key configured - mismatched keys will be rejected");
    } else {
        info!("No ingest API key configured - any non-empty X-API-Key is accepted");
    }
    info!(
        "Primary station: {} (retention {} days, rollover offset {} min)",
        config.weather.default_station_id,
        config.weather.retention_days,
        config.weather.rollover_utc_offset_minutes
    );

    // Create router
    let router = api::create_api_router(Arc::clone(&storage), Arc::clone(&config));

    // Start API server
    let addr = format!("{}:{}", config.api_server.host, config.api_server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API server listening on http://{}", addr);
    info!("   - Weather endpoints at http://{}/api/v1/weather/...", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
