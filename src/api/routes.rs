use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::Config;
use crate::storage::Storage;

use super::handlers::{
    current_reading, export_window, health_check, history, ingest_reading, rain_reset, stats,
    AppState,
};

pub fn create_api_router(storage: Arc<dyn Storage>, config: Arc<Config>) -> Router {
    let state = Arc::new(AppState { storage, config });

    let weather_routes = Router::new()
        .route("/ingest", post(ingest_reading))
        .route("/current", get(current_reading))
        .route("/rain-reset", post(rain_reset))
        .route("/history", get(history))
        .route("/stats", get(stats))
        .route("/export", get(export_window));

    Router::new()
        .nest("/api/v1/weather", weather_routes)
        .route("/api/health", get(health_check))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
