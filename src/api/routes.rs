//! API Routes
//!
//! Configures the Axum router with all card service endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, export_handler, fetch_handler, health_handler, not_found_handler,
    stats_handler, status_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /fetch` - Look up or queue card names (rate limited)
/// - `POST /export` - Download cards as CSV
/// - `GET /status` - Queue size, cache size, worker state
/// - `POST /clear` - Empty the cache and restart the worker
/// - `GET /stats` - Cache hit/miss statistics
/// - `GET /health` - Health check endpoint
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/fetch", post(fetch_handler))
        .route("/export", post(export_handler))
        .route("/status", get(status_handler))
        .route("/clear", post(clear_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .fallback(not_found_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
