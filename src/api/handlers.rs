//! API Handlers
//!
//! HTTP request handlers for each card service endpoint.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{
    CardNamesRequest, CardSelection, ClearResponse, HealthResponse, LookupResult, StatsResponse,
    StatusResponse,
};
use crate::service::CardService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CardService>,
}

impl AppState {
    pub fn new(service: CardService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Creates the state with a service wired to the configured upstream.
    pub fn from_config(config: &Config) -> Self {
        Self::new(CardService::from_config(config))
    }
}

/// Handler for POST /fetch
///
/// Answers cached names immediately and queues the rest. An empty list
/// returns every cached card. Subject to the rate limiter.
pub async fn fetch_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CardNamesRequest>, JsonRejection>,
) -> Result<Json<Vec<LookupResult>>> {
    state.service.check_rate_limit().await?;

    let selection = parse_selection(payload)?;
    Ok(Json(state.service.bulk_lookup(&selection).await))
}

/// Handler for POST /export
///
/// Returns the requested (or all cached) cards as a CSV attachment.
pub async fn export_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CardNamesRequest>, JsonRejection>,
) -> Result<Response> {
    let selection = parse_selection(payload)?;
    let csv = state.service.export_csv(&selection).await;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"card_data.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

/// Handler for GET /status
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    let status = state.service.status().await;

    Json(StatusResponse {
        queue_size: status.queue_size,
        cache_size: status.cache_size,
        is_fetching: status.is_running,
    })
}

/// Handler for POST /clear
///
/// Empties the cache and restarts the queue worker.
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.service.clear().await;
    Json(ClearResponse::cleared())
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.service.cache_stats().await.into())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Unwraps a JSON body into a card selection, mapping rejections to 400.
fn parse_selection(
    payload: std::result::Result<Json<CardNamesRequest>, JsonRejection>,
) -> Result<CardSelection> {
    let Json(req) = payload.map_err(|e| AppError::InvalidRequest(e.body_text()))?;
    Ok(req.selection())
}

/// Fallback for unknown routes.
pub async fn not_found_handler() -> AppError {
    AppError::NotFound
}
