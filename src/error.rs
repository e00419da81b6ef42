//! Error types for the card service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == App Error Enum ==
/// Errors surfaced to callers of the HTTP layer.
#[derive(Error, Debug)]
pub enum AppError {
    /// Admission control rejected the call
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Route does not exist
    #[error("Not found")]
    NotFound,

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = match &self {
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

// == Queue Error Enum ==
/// Reasons an enqueue attempt was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// Queue stayed at capacity for the whole enqueue wait
    #[error("queue is full")]
    Full,

    /// The consuming side is gone
    #[error("queue is closed")]
    Closed,
}

// == Upstream Error Enum ==
/// Failure to set up a session with the upstream lookup service.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// Any other reason the upstream is unusable
    #[error("upstream unavailable: {0}")]
    Unavailable(String),
}

// == Result Type Alias ==
/// Convenience Result type for the HTTP layer.
pub type Result<T> = std::result::Result<T, AppError>;
