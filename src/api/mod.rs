//! HTTP API
//!
//! JSON endpoints over the analysis service and the sentiment models.

mod handlers;

#[cfg(test)]
mod tests;

use crate::analysis::AnalysisService;
use crate::error::TrackerError;
use crate::sentiment::SentimentModels;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared request state
pub struct AppState {
    pub analysis: AnalysisService,
    pub models: SentimentModels,
}

impl AppState {
    pub fn new(analysis: AnalysisService, models: SentimentModels) -> Self {
        Self { analysis, models }
    }
}

/// Error returned by handlers
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl From<TrackerError> for ApiError {
    fn from(err: TrackerError) -> Self {
        if err.is_client_error() {
            ApiError::BadRequest(err.to_string())
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => {
                tracing::warn!(%message, "Rejected request");
                (StatusCode::BAD_REQUEST, message)
            }
            ApiError::Internal(message) => {
                tracing::error!(%message, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/coins/:coin/timeseries", get(handlers::coin_timeseries))
        .route("/api/ml/performance", get(handlers::model_performance))
        .route("/api/ml/evaluate", post(handlers::evaluate_text))
        .route("/api/ml/correlation", get(handlers::correlation))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `addr` and serve until the task is cancelled
pub async fn serve(addr: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(address = %listener.local_addr()?, "HTTP server listening");

    axum::serve(listener, router(state)).await?;
    Ok(())
}
