use super::{ApiError, AppState};
use crate::analysis::{CoinTimeSeries, CorrelationReport, PerformanceReport};
use crate::sentiment::ModelScores;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

const DEFAULT_HOURS: f64 = 24.0;
const DEFAULT_COIN: &str = "bitcoin";

fn default_hours() -> f64 {
    DEFAULT_HOURS
}

fn default_coin() -> String {
    DEFAULT_COIN.to_string()
}

#[derive(Debug, Deserialize)]
pub struct WindowParams {
    #[serde(default = "default_hours")]
    pub hours: f64,
}

#[derive(Debug, Deserialize)]
pub struct CorrelationParams {
    #[serde(default = "default_coin")]
    pub coin: String,
    #[serde(default = "default_hours")]
    pub hours: f64,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    pub text: String,
    #[serde(flatten)]
    pub scores: ModelScores,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn coin_timeseries(
    State(state): State<Arc<AppState>>,
    Path(coin): Path<String>,
    Query(params): Query<WindowParams>,
) -> Result<Json<CoinTimeSeries>, ApiError> {
    let series = state.analysis.timeseries(&coin, params.hours).await?;
    Ok(Json(series))
}

pub async fn model_performance(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PerformanceReport>, ApiError> {
    let report = state.analysis.model_performance_report().await?;
    Ok(Json(report))
}

pub async fn evaluate_text(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EvaluateRequest>, JsonRejection>,
) -> Result<Json<EvaluateResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let text = request
        .text
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Text is required".to_string()))?;

    let scores = state.models.score_all(&text).await;
    Ok(Json(EvaluateResponse { text, scores }))
}

pub async fn correlation(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CorrelationParams>,
) -> Result<Json<CorrelationReport>, ApiError> {
    let report = state
        .analysis
        .correlation_report(&params.coin, params.hours)
        .await?;
    Ok(Json(report))
}
