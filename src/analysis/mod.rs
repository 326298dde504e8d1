//! Model performance and sentiment/price analysis over stored data

pub mod stats;

#[cfg(test)]
mod tests;

pub use stats::{
    correlate, price_series, sentiment_series, smooth, CorrelationStrength, SeriesStats,
    DEFAULT_WINDOW,
};

use crate::error::{Result, TrackerError};
use crate::sentiment::{builtin_samples, EvaluationReport, ModelEvaluator};
use crate::storage::TimeSeriesStore;
use crate::types::SmoothedPoint;
use chrono::{Duration, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Most recent points considered by the performance report
pub const PERFORMANCE_SAMPLE_LIMIT: i64 = 100;
/// Performance report attaches a correlation only above this many points
pub const MIN_PERFORMANCE_POINTS: usize = 11;
pub const MIN_CORRELATION_POINTS: usize = 10;
/// Correlation above which sentiment is called out as a price signal
pub const RECOMMENDATION_CORRELATION: f64 = 0.2;

pub const HYBRID_IMPROVES: &str = "Hybrid model shows improvement over baseline";
pub const STRONG_CORRELATION: &str = "Strong sentiment-price correlation detected";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationAnalysis {
    pub correlation: f64,
    pub data_points: usize,
    pub interpretation: CorrelationStrength,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub model_comparison: EvaluationReport,
    pub correlation_analysis: Option<CorrelationAnalysis>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationReport {
    pub coin: String,
    /// Window length in hours
    pub time_range: f64,
    pub data_points: usize,
    pub correlation: f64,
    pub interpretation: CorrelationStrength,
    pub sentiment_stats: SeriesStats,
    pub price_stats: SeriesStats,
}

/// Smoothed series for one coin
#[derive(Debug, Clone, Serialize)]
pub struct CoinTimeSeries {
    pub coin: String,
    pub data: Vec<SmoothedPoint>,
}

pub struct AnalysisService {
    store: Arc<dyn TimeSeriesStore>,
    evaluator: ModelEvaluator,
}

impl AnalysisService {
    pub fn new(store: Arc<dyn TimeSeriesStore>, evaluator: ModelEvaluator) -> Self {
        Self { store, evaluator }
    }

    /// Evaluate all models on the built-in samples and check how stored
    /// sentiment tracks price
    pub async fn model_performance_report(&self) -> Result<PerformanceReport> {
        let model_comparison = self.evaluator.evaluate(&builtin_samples()).await;

        let recent = self.store.query_recent(PERFORMANCE_SAMPLE_LIMIT).await?;
        let correlation_analysis = if recent.len() >= MIN_PERFORMANCE_POINTS {
            let correlation = correlate(&sentiment_series(&recent), &price_series(&recent));
            Some(CorrelationAnalysis {
                correlation,
                data_points: recent.len(),
                interpretation: CorrelationStrength::from_coefficient(correlation),
            })
        } else {
            tracing::debug!(
                available = recent.len(),
                "Not enough stored points for correlation analysis"
            );
            None
        };

        let recommendations = recommendations(&model_comparison, correlation_analysis.as_ref());

        Ok(PerformanceReport {
            model_comparison,
            correlation_analysis,
            recommendations,
        })
    }

    /// Correlation between sentiment and price for one coin over the last `hours`
    pub async fn correlation_report(&self, coin: &str, hours: f64) -> Result<CorrelationReport> {
        let since = window_start(hours)?;
        let points = self.store.query_range(coin, since).await?;

        if points.len() < MIN_CORRELATION_POINTS {
            return Err(TrackerError::InsufficientData {
                required: MIN_CORRELATION_POINTS,
                available: points.len(),
            });
        }

        let sentiments = sentiment_series(&points);
        let prices = price_series(&points);
        let correlation = correlate(&sentiments, &prices);

        Ok(CorrelationReport {
            coin: coin.to_string(),
            time_range: hours,
            data_points: points.len(),
            correlation,
            interpretation: CorrelationStrength::from_coefficient(correlation),
            sentiment_stats: SeriesStats::from_values(&sentiments)?,
            price_stats: SeriesStats::from_values(&prices)?,
        })
    }

    pub async fn timeseries(&self, coin: &str, hours: f64) -> Result<CoinTimeSeries> {
        let since = window_start(hours)?;
        let points = self.store.query_range(coin, since).await?;

        Ok(CoinTimeSeries {
            coin: coin.to_string(),
            data: smooth(&points, DEFAULT_WINDOW),
        })
    }
}

pub fn recommendations(
    comparison: &EvaluationReport,
    correlation: Option<&CorrelationAnalysis>,
) -> Vec<String> {
    let mut out = Vec::new();

    if comparison.hybrid.accuracy > comparison.baseline.accuracy {
        out.push(HYBRID_IMPROVES.to_string());
    }

    if correlation.is_some_and(|c| c.correlation > RECOMMENDATION_CORRELATION) {
        out.push(STRONG_CORRELATION.to_string());
    }

    out
}

fn window_start(hours: f64) -> Result<chrono::DateTime<Utc>> {
    if !hours.is_finite() || hours <= 0.0 {
        return Err(TrackerError::InvalidInput(format!(
            "hours must be a positive number, got {}",
            hours
        )));
    }

    let millis = (hours * 3_600_000.0).min(i64::MAX as f64 / 2.0) as i64;
    let window = Duration::try_milliseconds(millis).ok_or_else(|| {
        TrackerError::InvalidInput(format!("hours out of range: {}", hours))
    })?;

    Ok(Utc::now()
        .checked_sub_signed(window)
        .unwrap_or(chrono::DateTime::<Utc>::MIN_UTC))
}
