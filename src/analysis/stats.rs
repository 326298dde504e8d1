//! Series statistics
//!
//! Trailing-window smoothing, Pearson correlation and descriptive stats over
//! plain `f64` series.

use crate::error::{Result, TrackerError};
use crate::types::{SmoothedPoint, TimeSeriesPoint};
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

/// Default smoothing window (points)
pub const DEFAULT_WINDOW: usize = 3;

/// |r| above this is a strong correlation
const STRONG_THRESHOLD: f64 = 0.3;
/// |r| above this (and not strong) is a moderate correlation
const MODERATE_THRESHOLD: f64 = 0.1;

/// Mean of each trailing window `[max(0, i - window + 1), i]`.
///
/// The first `window - 1` outputs average over fewer values. A zero window is
/// treated as 1.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);

    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

/// Attach the rolling mean of sentiment scores to every point
pub fn smooth(points: &[TimeSeriesPoint], window: usize) -> Vec<SmoothedPoint> {
    let scores = sentiment_series(points);
    let smoothed = rolling_mean(&scores, window);

    points
        .iter()
        .cloned()
        .zip(smoothed)
        .map(|(point, smoothed_score)| SmoothedPoint::new(point, smoothed_score))
        .collect()
}

/// Pearson correlation coefficient, always within [-1.0, 1.0].
///
/// Returns 0.0 instead of failing when the series differ in length, have
/// fewer than two values, or either one is constant.
pub fn correlate(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.len() < 2 {
        return 0.0;
    }

    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;

    for (x, y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        numerator += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    let denominator = (var_a * var_b).sqrt();
    if denominator == 0.0 {
        return 0.0;
    }

    // Rounding can push perfectly linear series just past ±1
    (numerator / denominator).clamp(-1.0, 1.0)
}

pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(TrackerError::EmptyInput);
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn min(values: &[f64]) -> Result<f64> {
    values
        .iter()
        .copied()
        .reduce(f64::min)
        .ok_or(TrackerError::EmptyInput)
}

pub fn max(values: &[f64]) -> Result<f64> {
    values
        .iter()
        .copied()
        .reduce(f64::max)
        .ok_or(TrackerError::EmptyInput)
}

/// Descriptive statistics of a non-empty series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl SeriesStats {
    pub fn from_values(values: &[f64]) -> Result<Self> {
        Ok(Self {
            mean: mean(values)?,
            min: min(values)?,
            max: max(values)?,
        })
    }
}

/// Qualitative strength of a correlation coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CorrelationStrength {
    #[serde(rename = "Strong correlation")]
    Strong,
    #[serde(rename = "Moderate correlation")]
    Moderate,
    #[serde(rename = "Weak correlation")]
    Weak,
}

impl CorrelationStrength {
    /// Same thresholds for positive and negative coefficients
    pub fn from_coefficient(r: f64) -> Self {
        let magnitude = r.abs();
        if magnitude > STRONG_THRESHOLD {
            CorrelationStrength::Strong
        } else if magnitude > MODERATE_THRESHOLD {
            CorrelationStrength::Moderate
        } else {
            CorrelationStrength::Weak
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CorrelationStrength::Strong => "Strong correlation",
            CorrelationStrength::Moderate => "Moderate correlation",
            CorrelationStrength::Weak => "Weak correlation",
        }
    }
}

impl std::fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn sentiment_series(points: &[TimeSeriesPoint]) -> Vec<f64> {
    points.iter().map(|p| p.sentiment.score).collect()
}

pub fn price_series(points: &[TimeSeriesPoint]) -> Vec<f64> {
    points
        .iter()
        .map(|p| p.price.to_f64().unwrap_or_default())
        .collect()
}
