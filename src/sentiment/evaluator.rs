//! Accuracy comparison of the baseline, external and hybrid models
//!
//! Samples are scored concurrently; the per-sample results are collected in
//! input order and folded into counts afterwards.

use super::{ModelScores, SentimentModels};
use crate::types::SentimentLabel;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};

/// Text with its known sentiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSample {
    pub text: String,
    pub expected: SentimentLabel,
}

impl LabeledSample {
    pub fn new(text: impl Into<String>, expected: SentimentLabel) -> Self {
        Self {
            text: text.into(),
            expected,
        }
    }
}

/// Crypto-slang reference set used by the performance report
pub fn builtin_samples() -> Vec<LabeledSample> {
    vec![
        LabeledSample::new("Bitcoin is going to the moon! 🚀", SentimentLabel::Positive),
        LabeledSample::new("The market is crashing hard", SentimentLabel::Negative),
        LabeledSample::new("HODL strong, diamond hands!", SentimentLabel::Positive),
        LabeledSample::new("This is a complete scam", SentimentLabel::Negative),
        LabeledSample::new("Great time to buy the dip", SentimentLabel::Positive),
    ]
}

/// Hit counts and accuracy for one model
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelAccuracy {
    pub correct: u32,
    pub total: u32,
    /// correct / total, 0.0 when nothing was evaluated
    pub accuracy: f64,
}

impl ModelAccuracy {
    pub fn from_counts(correct: u32, total: u32) -> Self {
        let correct = correct.min(total);
        let accuracy = if total == 0 {
            0.0
        } else {
            f64::from(correct) / f64::from(total)
        };

        Self {
            correct,
            total,
            accuracy,
        }
    }

    fn record(&mut self, score: f64, expected: SentimentLabel) {
        if SentimentLabel::from_score(score) == expected {
            self.correct += 1;
        }
        self.total += 1;
    }

    fn finish(self) -> Self {
        Self::from_counts(self.correct, self.total)
    }
}

/// Per-model evaluation result
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub baseline: ModelAccuracy,
    #[serde(rename = "ml")]
    pub external: ModelAccuracy,
    pub hybrid: ModelAccuracy,
}

pub struct ModelEvaluator {
    models: SentimentModels,
}

impl ModelEvaluator {
    pub fn new(models: SentimentModels) -> Self {
        Self { models }
    }

    /// Score every sample with all three models and tally hits
    pub async fn evaluate(&self, samples: &[LabeledSample]) -> EvaluationReport {
        let scored: Vec<(SentimentLabel, ModelScores)> = join_all(samples.iter().map(|sample| async move {
            let scores = self.models.score_all(&sample.text).await;
            (sample.expected, scores)
        }))
        .await;

        let tally = scored.into_iter().fold(
            EvaluationReport::default(),
            |mut report, (expected, scores)| {
                report.baseline.record(scores.baseline, expected);
                report.external.record(scores.external, expected);
                report.hybrid.record(scores.hybrid, expected);
                report
            },
        );

        tracing::debug!(
            samples = samples.len(),
            baseline = tally.baseline.correct,
            ml = tally.external.correct,
            hybrid = tally.hybrid.correct,
            "Model evaluation complete"
        );

        EvaluationReport {
            baseline: tally.baseline.finish(),
            external: tally.external.finish(),
            hybrid: tally.hybrid.finish(),
        }
    }
}
