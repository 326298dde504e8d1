//! Sentiment Scoring Module
//!
//! Three interchangeable models turn discussion text into a score in
//! [-1.0, 1.0]:
//! - `baseline`: keyword lexicon
//! - `ml`: external classifier with lexicon fallback
//! - `hybrid`: 70/30 blend of the two

pub mod classifier;
pub mod evaluator;
pub mod hybrid;
pub mod lexicon;


pub use classifier::{ClassifierScorer, ClassifierVerdict, HttpClassifier, TextClassifier};
pub use evaluator::{builtin_samples, EvaluationReport, LabeledSample, ModelAccuracy, ModelEvaluator};
pub use hybrid::HybridScorer;
pub use lexicon::{Lexicon, LexiconScorer};

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// A text sentiment model
#[async_trait]
pub trait SentimentModel: Send + Sync {
    /// Score text in [-1.0, 1.0]. Implementations recover their own failures.
    async fn score(&self, text: &str) -> f64;

    fn name(&self) -> &str;
}

/// Scores of one text under every model
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelScores {
    pub baseline: f64,
    #[serde(rename = "ml")]
    pub external: f64,
    pub hybrid: f64,
}

/// The three scorers sharing one lexicon and one classifier
#[derive(Clone)]
pub struct SentimentModels {
    pub baseline: LexiconScorer,
    pub external: ClassifierScorer,
    pub hybrid: HybridScorer,
}

impl SentimentModels {
    pub fn new(lexicon: Arc<Lexicon>, classifier: Arc<dyn TextClassifier>) -> Self {
        let baseline = LexiconScorer::new(lexicon);
        let external = ClassifierScorer::new(classifier, baseline.clone());
        let hybrid = HybridScorer::new(baseline.clone(), external.clone());

        Self {
            baseline,
            external,
            hybrid,
        }
    }

    /// Run all three models on the same text
    pub async fn score_all(&self, text: &str) -> ModelScores {
        let baseline = self.baseline.analyze(text);
        let (external, hybrid) =
            tokio::join!(self.external.score(text), self.hybrid.score(text));

        ModelScores {
            baseline,
            external,
            hybrid,
        }
    }
}
