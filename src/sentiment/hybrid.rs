//! Weighted blend of the external classifier and the lexicon baseline

use super::{ClassifierScorer, LexiconScorer, SentimentModel};
use async_trait::async_trait;

/// Weight of the external classifier score
pub const EXTERNAL_WEIGHT: f64 = 0.7;
/// Weight of the lexicon score
pub const LEXICON_WEIGHT: f64 = 0.3;

/// Fixed-weight combination, stays in [-1.0, 1.0] for inputs in range
pub fn combine(external: f64, lexicon: f64) -> f64 {
    (external * EXTERNAL_WEIGHT) + (lexicon * LEXICON_WEIGHT)
}

#[derive(Clone)]
pub struct HybridScorer {
    lexicon: LexiconScorer,
    external: ClassifierScorer,
}

impl HybridScorer {
    pub fn new(lexicon: LexiconScorer, external: ClassifierScorer) -> Self {
        Self { lexicon, external }
    }
}

#[async_trait]
impl SentimentModel for HybridScorer {
    async fn score(&self, text: &str) -> f64 {
        let baseline = self.lexicon.analyze(text);
        let external = self.external.score(text).await;
        combine(external, baseline)
    }

    fn name(&self) -> &str {
        "hybrid"
    }
}
