//! Keyword lexicon sentiment scoring
//!
//! Baseline model: counts crypto/finance polarity words and normalizes the
//! tally into [-1.0, 1.0].

use super::SentimentModel;
use crate::error::{Result, TrackerError};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

/// Raw word tally is divided by this before clamping
const NORMALIZATION: f64 = 5.0;

const POSITIVE_WORDS: &[&str] = &[
    "bullish",
    "moon",
    "buy",
    "growth",
    "profit",
    "gain",
    "up",
    "good",
    "great",
    "excellent",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bearish", "crash", "sell", "loss", "down", "bad", "terrible", "scam", "dump",
];

/// Immutable pair of disjoint polarity word sets
#[derive(Debug, Clone)]
pub struct Lexicon {
    positive: HashSet<String>,
    negative: HashSet<String>,
}

impl Lexicon {
    /// Build a lexicon from custom word lists.
    ///
    /// Words are lowercased. A word in both lists is rejected.
    pub fn new<P, N, S>(positive: P, negative: N) -> Result<Self>
    where
        P: IntoIterator<Item = S>,
        N: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let positive: HashSet<String> = positive
            .into_iter()
            .map(|w| w.as_ref().to_lowercase())
            .collect();
        let negative: HashSet<String> = negative
            .into_iter()
            .map(|w| w.as_ref().to_lowercase())
            .collect();

        if let Some(word) = positive.intersection(&negative).next() {
            return Err(TrackerError::InvalidConfiguration(format!(
                "word '{}' appears in both positive and negative lexicons",
                word
            )));
        }

        Ok(Self { positive, negative })
    }

    /// Default crypto vocabulary
    pub fn crypto() -> Result<Self> {
        Self::new(POSITIVE_WORDS, NEGATIVE_WORDS)
    }

    /// +1 for a positive token, -1 for a negative one, 0 otherwise.
    /// Exact match only.
    pub fn polarity(&self, token: &str) -> i32 {
        if self.positive.contains(token) {
            1
        } else if self.negative.contains(token) {
            -1
        } else {
            0
        }
    }
}

/// Baseline scorer backed by a shared [`Lexicon`]
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    lexicon: Arc<Lexicon>,
}

impl LexiconScorer {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    /// Score text in [-1.0, 1.0]. Never fails.
    pub fn analyze(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let tally: i32 = lower
            .split_whitespace()
            .map(|word| self.lexicon.polarity(word))
            .sum();

        (f64::from(tally) / NORMALIZATION).clamp(-1.0, 1.0)
    }
}

#[async_trait]
impl SentimentModel for LexiconScorer {
    async fn score(&self, text: &str) -> f64 {
        self.analyze(text)
    }

    fn name(&self) -> &str {
        "baseline"
    }
}
