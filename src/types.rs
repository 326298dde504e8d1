//! Shared data types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Categorical sentiment derived from a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Positive above zero, negative below, neutral only at exactly zero
    pub fn from_score(score: f64) -> Self {
        if score > 0.0 {
            SentimentLabel::Positive
        } else if score < 0.0 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "positive"),
            SentimentLabel::Negative => write!(f, "negative"),
            SentimentLabel::Neutral => write!(f, "neutral"),
        }
    }
}

/// Aggregated sentiment of one ingestion cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentSummary {
    /// Mean score of all scored posts (-1.0 to 1.0)
    pub score: f64,
    /// Number of posts aggregated
    pub count: u32,
}

/// A discussion post with its hybrid sentiment score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcePost {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub text: String,
    /// Upvote score on the source platform
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub subreddit: Option<String>,
    #[serde(default)]
    pub created_utc: Option<DateTime<Utc>>,
    pub sentiment: f64,
}

/// One persisted observation for a coin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    pub coin: String,
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
    pub sentiment: SentimentSummary,
    #[serde(rename = "topPosts", default)]
    pub source_posts: Vec<SourcePost>,
}

/// Sentiment summary with the trailing-window mean next to the raw score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmoothedSentiment {
    pub score: f64,
    pub count: u32,
    pub smoothed_score: f64,
}

/// A point whose sentiment carries the trailing-window mean
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmoothedPoint {
    pub coin: String,
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
    pub sentiment: SmoothedSentiment,
    #[serde(rename = "topPosts")]
    pub source_posts: Vec<SourcePost>,
}

impl SmoothedPoint {
    pub fn new(point: TimeSeriesPoint, smoothed_score: f64) -> Self {
        Self {
            coin: point.coin,
            timestamp: point.timestamp,
            price: point.price,
            sentiment: SmoothedSentiment {
                score: point.sentiment.score,
                count: point.sentiment.count,
                smoothed_score,
            },
            source_posts: point.source_posts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_label_from_score() {
        assert_eq!(SentimentLabel::from_score(0.2), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_score(-0.01), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_score(0.0), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(-0.0), SentimentLabel::Neutral);
    }

    #[test]
    fn test_label_serialization() {
        assert_eq!(
            serde_json::to_string(&SentimentLabel::Positive).unwrap(),
            "\"positive\""
        );
        assert_eq!(SentimentLabel::Negative.to_string(), "negative");
    }

    #[test]
    fn test_smoothed_point_nests_score_under_sentiment() {
        let point = TimeSeriesPoint {
            coin: "bitcoin".to_string(),
            timestamp: Utc::now(),
            price: dec!(5400000.25),
            sentiment: SentimentSummary {
                score: 0.4,
                count: 12,
            },
            source_posts: vec![],
        };
        let smoothed = SmoothedPoint::new(point, 0.25);

        let json = serde_json::to_value(&smoothed).unwrap();
        assert_eq!(json["coin"], "bitcoin");
        assert_eq!(json["sentiment"]["smoothedScore"], 0.25);
        assert_eq!(json["sentiment"]["score"], 0.4);
        assert_eq!(json["sentiment"]["count"], 12);
        assert!(json.get("smoothedScore").is_none());
        assert!(json["topPosts"].as_array().unwrap().is_empty());
    }
}
