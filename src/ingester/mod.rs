//! Data ingestion from external sources
//!
//! Every cycle collects:
//! - Spot prices (CoinMarketCap)
//! - Discussion posts per coin (Reddit search)
//!
//! and stores one sentiment-scored time-series point per coin.

pub mod coinmarketcap;
pub mod cycle;
pub mod reddit;
pub mod scheduler;


pub use coinmarketcap::CoinMarketCapClient;
pub use cycle::{CycleSummary, IngestionCycle};
pub use reddit::RedditClient;
pub use scheduler::Scheduler;

use crate::config::CoinConfig;
use crate::error::{Result, TrackerError};
use crate::types::SourcePost;
use async_trait::async_trait;
use chrono::DateTime;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

/// Post as returned by the discussion source
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawPost {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub subreddit: Option<String>,
    /// Unix seconds
    #[serde(default)]
    pub created_utc: Option<f64>,
}

impl RawPost {
    /// Text used for scoring: title and body joined by a space
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.selftext)
    }

    pub fn has_text(&self) -> bool {
        !self.title.trim().is_empty() || !self.selftext.trim().is_empty()
    }

    pub fn into_source_post(self, sentiment: f64) -> SourcePost {
        let created_utc = self
            .created_utc
            .and_then(|secs| DateTime::from_timestamp(secs as i64, 0));

        SourcePost {
            id: self.id,
            title: self.title,
            text: self.selftext,
            score: self.score,
            url: self.url,
            subreddit: self.subreddit,
            created_utc,
            sentiment,
        }
    }
}

/// Spot price provider
#[async_trait]
pub trait PriceSource: Send + Sync {
    fn name(&self) -> &str;

    /// Prices keyed by coin id. Coins without a quote are left out.
    async fn fetch_prices(&self, coins: &[CoinConfig]) -> Result<HashMap<String, Decimal>>;
}

/// Discussion post provider
#[async_trait]
pub trait PostSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_posts(&self, query: &str) -> Result<Vec<RawPost>>;
}

/// Bound an external call so a stalled provider cannot block the cycle
pub async fn with_timeout<T, F>(operation: &str, limit: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| TrackerError::Timeout {
            operation: operation.to_string(),
            secs: limit.as_secs(),
        })?
}

/// First 200 characters of a response body, for error messages
pub(crate) fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}
