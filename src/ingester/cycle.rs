//! One ingestion pass over all configured coins

use super::{with_timeout, PostSource, PriceSource, RawPost};
use crate::config::CoinConfig;
use crate::error::{Result, TrackerError};
use crate::sentiment::{HybridScorer, SentimentModel};
use crate::storage::TimeSeriesStore;
use crate::types::{SentimentSummary, TimeSeriesPoint};
use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Outcome counts of a cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleSummary {
    /// Coins with a stored point
    pub stored: usize,
    /// Coins without any scorable posts
    pub skipped: usize,
    /// Coins that failed (no price, store error)
    pub failed: usize,
}

/// Classifier requests in flight per coin unless configured otherwise
pub const DEFAULT_SCORE_CONCURRENCY: usize = 8;

enum CoinOutcome {
    Stored,
    Skipped,
}

pub struct IngestionCycle {
    prices: Arc<dyn PriceSource>,
    posts: Arc<dyn PostSource>,
    store: Arc<dyn TimeSeriesStore>,
    scorer: HybridScorer,
    coins: Vec<CoinConfig>,
    call_timeout: Duration,
    score_concurrency: usize,
}

impl IngestionCycle {
    pub fn new(
        prices: Arc<dyn PriceSource>,
        posts: Arc<dyn PostSource>,
        store: Arc<dyn TimeSeriesStore>,
        scorer: HybridScorer,
        coins: Vec<CoinConfig>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            prices,
            posts,
            store,
            scorer,
            coins,
            call_timeout,
            score_concurrency: DEFAULT_SCORE_CONCURRENCY,
        }
    }

    /// Cap on posts scored at once; 0 is treated as 1
    pub fn with_score_concurrency(mut self, limit: usize) -> Self {
        self.score_concurrency = limit.max(1);
        self
    }

    /// Fetch, score and persist one point per coin.
    ///
    /// A price failure aborts the cycle; anything else only affects its coin.
    pub async fn run(&self) -> Result<CycleSummary> {
        let prices = with_timeout(
            &format!("fetch prices from {}", self.prices.name()),
            self.call_timeout,
            self.prices.fetch_prices(&self.coins),
        )
        .await?;

        let mut summary = CycleSummary::default();

        for coin in &self.coins {
            match self.process_coin(coin, prices.get(&coin.id).copied()).await {
                Ok(CoinOutcome::Stored) => summary.stored += 1,
                Ok(CoinOutcome::Skipped) => summary.skipped += 1,
                Err(e) => {
                    error!(coin = %coin.id, error = %e, "Failed to ingest coin");
                    summary.failed += 1;
                }
            }
        }

        info!(
            stored = summary.stored,
            skipped = summary.skipped,
            failed = summary.failed,
            "Ingestion cycle complete"
        );
        Ok(summary)
    }

    async fn process_coin(&self, coin: &CoinConfig, price: Option<Decimal>) -> Result<CoinOutcome> {
        let price = price.ok_or_else(|| {
            TrackerError::ExternalService(format!("no price quote for {}", coin.symbol))
        })?;

        let posts = match with_timeout(
            &format!("fetch {} posts from {}", coin.id, self.posts.name()),
            self.call_timeout,
            self.posts.fetch_posts(&coin.id),
        )
        .await
        {
            Ok(posts) => posts,
            Err(e) => {
                warn!(coin = %coin.id, error = %e, "Post source failed, continuing without posts");
                Vec::new()
            }
        };

        let posts: Vec<RawPost> = posts.into_iter().filter(RawPost::has_text).collect();
        if posts.is_empty() {
            warn!(coin = %coin.id, "No posts or sentiments found. Skipping save");
            return Ok(CoinOutcome::Skipped);
        }

        // Results come back in post order
        let score_futures: Vec<_> = posts
            .iter()
            .map(|post| {
                let text = post.text();
                async move { self.scorer.score(&text).await }
            })
            .collect();
        let scores: Vec<f64> = stream::iter(score_futures)
            .buffered(self.score_concurrency)
            .collect()
            .await;

        let count = scores.len();
        let mean = scores.iter().sum::<f64>() / count as f64;

        let point = TimeSeriesPoint {
            coin: coin.id.clone(),
            timestamp: Utc::now(),
            price,
            sentiment: SentimentSummary {
                score: mean,
                count: u32::try_from(count).unwrap_or(u32::MAX),
            },
            source_posts: posts
                .into_iter()
                .zip(scores)
                .map(|(post, score)| post.into_source_post(score))
                .collect(),
        };

        self.store.insert(&point).await?;
        info!(coin = %coin.id, price = %price, sentiment = mean, posts = count, "Stored data point");

        Ok(CoinOutcome::Stored)
    }
}
