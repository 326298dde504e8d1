//! Time-series persistence
//!
//! One row per coin per ingestion cycle. Posts are kept as a JSON column.


use crate::error::Result;
use crate::types::{SentimentSummary, SourcePost, TimeSeriesPoint};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::Path;

/// Append-only store of coin observations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TimeSeriesStore: Send + Sync {
    async fn insert(&self, point: &TimeSeriesPoint) -> Result<()>;

    /// Points for one coin at or after `since`, oldest first
    async fn query_range(&self, coin: &str, since: DateTime<Utc>) -> Result<Vec<TimeSeriesPoint>>;

    /// Latest points across all coins, newest first
    async fn query_recent(&self, limit: i64) -> Result<Vec<TimeSeriesPoint>>;
}

/// SQLite-backed store
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to SQLite database (creates if not exists)
    pub async fn connect<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db_url = format!("sqlite:{}?mode=rwc", path.as_ref().display());
        Self::connect_with(SqlitePoolOptions::new().max_connections(5), &db_url).await
    }

    /// Private in-memory database, used by tests and dry runs
    pub async fn in_memory() -> Result<Self> {
        // Every connection to :memory: is a separate database, so keep exactly one alive
        let options = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
        Self::connect_with(options, "sqlite::memory:").await
    }

    async fn connect_with(options: SqlitePoolOptions, url: &str) -> Result<Self> {
        let pool = options.connect(url).await?;

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS coin_data (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                coin TEXT NOT NULL,
                timestamp_ms INTEGER NOT NULL,
                price TEXT NOT NULL,
                sentiment_score REAL NOT NULL,
                sentiment_count INTEGER NOT NULL,
                posts TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_coin_data_coin_time
            ON coin_data(coin, timestamp_ms DESC)
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_coin_data_time
            ON coin_data(timestamp_ms DESC)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete points older than `keep_days`
    pub async fn cleanup(&self, keep_days: i64) -> Result<u64> {
        let cutoff = Utc::now() - chrono::Duration::days(keep_days);

        let result = sqlx::query("DELETE FROM coin_data WHERE timestamp_ms < ?")
            .bind(cutoff.timestamp_millis())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Number of stored points
    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM coin_data")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl TimeSeriesStore for Database {
    async fn insert(&self, point: &TimeSeriesPoint) -> Result<()> {
        let posts = serde_json::to_string(&point.source_posts)?;

        sqlx::query(
            r#"
            INSERT INTO coin_data
            (coin, timestamp_ms, price, sentiment_score, sentiment_count, posts, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&point.coin)
        .bind(point.timestamp.timestamp_millis())
        .bind(point.price.to_string())
        .bind(point.sentiment.score)
        .bind(i64::from(point.sentiment.count))
        .bind(posts)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn query_range(&self, coin: &str, since: DateTime<Utc>) -> Result<Vec<TimeSeriesPoint>> {
        let rows = sqlx::query_as::<_, CoinDataRow>(
            r#"
            SELECT coin, timestamp_ms, price, sentiment_score, sentiment_count, posts
            FROM coin_data
            WHERE coin = ? AND timestamp_ms >= ?
            ORDER BY timestamp_ms ASC, id ASC
            "#,
        )
        .bind(coin)
        .bind(since.timestamp_millis())
        .fetch_all(&self.pool)
        .await?;

        Ok(into_points(rows))
    }

    async fn query_recent(&self, limit: i64) -> Result<Vec<TimeSeriesPoint>> {
        let rows = sqlx::query_as::<_, CoinDataRow>(
            r#"
            SELECT coin, timestamp_ms, price, sentiment_score, sentiment_count, posts
            FROM coin_data
            ORDER BY timestamp_ms DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(into_points(rows))
    }
}

fn into_points(rows: Vec<CoinDataRow>) -> Vec<TimeSeriesPoint> {
    rows.into_iter()
        .filter_map(|row| match TimeSeriesPoint::try_from(row) {
            Ok(point) => Some(point),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable coin_data row");
                None
            }
        })
        .collect()
}

// SQLx row types
#[derive(Debug, sqlx::FromRow)]
struct CoinDataRow {
    coin: String,
    timestamp_ms: i64,
    price: String,
    sentiment_score: f64,
    sentiment_count: i64,
    posts: String,
}

impl TryFrom<CoinDataRow> for TimeSeriesPoint {
    type Error = anyhow::Error;

    fn try_from(row: CoinDataRow) -> std::result::Result<Self, Self::Error> {
        let timestamp = DateTime::from_timestamp_millis(row.timestamp_ms)
            .ok_or_else(|| anyhow::anyhow!("timestamp out of range: {}", row.timestamp_ms))?;
        let source_posts: Vec<SourcePost> = serde_json::from_str(&row.posts)?;

        Ok(TimeSeriesPoint {
            coin: row.coin,
            timestamp,
            price: row.price.parse()?,
            sentiment: SentimentSummary {
                score: row.sentiment_score,
                count: u32::try_from(row.sentiment_count)?,
            },
            source_posts,
        })
    }
}
