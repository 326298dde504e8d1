//! Configuration management

use crate::error::TrackerError;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub classifier: ClassifierConfig,
    pub ingestion: IngestionConfig,
    pub coinmarketcap: CoinMarketCapConfig,
    pub reddit: RedditConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database path
    pub path: String,
    /// Days of history to keep (None keeps everything)
    pub retention_days: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Prediction endpoint of the sentiment model service
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// Seconds between ingestion cycles
    pub interval_secs: u64,
    /// Timeout applied to each external call in a cycle
    pub request_timeout_secs: u64,
    /// Maximum posts fetched per coin
    pub post_limit: u32,
    /// Maximum classifier requests in flight while scoring a coin's posts
    pub score_concurrency: usize,
    /// Fiat currency prices are quoted in
    pub convert: String,
    pub coins: Vec<CoinConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CoinConfig {
    /// Identifier used for storage and post search (e.g. "bitcoin")
    pub id: String,
    /// Ticker symbol used for price quotes (e.g. "BTC")
    pub symbol: String,
}

impl CoinConfig {
    pub fn new(id: &str, symbol: &str) -> Self {
        Self {
            id: id.to_string(),
            symbol: symbol.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoinMarketCapConfig {
    pub api_key: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedditConfig {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    pub auth_url: String,
    pub api_url: String,
}

impl Config {
    /// Load configuration from file, overridden by `SENTIMENT_*` environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref().to_string_lossy().into_owned();
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&path).required(false))
            .add_source(
                config::Environment::with_prefix("SENTIMENT")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from default locations
    pub fn load_default() -> anyhow::Result<Self> {
        let paths = ["config.toml", "~/.config/sentiment-tracker/config.toml"];

        for path in paths {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                return Self::load(expanded.as_ref());
            }
        }

        tracing::warn!("No configuration file found, using defaults and environment");
        Self::load("config.toml")
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.ingestion.coins.is_empty() {
            return Err(TrackerError::InvalidConfiguration(
                "at least one coin must be configured".into(),
            ));
        }
        if self.ingestion.interval_secs == 0 {
            return Err(TrackerError::InvalidConfiguration(
                "ingestion.interval_secs must be positive".into(),
            ));
        }
        if self.ingestion.score_concurrency == 0 {
            return Err(TrackerError::InvalidConfiguration(
                "ingestion.score_concurrency must be positive".into(),
            ));
        }
        if self.ingestion.request_timeout_secs == 0 || self.classifier.timeout_secs == 0 {
            return Err(TrackerError::InvalidConfiguration(
                "timeouts must be positive".into(),
            ));
        }

        let mut seen = HashSet::new();
        for coin in &self.ingestion.coins {
            if !seen.insert(coin.id.as_str()) {
                return Err(TrackerError::InvalidConfiguration(format!(
                    "duplicate coin id: {}",
                    coin.id
                )));
            }
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "sentiment.db".to_string(),
            retention_days: None,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000/predict".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            interval_secs: 900, // 15 minutes
            request_timeout_secs: 30,
            post_limit: 250,
            score_concurrency: 8,
            convert: "INR".to_string(),
            coins: vec![
                CoinConfig::new("bitcoin", "BTC"),
                CoinConfig::new("ethereum", "ETH"),
                CoinConfig::new("dogecoin", "DOGE"),
            ],
        }
    }
}

impl Default for CoinMarketCapConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://pro-api.coinmarketcap.com".to_string(),
        }
    }
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            user_agent: "sentiment-tracker/0.1".to_string(),
            auth_url: "https://www.reddit.com/api/v1/access_token".to_string(),
            api_url: "https://oauth.reddit.com".to_string(),
        }
    }
}
