//! Crypto Sentiment Tracker
//!
//! Collects prices and social sentiment for crypto coins and serves analysis
//! over HTTP.

use clap::{Parser, Subcommand};
use sentiment_tracker::{
    analysis::AnalysisService,
    api::{self, AppState},
    config::Config,
    ingester::{scheduler, CoinMarketCapClient, IngestionCycle, RedditClient, Scheduler},
    sentiment::{HttpClassifier, Lexicon, ModelEvaluator, SentimentModels},
    storage::Database,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "sentiment-tracker")]
#[command(about = "Crypto price and social sentiment tracker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (defaults to config.toml or ~/.config/sentiment-tracker/config.toml)
    #[arg(short, long)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API with periodic ingestion
    Serve,
    /// Run a single ingestion cycle and exit
    Ingest,
    /// Score a text with every model
    Score {
        /// Text to score
        text: String,
    },
    /// Print the model performance report
    Performance,
    /// Print the sentiment/price correlation report for a coin
    Correlation {
        #[arg(long, default_value = "bitcoin")]
        coin: String,
        /// Window length in hours
        #[arg(long, default_value = "24")]
        hours: f64,
    },
}

/// Long-lived services shared by every command
struct Services {
    db: Arc<Database>,
    models: SentimentModels,
}

impl Services {
    async fn init(config: &Config) -> anyhow::Result<Self> {
        let db = Arc::new(Database::connect(&config.database.path).await?);
        let classifier = HttpClassifier::from_config(&config.classifier)?;
        let models = SentimentModels::new(Arc::new(Lexicon::crypto()?), Arc::new(classifier));

        Ok(Self { db, models })
    }

    fn analysis(&self) -> AnalysisService {
        AnalysisService::new(self.db.clone(), ModelEvaluator::new(self.models.clone()))
    }

    fn ingestion_cycle(&self, config: &Config) -> anyhow::Result<IngestionCycle> {
        let timeout = Duration::from_secs(config.ingestion.request_timeout_secs);
        let prices =
            CoinMarketCapClient::new(&config.coinmarketcap, &config.ingestion.convert, timeout)?;
        let posts = RedditClient::new(config.reddit.clone(), config.ingestion.post_limit, timeout)?;

        Ok(IngestionCycle::new(
            Arc::new(prices),
            Arc::new(posts),
            self.db.clone(),
            self.models.hybrid.clone(),
            config.ingestion.coins.clone(),
            timeout,
        )
        .with_score_concurrency(config.ingestion.score_concurrency))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    let services = Services::init(&config).await?;

    match cli.command {
        Commands::Serve => serve(config, services).await,
        Commands::Ingest => ingest_once(config, services).await,
        Commands::Score { text } => score_text(services, &text).await,
        Commands::Performance => show_performance(services).await,
        Commands::Correlation { coin, hours } => show_correlation(services, &coin, hours).await,
    }
}

async fn serve(config: Config, services: Services) -> anyhow::Result<()> {
    tracing::info!("Starting sentiment tracker");

    let cycle = Arc::new(services.ingestion_cycle(&config)?);
    let ingestion = Scheduler::new(cycle, Duration::from_secs(config.ingestion.interval_secs)).spawn();
    tracing::info!(
        interval_secs = config.ingestion.interval_secs,
        coins = config.ingestion.coins.len(),
        "Data fetch scheduler started"
    );

    let retention = config
        .database
        .retention_days
        .map(|days| scheduler::spawn_retention(services.db.clone(), days));

    let state = Arc::new(AppState::new(services.analysis(), services.models.clone()));
    let addr = config.bind_address();

    let result = tokio::select! {
        result = api::serve(&addr, state) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
            Ok(())
        }
    };

    ingestion.abort();
    if let Some(handle) = retention {
        handle.abort();
    }

    result
}

async fn ingest_once(config: Config, services: Services) -> anyhow::Result<()> {
    let cycle = services.ingestion_cycle(&config)?;
    let summary = cycle.run().await?;

    println!("\n📥 Ingestion cycle complete\n");
    println!("  Stored:  {}", summary.stored);
    println!("  Skipped: {}", summary.skipped);
    println!("  Failed:  {}", summary.failed);
    println!("  Total points in store: {}", services.db.count().await?);

    Ok(())
}

async fn score_text(services: Services, text: &str) -> anyhow::Result<()> {
    let scores = services.models.score_all(text).await;

    println!("\n🔍 Sentiment for: {}\n", text);
    println!("{:<10} {:>8}", "Model", "Score");
    println!("{}", "-".repeat(19));
    println!("{:<10} {:>8.3}", "baseline", scores.baseline);
    println!("{:<10} {:>8.3}", "ml", scores.external);
    println!("{:<10} {:>8.3}", "hybrid", scores.hybrid);

    Ok(())
}

async fn show_performance(services: Services) -> anyhow::Result<()> {
    let report = services.analysis().model_performance_report().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn show_correlation(services: Services, coin: &str, hours: f64) -> anyhow::Result<()> {
    let report = services.analysis().correlation_report(coin, hours).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
