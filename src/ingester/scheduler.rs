//! Periodic ingestion trigger

use super::IngestionCycle;
use crate::storage::Database;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Runs an ingestion cycle immediately and then every `period`
pub struct Scheduler {
    cycle: Arc<IngestionCycle>,
    period: Duration,
}

impl Scheduler {
    pub fn new(cycle: Arc<IngestionCycle>, period: Duration) -> Self {
        Self { cycle, period }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Never returns; cycle errors are logged and retried on the next tick
    pub async fn run(self) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            tracing::info!("Starting scheduled data fetch and processing");

            match self.cycle.run().await {
                Ok(summary) => {
                    tracing::info!(?summary, "Completed scheduled data fetch and processing");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Error in scheduled ingestion");
                }
            }
        }
    }
}

/// Daily deletion of points older than `keep_days`
pub fn spawn_retention(db: Arc<Database>, keep_days: i64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(24 * 60 * 60));
        loop {
            ticker.tick().await;
            match db.cleanup(keep_days).await {
                Ok(deleted) => tracing::info!(deleted, keep_days, "Retention cleanup finished"),
                Err(e) => tracing::error!(error = %e, "Retention cleanup failed"),
            }
        }
    })
}
