//! External text classifier integration
//!
//! Talks to a remote sentiment model over HTTP and turns its categorical
//! verdict into a score. Failures never leave this module: the scorer falls
//! back to the lexicon baseline.

use super::{LexiconScorer, SentimentModel};
use crate::config::ClassifierConfig;
use crate::error::{Result, TrackerError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Verdict returned by the remote classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ClassifierVerdict {
    Positive,
    Negative,
    /// Neutral, unknown or missing label
    Other,
}

impl ClassifierVerdict {
    pub fn score(self) -> f64 {
        match self {
            ClassifierVerdict::Positive => 1.0,
            ClassifierVerdict::Negative => -1.0,
            ClassifierVerdict::Other => 0.0,
        }
    }
}

impl From<String> for ClassifierVerdict {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Positive" => ClassifierVerdict::Positive,
            "Negative" => ClassifierVerdict::Negative,
            _ => ClassifierVerdict::Other,
        }
    }
}

// ============ Request/Response types ============

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    sentiment: Option<ClassifierVerdict>,
}

/// Remote text classification capability
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<ClassifierVerdict>;
}

/// HTTP client for a `/predict` style classifier service
pub struct HttpClassifier {
    http: Client,
    endpoint: String,
}

impl HttpClassifier {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    /// Create from config
    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(TrackerError::InvalidConfiguration(
                "classifier endpoint must not be empty".into(),
            ));
        }
        Self::new(
            config.endpoint.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn parse_response(body: &str) -> Result<ClassifierVerdict> {
        let response: PredictResponse = serde_json::from_str(body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            TrackerError::ExternalService(format!(
                "malformed classifier response: {} - response: {}",
                e, preview
            ))
        })?;

        Ok(response.sentiment.unwrap_or(ClassifierVerdict::Other))
    }
}

#[async_trait]
impl TextClassifier for HttpClassifier {
    async fn classify(&self, text: &str) -> Result<ClassifierVerdict> {
        let resp = self
            .http
            .post(&self.endpoint)
            .json(&PredictRequest { text })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TrackerError::ExternalService(format!(
                "classifier returned HTTP {}",
                status
            )));
        }

        let body = resp.text().await?;
        tracing::debug!("Classifier raw response: {}", body.chars().take(200).collect::<String>());
        Self::parse_response(&body)
    }
}

/// Scorer that trusts the remote classifier and falls back to the lexicon
#[derive(Clone)]
pub struct ClassifierScorer {
    classifier: Arc<dyn TextClassifier>,
    fallback: LexiconScorer,
}

impl ClassifierScorer {
    pub fn new(classifier: Arc<dyn TextClassifier>, fallback: LexiconScorer) -> Self {
        Self {
            classifier,
            fallback,
        }
    }
}

#[async_trait]
impl SentimentModel for ClassifierScorer {
    async fn score(&self, text: &str) -> f64 {
        match self.classifier.classify(text).await {
            Ok(verdict) => verdict.score(),
            Err(e) => {
                tracing::warn!(error = %e, "External classifier failed, using lexicon score");
                self.fallback.analyze(text)
            }
        }
    }

    fn name(&self) -> &str {
        "ml"
    }
}
