//! Error types for the sentiment tracker

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Insufficient data: required {required} points, available {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Empty input: statistics require at least one value")]
    EmptyInput,

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Timed out after {secs} seconds: {operation}")]
    Timeout { operation: String, secs: u64 },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TrackerError {
    /// True for errors caused by the caller's request rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TrackerError::InsufficientData { .. } | TrackerError::InvalidInput(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
