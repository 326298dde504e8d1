//! Crypto Sentiment Tracker
//!
//! Scores crypto discussion posts with a lexicon, an external classifier and a
//! hybrid of both, stores per-coin sentiment and price time series, and
//! analyzes how sentiment tracks price.

pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod ingester;
pub mod sentiment;
pub mod storage;
pub mod types;
