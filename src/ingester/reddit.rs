//! Reddit search client
//!
//! Application-only OAuth: a client-credentials token is requested for every
//! search, then posts from the last day are fetched sorted by score.

use super::{preview, PostSource, RawPost};
use crate::config::RedditConfig;
use crate::error::{Result, TrackerError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: RawPost,
}

pub struct RedditClient {
    http: Client,
    config: RedditConfig,
    limit: u32,
}

impl RedditClient {
    pub fn new(config: RedditConfig, limit: u32, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            config,
            limit,
        })
    }

    async fn access_token(&self) -> Result<String> {
        if self.config.client_id.is_empty() {
            return Err(TrackerError::InvalidConfiguration(
                "reddit.client_id is not set".into(),
            ));
        }

        let resp = self
            .http
            .post(&self.config.auth_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(TrackerError::ExternalService(format!(
                "Reddit token request returned HTTP {}: {}",
                status,
                preview(&body)
            )));
        }

        let token: TokenResponse = serde_json::from_str(&body)?;
        Ok(token.access_token)
    }

    fn parse_listing(body: &str) -> Result<Vec<RawPost>> {
        let listing: Listing = serde_json::from_str(body).map_err(|e| {
            TrackerError::ExternalService(format!(
                "malformed Reddit listing: {} - response: {}",
                e,
                preview(body)
            ))
        })?;

        Ok(listing.data.children.into_iter().map(|c| c.data).collect())
    }
}

#[async_trait]
impl PostSource for RedditClient {
    fn name(&self) -> &str {
        "reddit"
    }

    async fn fetch_posts(&self, query: &str) -> Result<Vec<RawPost>> {
        let token = self.access_token().await?;
        let limit = self.limit.to_string();

        let resp = self
            .http
            .get(format!("{}/search", self.config.api_url.trim_end_matches('/')))
            .bearer_auth(token)
            .query(&[
                ("q", query),
                ("sort", "top"),
                ("t", "day"),
                ("limit", limit.as_str()),
                ("type", "link"),
            ])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(TrackerError::ExternalService(format!(
                "Reddit search returned HTTP {}: {}",
                status,
                preview(&body)
            )));
        }

        let posts = Self::parse_listing(&body)?;
        tracing::debug!(query, count = posts.len(), "Fetched Reddit posts");
        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing() {
        let body = r#"{
            "kind": "Listing",
            "data": {
                "after": null,
                "children": [
                    {"kind": "t3", "data": {
                        "id": "1abc",
                        "title": "Bitcoin breaks resistance",
                        "selftext": "bullish on the weekly",
                        "score": 1520,
                        "url": "https://www.reddit.com/r/Bitcoin/comments/1abc/",
                        "subreddit": "Bitcoin",
                        "created_utc": 1718450000.0
                    }},
                    {"kind": "t3", "data": {"id": "2def", "title": "Daily discussion"}}
                ]
            }
        }"#;

        let posts = RedditClient::parse_listing(body).unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, "1abc");
        assert_eq!(posts[0].score, 1520);
        assert_eq!(posts[0].subreddit.as_deref(), Some("Bitcoin"));
        assert_eq!(posts[1].selftext, "");
        assert!(posts[1].created_utc.is_none());
    }

    #[test]
    fn test_parse_listing_malformed() {
        let err = RedditClient::parse_listing(r#"{"error": 401}"#).unwrap_err();
        assert!(matches!(err, TrackerError::ExternalService(_)));
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let client =
            RedditClient::new(RedditConfig::default(), 25, Duration::from_secs(5)).unwrap();
        let err = client.fetch_posts("bitcoin").await.unwrap_err();
        assert!(matches!(err, TrackerError::InvalidConfiguration(_)));
    }
}
