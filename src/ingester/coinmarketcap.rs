//! CoinMarketCap price quotes

use super::{preview, PriceSource};
use crate::config::{CoinConfig, CoinMarketCapConfig};
use crate::error::{Result, TrackerError};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const QUOTES_PATH: &str = "/v1/cryptocurrency/quotes/latest";

#[derive(Debug, Deserialize)]
struct QuotesResponse {
    #[serde(default)]
    data: HashMap<String, QuoteEntry>,
}

#[derive(Debug, Deserialize)]
struct QuoteEntry {
    quote: HashMap<String, Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    price: Option<f64>,
}

pub struct CoinMarketCapClient {
    http: Client,
    base_url: String,
    api_key: String,
    convert: String,
}

impl CoinMarketCapClient {
    pub fn new(config: &CoinMarketCapConfig, convert: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            convert: convert.to_uppercase(),
        })
    }

    /// Map a quotes payload to coin id -> price
    fn extract_prices(
        &self,
        response: QuotesResponse,
        coins: &[CoinConfig],
    ) -> HashMap<String, Decimal> {
        let mut prices = HashMap::new();

        for coin in coins {
            let symbol = coin.symbol.to_uppercase();
            let price = response
                .data
                .get(&symbol)
                .and_then(|entry| entry.quote.get(&self.convert))
                .and_then(|quote| quote.price)
                .and_then(|p| Decimal::try_from(p).ok())
                .filter(|p| *p > Decimal::ZERO);

            match price {
                Some(price) => {
                    prices.insert(coin.id.clone(), price);
                }
                None => {
                    tracing::warn!(coin = %coin.id, symbol = %symbol, "No {} quote in response", self.convert);
                }
            }
        }

        prices
    }
}

#[async_trait]
impl PriceSource for CoinMarketCapClient {
    fn name(&self) -> &str {
        "coinmarketcap"
    }

    async fn fetch_prices(&self, coins: &[CoinConfig]) -> Result<HashMap<String, Decimal>> {
        let symbols = coins
            .iter()
            .map(|c| c.symbol.to_uppercase())
            .collect::<Vec<_>>()
            .join(",");

        let resp = self
            .http
            .get(format!("{}{}", self.base_url, QUOTES_PATH))
            .header("X-CMC_PRO_API_KEY", &self.api_key)
            .header("Accept", "application/json")
            .query(&[("symbol", symbols.as_str()), ("convert", self.convert.as_str())])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(TrackerError::ExternalService(format!(
                "CoinMarketCap returned HTTP {}: {}",
                status,
                preview(&body)
            )));
        }

        let response: QuotesResponse = serde_json::from_str(&body).map_err(|e| {
            TrackerError::ExternalService(format!(
                "malformed CoinMarketCap response: {} - response: {}",
                e,
                preview(&body)
            ))
        })?;

        Ok(self.extract_prices(response, coins))
    }
}
