//! Binance spot market data client.

use crate::market::{Candle, MarketDataProvider};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;
use tracing::{instrument, warn};

const BASE_URL: &str = "https://api.binance.com";

/// Reads are idempotent, so transient failures get a bounded retry.
const MAX_ATTEMPTS: u32 = 3;

/// Live ticker price payload.
#[derive(Debug, Clone, Deserialize)]
struct TickerPrice {
    #[allow(dead_code)]
    symbol: String,
    #[serde(with = "rust_decimal::serde::str")]
    price: Decimal,
}

/// Unauthenticated client for Binance spot klines and ticker prices.
pub struct BinanceMarketData {
    http: Client,
    base_url: String,
}

impl BinanceMarketData {
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url: BASE_URL.to_string(),
        })
    }

    #[cfg(test)]
    fn with_base_url(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.to_string(),
        }
    }

    /// GET with bounded retry and linear backoff.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut last_error = None;

        for attempt in 1..=MAX_ATTEMPTS {
            let result = async {
                let response = self
                    .http
                    .get(url)
                    .send()
                    .await
                    .context("Request failed")?
                    .error_for_status()
                    .context("Server returned an error status")?;

                response.json::<T>().await.context("Failed to parse response")
            }
            .await;

            match result {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!(url, attempt, error = %e, "Market data fetch failed, retrying");
                    last_error = Some(e);

                    if attempt < MAX_ATTEMPTS {
                        tokio::time::sleep(Duration::from_millis(500 * attempt as u64)).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow!("Unknown error")))
    }
}

/// A kline row is a heterogeneous JSON array; index 0 is the open time and
/// index 4 the close price as a string.
fn parse_kline_row(row: &Value) -> Result<Candle> {
    let open_time = row
        .get(0)
        .and_then(Value::as_i64)
        .context("Kline row missing open time")?;

    let close = row
        .get(4)
        .and_then(Value::as_str)
        .context("Kline row missing close price")?;
    let close = Decimal::from_str(close).context("Invalid close price")?;

    Ok(Candle { open_time, close })
}

#[async_trait]
impl MarketDataProvider for BinanceMarketData {
    #[instrument(skip(self))]
    async fn daily_closes(&self, symbol: &str, limit: u32) -> Result<Vec<Candle>> {
        let url = format!(
            "{}/api/v3/klines?symbol={}&interval=1d&limit={}",
            self.base_url, symbol, limit
        );

        let rows: Vec<Value> = self.get_json(&url).await?;
        rows.iter().map(parse_kline_row).collect()
    }

    #[instrument(skip(self))]
    async fn live_price(&self, symbol: &str) -> Result<Decimal> {
        let url = format!("{}/api/v3/ticker/price?symbol={}", self.base_url, symbol);

        let ticker: TickerPrice = self.get_json(&url).await?;
        Ok(ticker.price)
    }
}
