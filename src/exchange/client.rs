//! Bitget mix-futures REST API client.

use crate::config::BitgetConfig;
use crate::exchange::traits::ExchangeAccount;
use crate::exchange::types::*;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use reqwest::{header::CONTENT_TYPE, Client, Method};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use sha2::Sha256;
use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, instrument, warn};

/// Bounded retry for idempotent reads. Order placement is single-attempt.
const MAX_READ_ATTEMPTS: u32 = 3;

const PRODUCT_TYPE: &str = "umcbl";

/// Bitget API client for USDT-margined futures.
pub struct BitgetClient {
    http: Client,
    api_key: String,
    secret_key: String,
    passphrase: String,
    base_url: String,
    /// Contract used for the balance query (any contract in the margin pool works)
    margin_symbol: String,
    margin_coin: String,
}

impl BitgetClient {
    /// Create a new Bitget client from configuration.
    pub fn new(config: &BitgetConfig, margin_symbol: String, margin_coin: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            secret_key: config.secret_key.clone(),
            passphrase: config.passphrase.clone(),
            base_url: config.base_url.clone(),
            margin_symbol,
            margin_coin,
        })
    }

    /// Sign a request: base64(HMAC-SHA256(secret, timestamp + METHOD + path + body)).
    ///
    /// The path must include the query string; the body is empty for GETs.
    fn sign(&self, timestamp: &str, method: &str, path_with_query: &str, body: &str) -> String {
        let pre_hash = format!("{timestamp}{method}{path_with_query}{body}");
        let mut mac = Hmac::<Sha256>::new_from_slice(self.secret_key.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(pre_hash.as_bytes());
        BASE64.encode(mac.finalize().into_bytes())
    }

    /// Get current timestamp in milliseconds.
    fn timestamp() -> String {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards")
            .as_millis()
            .to_string()
    }

    fn signed_request(
        &self,
        method: Method,
        path_with_query: &str,
        body: Option<String>,
    ) -> reqwest::RequestBuilder {
        let timestamp = Self::timestamp();
        let signature = self.sign(
            &timestamp,
            method.as_str(),
            path_with_query,
            body.as_deref().unwrap_or(""),
        );
        let url = format!("{}{}", self.base_url, path_with_query);

        let mut request = self
            .http
            .request(method, &url)
            .header("ACCESS-KEY", &self.api_key)
            .header("ACCESS-TIMESTAMP", timestamp)
            .header("ACCESS-SIGN", signature)
            .header("ACCESS-PASSPHRASE", &self.passphrase)
            .header(CONTENT_TYPE, "application/json");

        if let Some(body) = body {
            request = request.body(body);
        }

        request
    }

    /// Authenticated GET with bounded retry and backoff.
    async fn get_json<T: DeserializeOwned>(&self, path_with_query: &str) -> Result<ApiResponse<T>> {
        let mut last_error = None;

        for attempt in 1..=MAX_READ_ATTEMPTS {
            let result = async {
                let response = self
                    .signed_request(Method::GET, path_with_query, None)
                    .send()
                    .await
                    .context("Request failed")?;

                response
                    .json::<ApiResponse<T>>()
                    .await
                    .context("Failed to parse response")
            }
            .await;

            match result {
                Ok(response) => return Ok(response),
                Err(e) => {
                    warn!(
                        path = path_with_query,
                        attempt,
                        error = %e,
                        "Authenticated read failed, retrying"
                    );
                    last_error = Some(e);

                    if attempt < MAX_READ_ATTEMPTS {
                        tokio::time::sleep(Duration::from_millis(500 * attempt as u64)).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow!("Unknown error")))
    }
}

#[async_trait]
impl ExchangeAccount for BitgetClient {
    #[instrument(skip(self))]
    async fn available_balance(&self) -> Result<Decimal> {
        let path = format!(
            "/api/mix/v1/account/account?symbol={}&marginCoin={}",
            self.margin_symbol, self.margin_coin
        );

        let response: ApiResponse<AccountData> = self.get_json(&path).await?;
        anyhow::ensure!(
            response.is_ok(),
            "Balance query rejected: {} {}",
            response.code,
            response.msg
        );

        let account = response.data.context("Balance response missing data")?;
        debug!(available = %account.available, "Fetched account balance");
        Ok(account.available)
    }

    #[instrument(skip(self))]
    async fn open_positions(&self) -> Result<HashMap<String, PositionSide>> {
        let path = format!("/api/mix/v1/position/allPosition?productType={PRODUCT_TYPE}");

        let response: ApiResponse<Vec<PositionData>> = self.get_json(&path).await?;
        anyhow::ensure!(
            response.is_ok(),
            "Position query rejected: {} {}",
            response.code,
            response.msg
        );

        let positions = response.data.context("Position response missing data")?;
        Ok(positions
            .into_iter()
            .filter(|p| p.total > Decimal::ZERO)
            .map(|p| (p.symbol, p.hold_side))
            .collect())
    }

    #[instrument(skip(self, order), fields(symbol = %order.symbol, side = %order.side))]
    async fn place_order(&self, order: &OrderRequest) -> Result<OrderAck> {
        let path = "/api/mix/v1/order/placeOrder";
        let body = serde_json::to_string(order).context("Failed to serialize order")?;

        debug!(%body, "Placing market order");

        let response = self
            .signed_request(Method::POST, path, Some(body))
            .send()
            .await
            .context("Order request failed")?;

        let ack: ApiResponse<OrderAck> = response
            .json()
            .await
            .context("Failed to parse order response")?;

        anyhow::ensure!(
            ack.is_ok(),
            "Order rejected: {} {}",
            ack.code,
            ack.msg
        );

        Ok(ack.data.unwrap_or_default())
    }
}
