//! Fire-and-forget notifications.
//!
//! Delivery failures are logged and swallowed; a dead webhook must never
//! block or abort a trading cycle.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Text message sink.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str);
}

/// Posts messages to a Discord webhook.
pub struct DiscordNotifier {
    http: Client,
    webhook_url: String,
}

impl DiscordNotifier {
    pub fn new(webhook_url: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { http, webhook_url })
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, message: &str) {
        let result = self
            .http
            .post(&self.webhook_url)
            .json(&json!({ "content": message }))
            .send()
            .await;

        match result {
            Ok(response) if !response.status().is_success() => {
                warn!(status = %response.status(), "Discord webhook returned an error");
            }
            Err(e) => {
                warn!(error = %e, "Failed to deliver Discord notification");
            }
            Ok(_) => {}
        }
    }
}

/// Drops every message. Used when no webhook is configured.
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn send(&self, _message: &str) {}
}

/// Build the notifier from configuration.
pub fn from_config(config: &crate::config::NotifyConfig) -> Result<Arc<dyn Notifier>> {
    match &config.discord_webhook {
        Some(url) if !url.is_empty() => Ok(Arc::new(DiscordNotifier::new(url.clone())?)),
        _ => {
            warn!("No Discord webhook configured, notifications disabled");
            Ok(Arc::new(NullNotifier))
        }
    }
}
