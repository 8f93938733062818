//! Configuration management for the pair trader.
//!
//! Loads settings from environment variables and config files.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Bitget API credentials
    #[serde(default)]
    pub bitget: BitgetConfig,
    /// Signal and sizing parameters
    #[serde(default)]
    pub strategy: StrategyConfig,
    /// Discord notification settings
    #[serde(default)]
    pub notify: NotifyConfig,
    /// Daily trigger time
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BitgetConfig {
    /// API key for authentication
    #[serde(default)]
    pub api_key: String,
    /// Secret key for signing requests
    #[serde(default)]
    pub secret_key: String,
    /// Account passphrase sent alongside the signature
    #[serde(default)]
    pub passphrase: String,
    /// REST endpoint base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// One leg of the pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegConfig {
    /// Spot symbol on the market-data source (e.g., "BTCUSDT")
    pub market_symbol: String,
    /// USDT-M futures contract on Bitget (e.g., "BTCUSDT_UMCBL")
    pub contract_symbol: String,
    /// Decimal places allowed for order sizes on this contract
    pub size_precision: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// First leg (ratio numerator)
    #[serde(default = "default_leg_a")]
    pub leg_a: LegConfig,
    /// Second leg (ratio denominator)
    #[serde(default = "default_leg_b")]
    pub leg_b: LegConfig,
    /// Fraction of available capital allocated per leg (0.0-1.0)
    #[serde(default = "default_exposure_fraction")]
    pub exposure_fraction: Decimal,
    /// Margin multiplier applied to every order
    #[serde(default = "default_leverage")]
    pub leverage: u8,
    /// EWMA smoothing span over the daily ratio series, in days
    #[serde(default = "default_ema_span")]
    pub ema_span: u32,
    /// Maximum number of daily bars fetched per leg
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,
    /// Margin coin for the futures account
    #[serde(default = "default_margin_coin")]
    pub margin_coin: String,
    /// Delay between the close and open phases, in seconds
    #[serde(default = "default_settlement_pause_secs")]
    pub settlement_pause_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Discord webhook URL; notifications are dropped when unset
    #[serde(default)]
    pub discord_webhook: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Hour of the daily trigger (UTC)
    #[serde(default)]
    pub run_hour: u32,
    /// Minute of the daily trigger (UTC)
    #[serde(default)]
    pub run_minute: u32,
}

// Default value functions
fn default_base_url() -> String {
    "https://api.bitget.com".to_string()
}

fn default_leg_a() -> LegConfig {
    LegConfig {
        market_symbol: "BTCUSDT".to_string(),
        contract_symbol: "BTCUSDT_UMCBL".to_string(),
        size_precision: 4,
    }
}

fn default_leg_b() -> LegConfig {
    LegConfig {
        market_symbol: "AVAXUSDT".to_string(),
        contract_symbol: "AVAXUSDT_UMCBL".to_string(),
        size_precision: 2,
    }
}

fn default_exposure_fraction() -> Decimal {
    Decimal::new(75, 2) // 0.75
}

fn default_leverage() -> u8 {
    2
}

fn default_ema_span() -> u32 {
    6
}

fn default_history_limit() -> u32 {
    1000
}

fn default_margin_coin() -> String {
    "USDT".to_string()
}

fn default_settlement_pause_secs() -> u64 {
    1
}

impl Config {
    /// Load configuration from environment variables and config files.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::default().separator("__").prefix("PAIR"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.strategy.exposure_fraction > Decimal::ZERO
                && self.strategy.exposure_fraction <= Decimal::ONE,
            "exposure_fraction must be between 0 and 1"
        );

        anyhow::ensure!(self.strategy.leverage >= 1, "leverage must be >= 1");

        anyhow::ensure!(self.strategy.ema_span >= 2, "ema_span must be >= 2");

        anyhow::ensure!(
            self.strategy.history_limit >= self.strategy.ema_span,
            "history_limit must cover at least one ema_span"
        );

        anyhow::ensure!(
            self.schedule.run_hour < 24 && self.schedule.run_minute < 60,
            "schedule time must be a valid wall-clock time"
        );

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bitget: BitgetConfig::default(),
            strategy: StrategyConfig::default(),
            notify: NotifyConfig::default(),
            schedule: ScheduleConfig::default(),
        }
    }
}

impl Default for BitgetConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            secret_key: String::new(),
            passphrase: String::new(),
            base_url: default_base_url(),
        }
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            leg_a: default_leg_a(),
            leg_b: default_leg_b(),
            exposure_fraction: default_exposure_fraction(),
            leverage: default_leverage(),
            ema_span: default_ema_span(),
            history_limit: default_history_limit(),
            margin_coin: default_margin_coin(),
            settlement_pause_secs: default_settlement_pause_secs(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            run_hour: 0,
            run_minute: 0,
        }
    }
}
