//! # Pair Trader
//!
//! A daily-rebalanced two-asset pair trading agent for Bitget USDT-M
//! futures, signaled from the Binance spot price ratio.
//!
//! ## Architecture
//!
//! - `config`: Configuration management and validation
//! - `market`: Binance spot market data (daily klines, live tickers)
//! - `exchange`: Bitget signed REST client (balance, positions, orders)
//! - `strategy`: Signal generation, reconciliation, and order execution
//! - `notify`: Fire-and-forget Discord notifications
//! - `scheduler`: Once-daily trigger loop

pub mod config;
pub mod exchange;
pub mod market;
pub mod notify;
pub mod scheduler;
pub mod strategy;

pub use config::Config;
