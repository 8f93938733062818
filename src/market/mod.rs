//! Public market data sources.
//!
//! Historical daily closes and live spot prices come from Binance, which has
//! deeper spot liquidity than the execution venue. Fetches are fresh on every
//! cycle; nothing is cached.

mod binance;

pub use binance::BinanceMarketData;

use async_trait::async_trait;
use rust_decimal::Decimal;

/// One daily bar. Only the close participates in the signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candle {
    /// Bar open time, epoch milliseconds
    pub open_time: i64,
    pub close: Decimal,
}

/// Read-only market data capability.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Daily closing prices in chronological order, at most `limit` bars.
    async fn daily_closes(&self, symbol: &str, limit: u32) -> anyhow::Result<Vec<Candle>>;

    /// Latest traded price for the symbol.
    async fn live_price(&self, symbol: &str) -> anyhow::Result<Decimal>;
}
