//! Exchange-agnostic account capability.
//!
//! The strategy layer only needs three operations: read the free balance,
//! read the open position sides, and submit an order. Keeping them behind a
//! trait lets tests substitute a scripted exchange for the live client.

use crate::exchange::types::{OrderAck, OrderRequest, PositionSide};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Authenticated account operations on a derivatives exchange.
#[async_trait]
pub trait ExchangeAccount: Send + Sync {
    /// Available balance in the configured margin coin.
    ///
    /// An error means the balance could not be read; callers must not treat
    /// that as a zero balance.
    async fn available_balance(&self) -> anyhow::Result<Decimal>;

    /// Side of every position with nonzero size, keyed by contract symbol.
    ///
    /// Flat symbols are omitted from the map entirely.
    async fn open_positions(&self) -> anyhow::Result<HashMap<String, PositionSide>>;

    /// Submit a single order. One attempt only; a rejected or failed order
    /// is reported to the caller, never retried here.
    async fn place_order(&self, order: &OrderRequest) -> anyhow::Result<OrderAck>;
}
