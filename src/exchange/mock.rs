//! Scripted exchange account for tests and dry runs.

use crate::exchange::traits::ExchangeAccount;
use crate::exchange::types::{OrderAck, OrderRequest, PositionSide};
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// In-memory exchange that records every submitted order.
///
/// Balance `None` simulates an unreadable account; `reject_orders` makes
/// every submission fail the way the live exchange rejects an order.
pub struct MockExchange {
    balance: RwLock<Option<Decimal>>,
    positions: RwLock<HashMap<String, PositionSide>>,
    orders: RwLock<Vec<OrderRequest>>,
    fail_position_read: AtomicBool,
    reject_orders: AtomicBool,
}

impl MockExchange {
    pub fn new(balance: Decimal) -> Self {
        Self {
            balance: RwLock::new(Some(balance)),
            positions: RwLock::new(HashMap::new()),
            orders: RwLock::new(Vec::new()),
            fail_position_read: AtomicBool::new(false),
            reject_orders: AtomicBool::new(false),
        }
    }

    /// Make `available_balance` fail on every call.
    pub async fn set_balance_unavailable(&self) {
        *self.balance.write().await = None;
    }

    pub async fn set_position(&self, symbol: &str, side: PositionSide) {
        self.positions
            .write()
            .await
            .insert(symbol.to_string(), side);
    }

    pub fn set_position_read_failure(&self, fail: bool) {
        self.fail_position_read.store(fail, Ordering::SeqCst);
    }

    pub fn set_reject_orders(&self, reject: bool) {
        self.reject_orders.store(reject, Ordering::SeqCst);
    }

    /// Orders submitted so far, in submission order.
    pub async fn submitted_orders(&self) -> Vec<OrderRequest> {
        self.orders.read().await.clone()
    }
}

#[async_trait]
impl ExchangeAccount for MockExchange {
    async fn available_balance(&self) -> Result<Decimal> {
        (*self.balance.read().await).ok_or_else(|| anyhow!("balance unavailable"))
    }

    async fn open_positions(&self) -> Result<HashMap<String, PositionSide>> {
        if self.fail_position_read.load(Ordering::SeqCst) {
            bail!("position read failed");
        }
        Ok(self.positions.read().await.clone())
    }

    async fn place_order(&self, order: &OrderRequest) -> Result<OrderAck> {
        self.orders.write().await.push(order.clone());
        if self.reject_orders.load(Ordering::SeqCst) {
            bail!("Order rejected: 40786 scripted rejection");
        }
        Ok(OrderAck {
            order_id: Some(format!("mock-{}", self.orders.read().await.len())),
            client_oid: None,
        })
    }
}
