//! Two-phase order execution.
//!
//! Close phase, settlement pause, open phase. Each order is best-effort:
//! a rejection is notified and the remaining orders still go out, because
//! the next daily cycle re-reconciles from the exchange's actual state.

use crate::config::StrategyConfig;
use crate::exchange::{ExchangeAccount, OrderRequest, OrderSide, OrderType};
use crate::notify::Notifier;
use crate::strategy::ReconcilePlan;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{error, info, warn};

/// Result of a single order submission.
#[derive(Debug, Clone)]
pub struct OrderOutcome {
    pub symbol: String,
    pub side: OrderSide,
    pub size: Decimal,
    pub success: bool,
    pub error: Option<String>,
}

/// Submits the reconcile plan as market orders.
pub struct OrderExecutor<'a, E: ExchangeAccount> {
    exchange: &'a E,
    notifier: &'a dyn Notifier,
    margin_coin: String,
    leverage: u8,
    settlement_pause: Duration,
}

impl<'a, E: ExchangeAccount> OrderExecutor<'a, E> {
    pub fn new(exchange: &'a E, notifier: &'a dyn Notifier, config: &StrategyConfig) -> Self {
        Self {
            exchange,
            notifier,
            margin_coin: config.margin_coin.clone(),
            leverage: config.leverage,
            settlement_pause: Duration::from_secs(config.settlement_pause_secs),
        }
    }

    /// Run the plan: close every held leg, pause for settlement, then open
    /// both target legs. Returns one outcome per submitted instruction.
    pub async fn execute(&self, plan: &ReconcilePlan) -> Vec<OrderOutcome> {
        let mut outcomes = Vec::with_capacity(plan.closes.len() + plan.opens.len());

        for close in &plan.closes {
            let note = format!("Closing {} {}", close.contract, close.held);
            info!("{note}");
            self.notifier.send(&note).await;

            outcomes.push(
                self.submit(
                    &close.contract,
                    OrderSide::close_for(close.held),
                    close.size,
                    close.price,
                )
                .await,
            );
        }

        if !plan.opens.is_empty() {
            // Heuristic settlement pause; closes are not polled for
            // confirmation before the opens go out.
            tokio::time::sleep(self.settlement_pause).await;

            let summary = plan
                .opens
                .iter()
                .map(|t| {
                    format!(
                        "{} size: {} (expo: {} {})",
                        t.contract,
                        t.size,
                        t.exposure.round_dp(2),
                        self.margin_coin
                    )
                })
                .collect::<Vec<_>>()
                .join(" | ");
            self.notifier.send(&format!("Opening {summary}")).await;

            for target in &plan.opens {
                outcomes.push(
                    self.submit(
                        &target.contract,
                        OrderSide::open_for(target.side),
                        target.size,
                        target.price,
                    )
                    .await,
                );
            }
        }

        outcomes
    }

    /// Submit one market order. Zero-size orders are rejected locally
    /// instead of being sent to the exchange.
    async fn submit(
        &self,
        symbol: &str,
        side: OrderSide,
        size: Decimal,
        price: Decimal,
    ) -> OrderOutcome {
        if size <= Decimal::ZERO {
            let detail = "zero order size".to_string();
            warn!(%symbol, %side, "Skipping order: {detail}");
            self.notifier
                .send(&format!("Skipped {side} {symbol}: {detail}"))
                .await;
            return OrderOutcome {
                symbol: symbol.to_string(),
                side,
                size,
                success: false,
                error: Some(detail),
            };
        }

        let order = OrderRequest {
            symbol: symbol.to_string(),
            margin_coin: self.margin_coin.clone(),
            size,
            side,
            order_type: OrderType::Market,
            leverage: self.leverage,
        };

        match self.exchange.place_order(&order).await {
            Ok(_) => {
                let note = format!("{side} {symbol}: size={size}, price={price}");
                info!("{note}");
                self.notifier.send(&note).await;
                OrderOutcome {
                    symbol: symbol.to_string(),
                    side,
                    size,
                    success: true,
                    error: None,
                }
            }
            Err(e) => {
                let note = format!("Order failed for {symbol}: {e:#}");
                error!("{note}");
                self.notifier.send(&note).await;
                OrderOutcome {
                    symbol: symbol.to_string(),
                    side,
                    size,
                    success: false,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}
