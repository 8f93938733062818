//! The daily strategy cycle.
//!
//! One invocation: compute the signal, read account state, reconcile, and
//! execute. Every failure path logs and notifies, then hands control back
//! to the scheduler; nothing propagates out of a scheduled run.

use crate::config::StrategyConfig;
use crate::exchange::ExchangeAccount;
use crate::market::MarketDataProvider;
use crate::notify::Notifier;
use crate::strategy::{reconcile, CycleError, OrderExecutor, OrderOutcome, SignalGenerator};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// What a completed cycle did.
#[derive(Debug)]
pub enum CycleOutcome {
    /// Positions already matched the signal; no orders placed.
    NoOp,
    /// A rebalance ran; one outcome per submitted instruction.
    Rebalanced(Vec<OrderOutcome>),
}

/// Owns the collaborators for the signal-to-position loop.
pub struct StrategyRunner<M, E> {
    market: M,
    exchange: E,
    notifier: Arc<dyn Notifier>,
    config: StrategyConfig,
}

impl<M: MarketDataProvider, E: ExchangeAccount> StrategyRunner<M, E> {
    pub fn new(market: M, exchange: E, notifier: Arc<dyn Notifier>, config: StrategyConfig) -> Self {
        Self {
            market,
            exchange,
            notifier,
            config,
        }
    }

    /// Run one scheduled cycle to completion. Never returns an error: a
    /// failed cycle is reported and retried at the next trigger.
    #[instrument(skip(self))]
    pub async fn run_cycle(&self) {
        info!("Starting strategy cycle");

        match self.try_cycle().await {
            Ok(CycleOutcome::NoOp) => {
                info!("Cycle complete: positions already aligned");
            }
            Ok(CycleOutcome::Rebalanced(outcomes)) => {
                let failed = outcomes.iter().filter(|o| !o.success).count();
                info!(
                    orders = outcomes.len(),
                    failed, "Cycle complete: rebalance executed"
                );
            }
            Err(e) => {
                error!(error = %e, "Cycle aborted, no trading action");
                self.notifier
                    .send(&format!("Cycle aborted: {e}. Retrying at the next trigger."))
                    .await;
            }
        }
    }

    async fn try_cycle(&self) -> Result<CycleOutcome, CycleError> {
        let signal = SignalGenerator::new(&self.market, &self.config)
            .compute()
            .await?;
        self.notifier
            .send(&signal.describe(
                &self.config.leg_a.market_symbol,
                &self.config.leg_b.market_symbol,
                self.config.ema_span,
            ))
            .await;

        let positions = self
            .exchange
            .open_positions()
            .await
            .map_err(|e| CycleError::AccountUnavailable(format!("positions: {e:#}")))?;
        self.notifier
            .send(&format!("Current positions: {positions:?}"))
            .await;

        let capital = self
            .exchange
            .available_balance()
            .await
            .map_err(|e| CycleError::AccountUnavailable(format!("balance: {e:#}")))?;
        self.notifier
            .send(&format!("Balance {}: {capital}", self.config.margin_coin))
            .await;

        let plan = reconcile(
            &signal,
            &positions,
            capital,
            &self.config.leg_a,
            &self.config.leg_b,
        );
        if plan.is_empty() {
            let note = "Signal unchanged, positions already aligned. No orders to place.";
            info!("{note}");
            self.notifier.send(note).await;
            return Ok(CycleOutcome::NoOp);
        }

        let executor = OrderExecutor::new(&self.exchange, self.notifier.as_ref(), &self.config);
        Ok(CycleOutcome::Rebalanced(executor.execute(&plan).await))
    }
}
