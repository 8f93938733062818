//! Trading strategy implementation.
//!
//! Contains the core logic for:
//! - Ratio-momentum signal generation over the pair
//! - Reconciling desired vs. exchange-reported positions
//! - Two-phase close/open order execution
//! - The daily cycle tying it all together

mod executor;
mod reconciler;
mod runner;
mod signal;

pub use executor::{OrderExecutor, OrderOutcome};
pub use reconciler::{reconcile, CloseInstruction, LegTarget, ReconcilePlan};
pub use runner::{CycleOutcome, StrategyRunner};
pub use signal::{ewma, Direction, Signal, SignalGenerator};

use thiserror::Error;

/// Failures that abort a cycle before any order is placed.
///
/// Order-level failures are not cycle errors; they surface as unsuccessful
/// [`OrderOutcome`]s and the next daily cycle re-reconciles from the
/// exchange's actual state.
#[derive(Debug, Error)]
pub enum CycleError {
    /// Market data could not be fetched or was unusable. No trading action.
    #[error("market data unavailable: {0}")]
    DataUnavailable(String),
    /// Balance or positions could not be read. No trading action; a missing
    /// balance is never treated as zero capital.
    #[error("account state unavailable: {0}")]
    AccountUnavailable(String),
}
