//! Exchange integration for the pair trader.
//!
//! ## Bitget
//! Authenticated REST access to USDT-margined futures:
//! - Account balance and open position queries
//! - Market order placement with signed requests

mod client;
pub mod mock;
mod traits;
mod types;

pub use client::BitgetClient;
pub use mock::MockExchange;
pub use traits::ExchangeAccount;
pub use types::*;
