//! Desired-vs-actual position reconciliation.
//!
//! Compares the signal's implied portfolio against the exchange-reported
//! position sides and produces the corrective order plan. When every leg
//! already holds its target side the plan is empty, which makes the daily
//! cycle idempotent across the startup double-trigger.

use crate::config::LegConfig;
use crate::exchange::PositionSide;
use crate::strategy::Signal;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Target state for one leg after the rebalance.
#[derive(Debug, Clone)]
pub struct LegTarget {
    pub contract: String,
    pub side: PositionSide,
    /// Order size in base units, rounded to the contract's lot precision
    pub size: Decimal,
    /// Notional exposure in the margin coin
    pub exposure: Decimal,
    /// Live price used for sizing
    pub price: Decimal,
}

/// Instruction to flatten a currently held position.
#[derive(Debug, Clone)]
pub struct CloseInstruction {
    pub contract: String,
    pub held: PositionSide,
    /// Sized from the newly computed target, not the held amount
    pub size: Decimal,
    pub price: Decimal,
}

/// Ordered plan: close phase first, then open phase.
#[derive(Debug, Clone)]
pub struct ReconcilePlan {
    pub closes: Vec<CloseInstruction>,
    pub opens: Vec<LegTarget>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.closes.is_empty() && self.opens.is_empty()
    }

    fn empty() -> Self {
        Self {
            closes: Vec::new(),
            opens: Vec::new(),
        }
    }
}

fn leg_target(leg: &LegConfig, weight: Decimal, capital: Decimal, price: Decimal) -> LegTarget {
    let side = if weight > Decimal::ZERO {
        PositionSide::Long
    } else {
        PositionSide::Short
    };

    let exposure = weight.abs() * capital;
    let size = if price.is_zero() {
        Decimal::ZERO
    } else {
        (exposure / price).round_dp(leg.size_precision)
    };

    LegTarget {
        contract: leg.contract_symbol.clone(),
        side,
        size,
        exposure,
        price,
    }
}

/// Compute the corrective plan for the current cycle.
///
/// No-op rule: if both legs already hold their target side, nothing is
/// closed or opened. Otherwise every currently held leg is closed and both
/// legs are reopened at target side and size, even a leg whose side did not
/// change.
///
/// Close orders are sized from the newly computed target notional rather
/// than the held amount. That can under- or over-close when the two diverge;
/// the behavior is intentional and the residual washes out on the next
/// cycle's reconciliation.
pub fn reconcile(
    signal: &Signal,
    current: &HashMap<String, PositionSide>,
    capital: Decimal,
    leg_a: &LegConfig,
    leg_b: &LegConfig,
) -> ReconcilePlan {
    let targets = [
        leg_target(leg_a, signal.weight_a, capital, signal.price_a),
        leg_target(leg_b, signal.weight_b, capital, signal.price_b),
    ];

    let aligned = targets
        .iter()
        .all(|t| current.get(&t.contract) == Some(&t.side));
    if aligned {
        return ReconcilePlan::empty();
    }

    let closes = targets
        .iter()
        .filter_map(|t| {
            current.get(&t.contract).map(|held| CloseInstruction {
                contract: t.contract.clone(),
                held: *held,
                size: t.size,
                price: t.price,
            })
        })
        .collect();

    ReconcilePlan {
        closes,
        opens: targets.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StrategyConfig;
    use crate::strategy::Direction;
    use rust_decimal_macros::dec;

    fn long_a_signal(price_a: Decimal, price_b: Decimal) -> Signal {
        Signal {
            direction: Direction::LongAShortB,
            weight_a: dec!(0.75),
            weight_b: dec!(-0.75),
            price_a,
            price_b,
            live_ratio: price_a / price_b,
            baseline: dec!(20),
        }
    }

    fn legs() -> (LegConfig, LegConfig) {
        let config = StrategyConfig::default();
        (config.leg_a, config.leg_b)
    }

    #[test]
    fn test_sizing_from_weight_capital_and_price() {
        let (leg_a, _) = legs();
        let target = leg_target(&leg_a, dec!(0.75), dec!(1000), dec!(50000));
        assert_eq!(target.exposure, dec!(750));
        assert_eq!(target.size, dec!(0.015));
        assert_eq!(target.side, PositionSide::Long);
    }

    #[test]
    fn test_sizing_respects_leg_precision() {
        let (leg_a, leg_b) = legs();
        // 750 / 42123 = 0.01780499... -> 4 decimals on leg A
        let a = leg_target(&leg_a, dec!(0.75), dec!(1000), dec!(42123));
        assert_eq!(a.size, dec!(0.0178));
        // 750 / 23.17 = 32.3694... -> 2 decimals on leg B
        let b = leg_target(&leg_b, dec!(-0.75), dec!(1000), dec!(23.17));
        assert_eq!(b.size, dec!(32.37));
        assert_eq!(b.side, PositionSide::Short);
    }

    #[test]
    fn test_aligned_positions_yield_empty_plan() {
        let (leg_a, leg_b) = legs();
        let signal = long_a_signal(dec!(50000), dec!(2000));

        let mut current = HashMap::new();
        current.insert(leg_a.contract_symbol.clone(), PositionSide::Long);
        current.insert(leg_b.contract_symbol.clone(), PositionSide::Short);

        let plan = reconcile(&signal, &current, dec!(1000), &leg_a, &leg_b);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let (leg_a, leg_b) = legs();
        let signal = long_a_signal(dec!(50000), dec!(2000));

        let mut current = HashMap::new();
        current.insert(leg_a.contract_symbol.clone(), PositionSide::Long);
        current.insert(leg_b.contract_symbol.clone(), PositionSide::Short);

        // Repeated calls with unchanged inputs keep producing no orders.
        for _ in 0..3 {
            let plan = reconcile(&signal, &current, dec!(1000), &leg_a, &leg_b);
            assert!(plan.is_empty());
        }
    }

    #[test]
    fn test_flat_account_opens_both_legs_without_closes() {
        let (leg_a, leg_b) = legs();
        let signal = long_a_signal(dec!(50000), dec!(2000));

        let plan = reconcile(&signal, &HashMap::new(), dec!(1000), &leg_a, &leg_b);
        assert!(plan.closes.is_empty());
        assert_eq!(plan.opens.len(), 2);
        assert_eq!(plan.opens[0].side, PositionSide::Long);
        assert_eq!(plan.opens[1].side, PositionSide::Short);
    }

    #[test]
    fn test_misaligned_leg_closes_held_legs_and_reopens_both() {
        let (leg_a, leg_b) = legs();
        let signal = long_a_signal(dec!(50000), dec!(2000));

        // A is on the wrong side; B already matches but is reopened anyway.
        let mut current = HashMap::new();
        current.insert(leg_a.contract_symbol.clone(), PositionSide::Short);
        current.insert(leg_b.contract_symbol.clone(), PositionSide::Short);

        let plan = reconcile(&signal, &current, dec!(1000), &leg_a, &leg_b);

        assert_eq!(plan.closes.len(), 2);
        assert_eq!(plan.closes[0].contract, leg_a.contract_symbol);
        assert_eq!(plan.closes[0].held, PositionSide::Short);
        assert_eq!(plan.opens.len(), 2);
        assert_eq!(plan.opens[0].side, PositionSide::Long);
        assert_eq!(plan.opens[1].side, PositionSide::Short);
    }

    #[test]
    fn test_close_size_comes_from_new_target() {
        let (leg_a, leg_b) = legs();
        let signal = long_a_signal(dec!(50000), dec!(2000));

        let mut current = HashMap::new();
        current.insert(leg_a.contract_symbol.clone(), PositionSide::Short);

        // Whatever was actually held, the close order carries the freshly
        // computed target size: 0.75 * 1000 / 50000 = 0.015.
        let plan = reconcile(&signal, &current, dec!(1000), &leg_a, &leg_b);
        assert_eq!(plan.closes[0].size, dec!(0.015));
    }

    #[test]
    fn test_zero_capital_produces_zero_sizes() {
        let (leg_a, leg_b) = legs();
        let signal = long_a_signal(dec!(50000), dec!(2000));

        let plan = reconcile(&signal, &HashMap::new(), Decimal::ZERO, &leg_a, &leg_b);
        assert!(plan.opens.iter().all(|t| t.size.is_zero()));
    }
}
