//! Pair signal from the smoothed price ratio.
//!
//! The ratio of the two legs' daily closes is smoothed with an EWMA; the
//! live ratio against that baseline picks which leg is long and which is
//! short. Weights are fixed-magnitude, opposite-signed fractions of capital.

use crate::config::StrategyConfig;
use crate::market::{Candle, MarketDataProvider};
use crate::strategy::CycleError;
use rust_decimal::Decimal;
use tracing::debug;

/// Which leg of the pair is long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    LongAShortB,
    ShortALongB,
}

/// Computed pair signal, recomputed fresh every cycle.
#[derive(Debug, Clone)]
pub struct Signal {
    pub direction: Direction,
    /// Signed capital fraction for leg A
    pub weight_a: Decimal,
    /// Signed capital fraction for leg B
    pub weight_b: Decimal,
    /// Live price of leg A observed while computing the signal
    pub price_a: Decimal,
    /// Live price of leg B observed while computing the signal
    pub price_b: Decimal,
    pub live_ratio: Decimal,
    /// Final EWMA value of the historical ratio
    pub baseline: Decimal,
}

impl Signal {
    /// Human-readable summary for the notification channel.
    pub fn describe(&self, symbol_a: &str, symbol_b: &str, span: u32) -> String {
        let label = match self.direction {
            Direction::LongAShortB => format!("Long {symbol_a} / Short {symbol_b}"),
            Direction::ShortALongB => format!("Short {symbol_a} / Long {symbol_b}"),
        };
        format!(
            "Signal: {label} | {symbol_a}={} | {symbol_b}={} | Ratio={} | EMA{span}d={}",
            self.price_a.round_dp(2),
            self.price_b.round_dp(2),
            self.live_ratio.round_dp(4),
            self.baseline.round_dp(4),
        )
    }
}

/// EWMA with `alpha = 2 / (span + 1)`, seeded with the first value.
///
/// Returns `None` on an empty series.
pub fn ewma(values: &[Decimal], span: u32) -> Option<Decimal> {
    let first = values.first()?;

    let alpha = Decimal::from(2) / Decimal::from(span + 1);
    let mut ema = *first;
    for value in &values[1..] {
        ema = alpha * *value + (Decimal::ONE - alpha) * ema;
    }

    Some(ema)
}

/// Elementwise ratio of the two close series, aligned by timestamp from the
/// most recent bar backwards.
fn ratio_series(a: &[Candle], b: &[Candle]) -> Result<Vec<Decimal>, CycleError> {
    if a.is_empty() || b.is_empty() {
        return Err(CycleError::DataUnavailable(
            "empty daily close series".to_string(),
        ));
    }

    let n = a.len().min(b.len());
    let a = &a[a.len() - n..];
    let b = &b[b.len() - n..];

    a.iter()
        .zip(b)
        .map(|(ca, cb)| {
            if ca.open_time != cb.open_time {
                return Err(CycleError::DataUnavailable(
                    "daily bars of the two legs are misaligned".to_string(),
                ));
            }
            if cb.close.is_zero() {
                return Err(CycleError::DataUnavailable(
                    "zero close price in denominator leg".to_string(),
                ));
            }
            Ok(ca.close / cb.close)
        })
        .collect()
}

/// Pick the pair direction from the live ratio against the baseline.
///
/// A live ratio exactly on the baseline resolves to short-A/long-B. That is
/// the documented tie behavior, not an oversight.
fn pair_signal(
    baseline: Decimal,
    price_a: Decimal,
    price_b: Decimal,
    exposure: Decimal,
) -> Result<Signal, CycleError> {
    if price_b.is_zero() {
        return Err(CycleError::DataUnavailable(
            "zero live price for denominator leg".to_string(),
        ));
    }
    let live_ratio = price_a / price_b;

    let (direction, weight_a, weight_b) = if live_ratio > baseline {
        (Direction::LongAShortB, exposure, -exposure)
    } else {
        (Direction::ShortALongB, -exposure, exposure)
    };

    Ok(Signal {
        direction,
        weight_a,
        weight_b,
        price_a,
        price_b,
        live_ratio,
        baseline,
    })
}

/// Computes the pair signal from fresh market data.
pub struct SignalGenerator<'a, M: MarketDataProvider> {
    market: &'a M,
    config: &'a StrategyConfig,
}

impl<'a, M: MarketDataProvider> SignalGenerator<'a, M> {
    pub fn new(market: &'a M, config: &'a StrategyConfig) -> Self {
        Self { market, config }
    }

    /// Fetch both histories and live prices, smooth the ratio, and derive
    /// the directional signal. Any fetch or computation failure means no
    /// signal and therefore no trading this cycle.
    pub async fn compute(&self) -> Result<Signal, CycleError> {
        let leg_a = &self.config.leg_a;
        let leg_b = &self.config.leg_b;
        let limit = self.config.history_limit;

        let closes_a = self
            .market
            .daily_closes(&leg_a.market_symbol, limit)
            .await
            .map_err(|e| CycleError::DataUnavailable(format!("{}: {e:#}", leg_a.market_symbol)))?;
        let closes_b = self
            .market
            .daily_closes(&leg_b.market_symbol, limit)
            .await
            .map_err(|e| CycleError::DataUnavailable(format!("{}: {e:#}", leg_b.market_symbol)))?;

        let ratios = ratio_series(&closes_a, &closes_b)?;
        let baseline = ewma(&ratios, self.config.ema_span).ok_or_else(|| {
            CycleError::DataUnavailable("empty ratio series".to_string())
        })?;

        let price_a = self
            .market
            .live_price(&leg_a.market_symbol)
            .await
            .map_err(|e| CycleError::DataUnavailable(format!("{}: {e:#}", leg_a.market_symbol)))?;
        let price_b = self
            .market
            .live_price(&leg_b.market_symbol)
            .await
            .map_err(|e| CycleError::DataUnavailable(format!("{}: {e:#}", leg_b.market_symbol)))?;

        let signal = pair_signal(baseline, price_a, price_b, self.config.exposure_fraction)?;
        debug!(
            direction = ?signal.direction,
            live_ratio = %signal.live_ratio,
            baseline = %signal.baseline,
            "Computed pair signal"
        );
        Ok(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::testkit::ScriptedMarket;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ewma_empty_series() {
        assert_eq!(ewma(&[], 6), None);
    }

    #[test]
    fn test_ewma_single_value_is_identity() {
        assert_eq!(ewma(&[dec!(21.5)], 6), Some(dec!(21.5)));
    }

    #[test]
    fn test_ewma_span_three_recurrence() {
        // alpha = 2/(3+1) = 0.5: 1 -> 1.5 -> 2.25
        assert_eq!(ewma(&[dec!(1), dec!(2), dec!(3)], 3), Some(dec!(2.25)));
    }

    #[test]
    fn test_ewma_constant_series() {
        let values = vec![dec!(20); 50];
        assert_eq!(ewma(&values, 6), Some(dec!(20)));
    }

    #[test]
    fn test_live_ratio_above_baseline_goes_long_a() {
        // baseline 20.0, live ratio 42000/2000 = 21.0
        let signal = pair_signal(dec!(20.0), dec!(42000), dec!(2000), dec!(0.75)).unwrap();
        assert_eq!(signal.direction, Direction::LongAShortB);
        assert_eq!(signal.weight_a, dec!(0.75));
        assert_eq!(signal.weight_b, dec!(-0.75));
        assert_eq!(signal.live_ratio, dec!(21));
    }

    #[test]
    fn test_live_ratio_below_baseline_goes_short_a() {
        let signal = pair_signal(dec!(22.0), dec!(42000), dec!(2000), dec!(0.75)).unwrap();
        assert_eq!(signal.direction, Direction::ShortALongB);
        assert_eq!(signal.weight_a, dec!(-0.75));
        assert_eq!(signal.weight_b, dec!(0.75));
    }

    #[test]
    fn test_ratio_on_baseline_resolves_short_a() {
        // Exact tie falls to the else branch.
        let signal = pair_signal(dec!(21.0), dec!(42000), dec!(2000), dec!(0.75)).unwrap();
        assert_eq!(signal.direction, Direction::ShortALongB);
        assert!(signal.weight_a < Decimal::ZERO);
        assert!(signal.weight_b > Decimal::ZERO);
    }

    #[test]
    fn test_zero_live_denominator_is_an_error() {
        assert!(pair_signal(dec!(20), dec!(42000), dec!(0), dec!(0.75)).is_err());
    }

    #[test]
    fn test_ratio_series_aligns_tails() {
        let a = vec![
            Candle { open_time: 0, close: dec!(10) },
            Candle { open_time: 1, close: dec!(20) },
            Candle { open_time: 2, close: dec!(30) },
        ];
        let b = vec![
            Candle { open_time: 1, close: dec!(2) },
            Candle { open_time: 2, close: dec!(3) },
        ];

        let ratios = ratio_series(&a, &b).unwrap();
        assert_eq!(ratios, vec![dec!(10), dec!(10)]);
    }

    #[test]
    fn test_ratio_series_rejects_misaligned_bars() {
        let a = vec![Candle { open_time: 0, close: dec!(10) }];
        let b = vec![Candle { open_time: 99, close: dec!(2) }];
        assert!(matches!(
            ratio_series(&a, &b),
            Err(CycleError::DataUnavailable(_))
        ));
    }

    #[test]
    fn test_ratio_series_rejects_zero_denominator() {
        let a = vec![Candle { open_time: 0, close: dec!(10) }];
        let b = vec![Candle { open_time: 0, close: dec!(0) }];
        assert!(ratio_series(&a, &b).is_err());
    }

    #[tokio::test]
    async fn test_compute_fails_when_history_is_empty() {
        let market = ScriptedMarket::new()
            .with_closes("BTCUSDT", &[])
            .with_closes("AVAXUSDT", &[])
            .with_price("BTCUSDT", dec!(42000))
            .with_price("AVAXUSDT", dec!(2000));
        let config = StrategyConfig::default();

        let result = SignalGenerator::new(&market, &config).compute().await;
        assert!(matches!(result, Err(CycleError::DataUnavailable(_))));
    }

    #[tokio::test]
    async fn test_compute_end_to_end() {
        // Constant ratio history at 20, live ratio 21 => long A / short B.
        let market = ScriptedMarket::new()
            .with_closes("BTCUSDT", &[dec!(40000), dec!(41000), dec!(42000)])
            .with_closes("AVAXUSDT", &[dec!(2000), dec!(2050), dec!(2100)])
            .with_price("BTCUSDT", dec!(44100))
            .with_price("AVAXUSDT", dec!(2100));
        let config = StrategyConfig::default();

        let signal = SignalGenerator::new(&market, &config)
            .compute()
            .await
            .unwrap();
        assert_eq!(signal.direction, Direction::LongAShortB);
        assert_eq!(signal.live_ratio, dec!(21));
    }

    #[test]
    fn test_describe_mentions_both_legs() {
        let signal = pair_signal(dec!(20.0), dec!(42000), dec!(2000), dec!(0.75)).unwrap();
        let text = signal.describe("BTCUSDT", "AVAXUSDT", 6);
        assert!(text.contains("Long BTCUSDT / Short AVAXUSDT"));
        assert!(text.contains("EMA6d=20"));
    }
}
