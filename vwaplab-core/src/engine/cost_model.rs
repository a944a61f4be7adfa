//! Cost model — proportional transaction fees on traded notional.
//!
//! Every component is a fixed fraction of the traded notional, so the cost of
//! a trade is `notional * Σ fractions`. Stamp duty is held per side; the
//! default schedule charges both sides the same rate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Direction of a position change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    /// Side of a signed change in position; `None` for no change.
    pub fn from_delta(delta: f64) -> Option<TradeSide> {
        if delta > 0.0 {
            Some(TradeSide::Buy)
        } else if delta < 0.0 {
            Some(TradeSide::Sell)
        } else {
            None
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum FeeError {
    #[error("fee component '{name}' must be a finite non-negative fraction, got {value}")]
    InvalidFraction { name: &'static str, value: f64 },
}

/// Fixed fee fractions applied to traded notional.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeSchedule {
    /// Stamp duty charged on purchases.
    pub stamp_duty_buy: f64,
    /// Stamp duty charged on sales.
    pub stamp_duty_sell: f64,
    /// Exchange trading fee.
    pub exchange_fee: f64,
    /// Regulatory transaction levy.
    pub regulatory_levy: f64,
    /// Secondary regulatory levy.
    pub secondary_levy: f64,
    /// Market impact / execution slack.
    pub slippage: f64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            stamp_duty_buy: 0.001,
            stamp_duty_sell: 0.001,
            exchange_fee: 0.000_05,
            regulatory_levy: 0.000_02,
            secondary_levy: 0.000_001,
            slippage: 0.000_2,
        }
    }
}

impl FeeSchedule {
    pub fn frictionless() -> Self {
        Self {
            stamp_duty_buy: 0.0,
            stamp_duty_sell: 0.0,
            exchange_fee: 0.0,
            regulatory_levy: 0.0,
            secondary_levy: 0.0,
            slippage: 0.0,
        }
    }

    /// Sum of all fractions charged on a trade of the given side.
    pub fn total_fraction(&self, side: TradeSide) -> f64 {
        let stamp_duty = match side {
            TradeSide::Buy => self.stamp_duty_buy,
            TradeSide::Sell => self.stamp_duty_sell,
        };
        stamp_duty + self.exchange_fee + self.regulatory_levy + self.secondary_levy + self.slippage
    }

    /// Total cost of trading `traded_notional` on `side`.
    ///
    /// `cost = |traded_notional| * total_fraction(side)`; zero notional costs zero.
    pub fn cost(&self, traded_notional: f64, side: TradeSide) -> f64 {
        traded_notional.abs() * self.total_fraction(side)
    }

    pub fn validate(&self) -> Result<(), FeeError> {
        let components = [
            ("stamp_duty_buy", self.stamp_duty_buy),
            ("stamp_duty_sell", self.stamp_duty_sell),
            ("exchange_fee", self.exchange_fee),
            ("regulatory_levy", self.regulatory_levy),
            ("secondary_levy", self.secondary_levy),
            ("slippage", self.slippage),
        ];
        for (name, value) in components {
            if !value.is_finite() || value < 0.0 {
                return Err(FeeError::InvalidFraction { name, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_total_fraction() {
        let fees = FeeSchedule::default();
        // 0.001 + 0.00005 + 0.00002 + 0.000001 + 0.0002
        assert!((fees.total_fraction(TradeSide::Buy) - 0.001271).abs() < 1e-15);
    }

    #[test]
    fn default_schedule_is_symmetric() {
        let fees = FeeSchedule::default();
        assert_eq!(fees.stamp_duty_buy, fees.stamp_duty_sell);
        assert_eq!(
            fees.cost(1_000_000.0, TradeSide::Buy),
            fees.cost(1_000_000.0, TradeSide::Sell)
        );
    }

    #[test]
    fn asymmetric_stamp_duty_branches_on_side() {
        let fees = FeeSchedule {
            stamp_duty_buy: 0.0,
            stamp_duty_sell: 0.001,
            ..FeeSchedule::frictionless()
        };
        assert_eq!(fees.cost(10_000.0, TradeSide::Buy), 0.0);
        assert!((fees.cost(10_000.0, TradeSide::Sell) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn zero_notional_costs_nothing() {
        let fees = FeeSchedule::default();
        assert_eq!(fees.cost(0.0, TradeSide::Buy), 0.0);
        assert_eq!(fees.cost(0.0, TradeSide::Sell), 0.0);
    }

    #[test]
    fn cost_is_linear_in_notional() {
        let fees = FeeSchedule::default();
        let one = fees.cost(1_000.0, TradeSide::Buy);
        let ten = fees.cost(10_000.0, TradeSide::Buy);
        assert!((ten - 10.0 * one).abs() < 1e-9);
        assert!((one - 1.271).abs() < 1e-12);
    }

    #[test]
    fn cost_is_idempotent() {
        let fees = FeeSchedule::default();
        let a = fees.cost(123_456.78, TradeSide::Sell);
        let b = fees.cost(123_456.78, TradeSide::Sell);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn side_from_delta() {
        assert_eq!(TradeSide::from_delta(0.3), Some(TradeSide::Buy));
        assert_eq!(TradeSide::from_delta(-0.3), Some(TradeSide::Sell));
        assert_eq!(TradeSide::from_delta(0.0), None);
    }

    #[test]
    fn negative_fraction_is_invalid() {
        let fees = FeeSchedule {
            slippage: -0.0001,
            ..FeeSchedule::default()
        };
        assert_eq!(
            fees.validate(),
            Err(FeeError::InvalidFraction {
                name: "slippage",
                value: -0.0001
            })
        );
        assert!(FeeSchedule::default().validate().is_ok());
    }

    #[test]
    fn frictionless_costs_nothing() {
        assert_eq!(FeeSchedule::frictionless().cost(1e9, TradeSide::Buy), 0.0);
    }
}
