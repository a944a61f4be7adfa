//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. Turnover is never negative
//! 2. Unchanged targets pay no cost and report zero turnover
//! 3. Frictionless capital is the product of (1 + return)
//! 4. Skips never emit records for intervals next to a missing VWAP
//! 5. The cost model is pure and linear

use chrono::NaiveDate;
use proptest::prelude::*;
use vwaplab_core::data::{IntervalPrices, PositionMatrix};
use vwaplab_core::domain::{InstrumentId, IntervalBar, IntervalKey};
use vwaplab_core::engine::{run_backtest, EngineConfig, FeeSchedule, TradeSide};

// ── Strategies (proptest) ────────────────────────────────────────────

fn key(i: usize) -> IntervalKey {
    let day = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap() + chrono::Duration::days((i / 50) as i64);
    IntervalKey::new(day, (i % 50) as u32)
}

fn build(prices: Vec<Vec<Option<f64>>>, weights: Vec<Vec<f64>>) -> (IntervalPrices, PositionMatrix) {
    let width = prices[0].len();
    let keys: Vec<IntervalKey> = (0..prices.len()).map(key).collect();
    let instruments: Vec<InstrumentId> = (0..width).map(|i| InstrumentId::new(format!("S{i}"))).collect();
    let bars = prices
        .into_iter()
        .map(|row| row.into_iter().map(|p| IntervalBar::new(p, 1.0)).collect())
        .collect();
    (
        IntervalPrices {
            keys: keys.clone(),
            instruments: instruments.clone(),
            bars,
        },
        PositionMatrix::new(keys, instruments, weights),
    )
}

/// (price rows with occasional gaps, weight rows), same shape.
fn arb_panel() -> impl Strategy<Value = (Vec<Vec<Option<f64>>>, Vec<Vec<f64>>)> {
    (1usize..5, 2usize..30).prop_flat_map(|(width, len)| {
        (
            prop::collection::vec(
                prop::collection::vec(prop::option::weighted(0.9, 1.0..100.0_f64), width),
                len,
            ),
            prop::collection::vec(prop::collection::vec(-1.0..1.0_f64, width), len),
        )
    })
}

/// Gap-free price rows and a single weight row repeated.
fn arb_constant_book() -> impl Strategy<Value = (Vec<Vec<Option<f64>>>, Vec<f64>)> {
    (1usize..5, 2usize..30).prop_flat_map(|(width, len)| {
        (
            prop::collection::vec(
                prop::collection::vec((1.0..100.0_f64).prop_map(Some), width),
                len,
            ),
            prop::collection::vec(-1.0..1.0_f64, width),
        )
    })
}

proptest! {
    /// Turnover sums absolute deltas, so it is never negative.
    #[test]
    fn turnover_is_non_negative((prices, weights) in arb_panel()) {
        let (prices, positions) = build(prices, weights);
        let run = run_backtest(&prices, &positions, &EngineConfig::default()).unwrap();
        for record in &run.records {
            prop_assert!(record.turnover >= 0.0);
        }
    }

    /// Holding the same weights throughout costs nothing.
    #[test]
    fn unchanged_targets_pay_no_cost((prices, row) in arb_constant_book()) {
        let weights = vec![row; prices.len()];
        let (prices, positions) = build(prices, weights);
        let config = EngineConfig::default().with_lag(0);
        let run = run_backtest(&prices, &positions, &config).unwrap();

        prop_assert_eq!(run.total_cost, 0.0);
        let mut capital = config.initial_capital;
        for record in &run.records {
            prop_assert_eq!(record.turnover, 0.0);
            capital *= 1.0 + record.ret;
            prop_assert!((record.capital - capital).abs() <= 1e-6 * capital.abs().max(1.0));
        }
    }

    /// Without fees the capital path is exactly the compounded returns.
    #[test]
    fn frictionless_capital_compounds_returns((prices, weights) in arb_panel()) {
        let (prices, positions) = build(prices, weights);
        let config = EngineConfig::frictionless(1_000_000.0);
        let run = run_backtest(&prices, &positions, &config).unwrap();

        let mut capital = config.initial_capital;
        for record in &run.records {
            capital *= 1.0 + record.ret;
            prop_assert!((record.capital - capital).abs() <= 1e-6 * capital.abs().max(1.0));
        }
    }

    /// No record exists for an interval whose own or previous row has a gap.
    #[test]
    fn no_records_next_to_gaps((prices, weights) in arb_panel()) {
        let (prices, positions) = build(prices, weights);
        let run = run_backtest(&prices, &positions, &EngineConfig::default()).unwrap();

        for record in &run.records {
            let row = prices.keys.iter().position(|k| *k == record.key).unwrap();
            prop_assert!(row >= 1);
            prop_assert!(prices.row_is_tradeable(row));
            prop_assert!(prices.row_is_tradeable(row - 1));
        }
        prop_assert_eq!(run.records.len() + run.steps_skipped, prices.len() - 1);
    }

    /// Fees are a pure, linear function of notional.
    #[test]
    fn cost_is_pure_and_linear(notional in 0.0..1e9_f64, scale in 0.0..10.0_f64) {
        let fees = FeeSchedule::default();
        for side in [TradeSide::Buy, TradeSide::Sell] {
            let a = fees.cost(notional, side);
            prop_assert_eq!(a.to_bits(), fees.cost(notional, side).to_bits());
            prop_assert!(a >= 0.0);
            let scaled = fees.cost(notional * scale, side);
            prop_assert!((scaled - a * scale).abs() <= 1e-6 * scaled.max(1.0));
        }
        prop_assert_eq!(fees.cost(notional, TradeSide::Buy), fees.cost(notional, TradeSide::Sell));
    }
}
