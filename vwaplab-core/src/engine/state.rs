//! Engine configuration, fold state, and run result types.

use serde::{Deserialize, Serialize};

use crate::domain::IntervalKey;
use crate::engine::cost_model::FeeSchedule;

/// Default starting capital.
pub const DEFAULT_INITIAL_CAPITAL: f64 = 10_000_000.0;

/// Configuration for a single simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub initial_capital: f64,
    pub fees: FeeSchedule,
    /// Rows the target matrix is shifted forward before simulation.
    /// The first `position_lag` rows become flat.
    pub position_lag: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            fees: FeeSchedule::default(),
            position_lag: 1,
        }
    }
}

impl EngineConfig {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            initial_capital,
            ..Self::default()
        }
    }

    pub fn frictionless(initial_capital: f64) -> Self {
        Self {
            initial_capital,
            fees: FeeSchedule::frictionless(),
            ..Self::default()
        }
    }

    pub fn with_lag(mut self, position_lag: usize) -> Self {
        self.position_lag = position_lag;
        self
    }
}

/// State threaded through the fold: running capital and the position held
/// going into the next interval.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineState {
    pub capital: f64,
    pub previous_position: Vec<f64>,
}

impl EngineState {
    pub fn new(capital: f64, previous_position: Vec<f64>) -> Self {
        Self {
            capital,
            previous_position,
        }
    }
}

/// One simulated interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlRecord {
    pub key: IntervalKey,
    /// Capital after the interval's return and transaction costs.
    pub capital: f64,
    /// Portfolio return over the interval, gross of costs.
    #[serde(rename = "return")]
    pub ret: f64,
    /// Σ |Δ weight| (a ratio, not a notional).
    pub turnover: f64,
    /// Mean of positive target weights, 2 dp.
    pub long: f64,
    /// Mean of negative target weights, 2 dp.
    pub short: f64,
}

impl PnlRecord {
    pub fn label(&self) -> String {
        self.key.label()
    }
}

/// Output of a full simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineRun {
    pub records: Vec<PnlRecord>,
    pub initial_capital: f64,
    pub final_capital: f64,
    /// Steps attempted (rows after the seed row).
    pub steps_total: usize,
    /// Steps dropped because a VWAP was missing.
    pub steps_skipped: usize,
    /// Transaction costs deducted over the run.
    pub total_cost: f64,
}

impl EngineRun {
    pub(crate) fn new(initial_capital: f64, steps_total: usize) -> Self {
        Self {
            records: Vec::with_capacity(steps_total),
            initial_capital,
            final_capital: initial_capital,
            steps_total,
            steps_skipped: 0,
            total_cost: 0.0,
        }
    }

    /// Capital trajectory of the emitted records.
    pub fn capital_curve(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.capital).collect()
    }

    /// (final - initial) / initial.
    pub fn total_return(&self) -> f64 {
        if self.initial_capital <= 0.0 {
            return 0.0;
        }
        (self.final_capital - self.initial_capital) / self.initial_capital
    }
}
