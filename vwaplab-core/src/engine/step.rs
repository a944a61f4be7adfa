//! The per-interval transition.
//!
//! `step` is a pure function of the incoming state and one row of input; the
//! loop runner folds it over the ordered key axis. A step whose current or
//! next VWAP row has a missing value returns the state untouched and emits
//! nothing.

use crate::domain::{IntervalBar, IntervalKey};
use crate::engine::cost_model::{FeeSchedule, TradeSide};
use crate::engine::state::{EngineState, PnlRecord};

/// One row of input to the fold.
#[derive(Debug, Clone, Copy)]
pub struct StepInput<'a> {
    pub key: IntervalKey,
    /// Bars at the previous key (entry prices).
    pub current: &'a [IntervalBar],
    /// Bars at this key (exit prices).
    pub next: &'a [IntervalBar],
    /// Target weights to hold from this key on.
    pub target: &'a [f64],
}

/// A simulated step: the emitted record plus the costs it paid.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutput {
    pub record: PnlRecord,
    pub cost: f64,
}

/// Advance the simulation by one interval.
pub fn step(state: EngineState, input: &StepInput<'_>, fees: &FeeSchedule) -> (EngineState, Option<StepOutput>) {
    let (Some(current), Some(next)) = (vwaps(input.current), vwaps(input.next)) else {
        return (state, None);
    };

    let ret: f64 = state
        .previous_position
        .iter()
        .zip(current.iter().zip(&next))
        .map(|(weight, (entry, exit))| weight * (exit / entry - 1.0))
        .sum();
    let mut capital = state.capital * (1.0 + ret);

    let mut turnover = 0.0;
    let mut cost = 0.0;
    for (target, held) in input.target.iter().zip(&state.previous_position) {
        let delta = target - held;
        turnover += delta.abs();
        if let Some(side) = TradeSide::from_delta(delta) {
            cost += fees.cost(delta.abs() * state.capital, side);
        }
    }
    capital -= cost;

    let record = PnlRecord {
        key: input.key,
        capital,
        ret,
        turnover,
        long: round2(mean_where(input.target, |w| w > 0.0)),
        short: round2(mean_where(input.target, |w| w < 0.0)),
    };
    let next_state = EngineState::new(capital, input.target.to_vec());
    (next_state, Some(StepOutput { record, cost }))
}

/// VWAPs of a row, or `None` if any instrument lacks a tradeable price.
fn vwaps(row: &[IntervalBar]) -> Option<Vec<f64>> {
    row.iter()
        .map(|bar| bar.vwap.filter(|_| bar.is_tradeable()))
        .collect()
}

/// Mean of the entries matching `keep`, 0 when none match.
fn mean_where(weights: &[f64], keep: impl Fn(f64) -> bool) -> f64 {
    let (sum, count) = weights
        .iter()
        .copied()
        .filter(|w| keep(*w))
        .fold((0.0, 0usize), |(sum, count), w| (sum + w, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
