//! Sequential backtest driver.
//!
//! Validates the price matrix against the position matrix, shifts the
//! targets by the configured lag, then folds [`step`] over rows `1..T`.
//! Row 0 only seeds the held position. Every structural check runs before
//! the first step, so a malformed input never produces a partial run.

use thiserror::Error;
use tracing::{debug, info};

use crate::data::{IntervalPrices, PositionMatrix};
use crate::domain::{InstrumentId, IntervalKey};
use crate::engine::cost_model::FeeError;
use crate::engine::state::{EngineConfig, EngineRun, EngineState};
use crate::engine::step::{step, StepInput};

/// Precondition violations detected before simulation.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("no intervals to simulate")]
    Empty,
    #[error("no instruments in the price panel")]
    NoInstruments,
    #[error("instrument count mismatch: prices have {prices}, positions have {positions}")]
    InstrumentCountMismatch { prices: usize, positions: usize },
    #[error("instrument mismatch at column {column}: prices have '{prices}', positions have '{positions}'")]
    InstrumentMismatch {
        column: usize,
        prices: InstrumentId,
        positions: InstrumentId,
    },
    #[error("interval count mismatch: prices have {prices}, positions have {positions}")]
    LengthMismatch { prices: usize, positions: usize },
    #[error("interval mismatch at row {row}: prices have {prices}, positions have {positions}")]
    KeyMismatch {
        row: usize,
        prices: IntervalKey,
        positions: IntervalKey,
    },
    #[error("intervals out of order at row {row}: {key} does not follow {previous}")]
    UnorderedKeys {
        row: usize,
        previous: IntervalKey,
        key: IntervalKey,
    },
    #[error("{matrix} row {row} has {found} columns, expected {expected}")]
    RowWidth {
        matrix: &'static str,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("non-finite weight {value} for '{instrument}' at {key}")]
    NonFiniteWeight {
        key: IntervalKey,
        instrument: InstrumentId,
        value: f64,
    },
    #[error("initial capital must be finite and positive, got {0}")]
    InvalidCapital(f64),
    #[error("invalid fee schedule: {0}")]
    Fees(#[from] FeeError),
}

/// Check every structural precondition of a run.
pub fn validate_inputs(
    prices: &IntervalPrices,
    positions: &PositionMatrix,
    config: &EngineConfig,
) -> Result<(), EngineError> {
    if !config.initial_capital.is_finite() || config.initial_capital <= 0.0 {
        return Err(EngineError::InvalidCapital(config.initial_capital));
    }
    config.fees.validate()?;

    if prices.is_empty() || positions.is_empty() {
        return Err(EngineError::Empty);
    }
    if prices.instruments.is_empty() {
        return Err(EngineError::NoInstruments);
    }
    if prices.instruments.len() != positions.instruments.len() {
        return Err(EngineError::InstrumentCountMismatch {
            prices: prices.instruments.len(),
            positions: positions.instruments.len(),
        });
    }
    for (column, (p, q)) in prices.instruments.iter().zip(&positions.instruments).enumerate() {
        if p != q {
            return Err(EngineError::InstrumentMismatch {
                column,
                prices: p.clone(),
                positions: q.clone(),
            });
        }
    }

    if prices.keys.len() != positions.keys.len()
        || prices.bars.len() != prices.keys.len()
        || positions.rows.len() != positions.keys.len()
    {
        return Err(EngineError::LengthMismatch {
            prices: prices.bars.len().min(prices.keys.len()),
            positions: positions.rows.len().min(positions.keys.len()),
        });
    }
    for (row, (p, q)) in prices.keys.iter().zip(&positions.keys).enumerate() {
        if p != q {
            return Err(EngineError::KeyMismatch {
                row,
                prices: *p,
                positions: *q,
            });
        }
    }
    for (row, pair) in prices.keys.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(EngineError::UnorderedKeys {
                row: row + 1,
                previous: pair[0],
                key: pair[1],
            });
        }
    }

    let width = prices.instruments.len();
    for (row, bars) in prices.bars.iter().enumerate() {
        if bars.len() != width {
            return Err(EngineError::RowWidth {
                matrix: "price",
                row,
                expected: width,
                found: bars.len(),
            });
        }
    }
    for (row, weights) in positions.rows.iter().enumerate() {
        if weights.len() != width {
            return Err(EngineError::RowWidth {
                matrix: "position",
                row,
                expected: width,
                found: weights.len(),
            });
        }
        if let Some((column, value)) = weights.iter().enumerate().find(|(_, w)| !w.is_finite()) {
            return Err(EngineError::NonFiniteWeight {
                key: positions.keys[row],
                instrument: positions.instruments[column].clone(),
                value: *value,
            });
        }
    }
    Ok(())
}

/// Shift target rows forward by `lag`; the vacated leading rows are flat.
pub fn shift_positions(rows: &[Vec<f64>], lag: usize) -> Vec<Vec<f64>> {
    let width = rows.first().map_or(0, Vec::len);
    (0..rows.len())
        .map(|i| {
            if i < lag {
                vec![0.0; width]
            } else {
                rows[i - lag].clone()
            }
        })
        .collect()
}

/// Run the full simulation.
pub fn run_backtest(
    prices: &IntervalPrices,
    positions: &PositionMatrix,
    config: &EngineConfig,
) -> Result<EngineRun, EngineError> {
    validate_inputs(prices, positions, config)?;

    let held = shift_positions(&positions.rows, config.position_lag);
    let mut run = EngineRun::new(config.initial_capital, held.len() - 1);
    let seed = EngineState::new(config.initial_capital, held[0].clone());

    let final_state = (1..held.len()).fold(seed, |state, i| {
        let input = StepInput {
            key: prices.keys[i],
            current: prices.row(i - 1),
            next: prices.row(i),
            target: &held[i],
        };
        let (next_state, output) = step(state, &input, &config.fees);
        match output {
            Some(out) => {
                run.total_cost += out.cost;
                run.records.push(out.record);
            }
            None => {
                run.steps_skipped += 1;
                debug!(interval = %input.key, "skipped step with missing VWAP");
            }
        }
        next_state
    });
    run.final_capital = final_state.capital;

    info!(
        steps = run.steps_total,
        skipped = run.steps_skipped,
        final_capital = run.final_capital,
        total_cost = run.total_cost,
        "backtest complete"
    );
    Ok(run)
}
