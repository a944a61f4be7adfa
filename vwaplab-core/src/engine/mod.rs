//! Backtesting engine — sequential interval-by-interval PnL simulation.
//!
//! The engine consumes an interval price matrix and a target position matrix
//! on the same key axis, then folds a pure step over the rows:
//!
//! 1. Skip if the entry or exit VWAP row has a missing value
//! 2. Portfolio return = held weights · per-instrument VWAP return
//! 3. Capital grows by the return, then pays fees on |Δ weight| × capital
//! 4. Emit a PnL record and hold the new target

pub mod cost_model;
pub mod loop_runner;
pub mod state;
pub mod step;

pub use cost_model::{FeeError, FeeSchedule, TradeSide};
pub use loop_runner::{run_backtest, shift_positions, validate_inputs, EngineError};
pub use state::{EngineConfig, EngineRun, EngineState, PnlRecord, DEFAULT_INITIAL_CAPITAL};
pub use step::{step, StepInput, StepOutput};
