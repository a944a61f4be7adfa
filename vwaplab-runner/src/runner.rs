//! Run orchestration — wires together aggregation, the engine, and the
//! performance summaries.
//!
//! Three entry points:
//! - `run_from_sources()`: loads the panel and positions, then runs. Used by CLI.
//! - `run_from_data()`: takes a pre-loaded minute panel and a position provider.
//! - `run_from_prices()`: takes interval prices and a position matrix as-is.
//!   No aggregation and no fill; used for hand-built scenarios.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, info_span, warn};

use vwaplab_core::data::{
    aggregate_intervals, forward_fill, AggregateError, IntervalPrices, MinutePanel, PositionMatrix,
};
use vwaplab_core::domain::{InstrumentId, IntervalKey};
use vwaplab_core::engine::{run_backtest, EngineError, PnlRecord};

use crate::config::{BacktestConfig, ConfigError};
use crate::fingerprint::RunFingerprint;
use crate::performance::{daily_summaries, monthly_summaries, DailySummary, MonthlySummary};
use crate::sources::{MinuteSource, PositionProvider, SourceError};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Source(#[from] SourceError),
    #[error("aggregation error: {0}")]
    Aggregate(#[from] AggregateError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Counters describing how the inputs were processed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub intervals: usize,
    pub instruments: usize,
    /// Missing VWAP cells after aggregation.
    pub missing_cells: usize,
    /// Cells filled by forward fill.
    pub filled_cells: usize,
    pub steps_total: usize,
    pub steps_skipped: usize,
    pub total_cost: f64,
    pub initial_capital: f64,
    pub final_capital: f64,
    /// (final - initial) / initial.
    pub total_return: f64,
}

/// Complete result of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub config: BacktestConfig,
    pub fingerprint: RunFingerprint,
    pub has_synthetic: bool,
    pub instruments: Vec<InstrumentId>,
    pub first_interval: Option<IntervalKey>,
    pub last_interval: Option<IntervalKey>,
    pub stats: RunStats,
    pub records: Vec<PnlRecord>,
    pub daily: Vec<DailySummary>,
    pub monthly: Vec<MonthlySummary>,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Load inputs from sources, then run.
pub fn run_from_sources(
    config: &BacktestConfig,
    minutes: &dyn MinuteSource,
    positions: &dyn PositionProvider,
) -> Result<RunReport, RunError> {
    let panel = minutes.load_panel()?;
    run_from_data(config, &panel, positions, minutes.is_synthetic())
}

/// Aggregate a minute panel, optionally forward-fill, and run.
pub fn run_from_data(
    config: &BacktestConfig,
    panel: &MinutePanel,
    positions: &dyn PositionProvider,
    has_synthetic: bool,
) -> Result<RunReport, RunError> {
    config.validate()?;

    let mut prices = aggregate_intervals(panel, config.aggregation.interval_width)?;
    let missing_cells = prices.missing_count();
    let filled_cells = if config.aggregation.forward_fill {
        forward_fill(&mut prices)
    } else {
        0
    };
    debug!(missing_cells, filled_cells, "prepared interval prices");

    let matrix = positions.positions(&prices.keys, &prices.instruments)?;

    let mut report = run_from_prices(config, &prices, &matrix, has_synthetic)?;
    report.stats.missing_cells = missing_cells;
    report.stats.filled_cells = filled_cells;
    Ok(report)
}

/// Run on interval prices exactly as given.
pub fn run_from_prices(
    config: &BacktestConfig,
    prices: &IntervalPrices,
    positions: &PositionMatrix,
    has_synthetic: bool,
) -> Result<RunReport, RunError> {
    config.validate()?;
    let fingerprint = RunFingerprint::compute(config, prices, positions);
    let _span = info_span!("run", id = fingerprint.short_id()).entered();

    if has_synthetic {
        warn!("running on synthetic data");
    }

    let run = run_backtest(prices, positions, &config.engine_config())?;
    let exposure = config.performance.exposure;
    let daily = daily_summaries(&run.records, exposure);
    let monthly = monthly_summaries(&daily, exposure, config.performance.days_per_month);

    let stats = RunStats {
        intervals: prices.len(),
        instruments: prices.instruments.len(),
        missing_cells: prices.missing_count(),
        filled_cells: 0,
        steps_total: run.steps_total,
        steps_skipped: run.steps_skipped,
        total_cost: run.total_cost,
        initial_capital: run.initial_capital,
        final_capital: run.final_capital,
        total_return: run.total_return(),
    };
    info!(
        records = run.records.len(),
        days = daily.len(),
        months = monthly.len(),
        total_return = stats.total_return,
        "run complete"
    );

    Ok(RunReport {
        schema_version: SCHEMA_VERSION,
        config: config.clone(),
        fingerprint,
        has_synthetic,
        instruments: prices.instruments.clone(),
        first_interval: prices.keys.first().copied(),
        last_interval: prices.keys.last().copied(),
        stats,
        records: run.records,
        daily,
        monthly,
    })
}
