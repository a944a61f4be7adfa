//! VwapLab Runner — run orchestration, performance summaries, config, export.
//!
//! This crate builds on `vwaplab-core` to provide:
//! - TOML configuration with validated defaults
//! - Minute-panel and position sources (CSV, in-memory, synthetic)
//! - Single-run orchestration: aggregate → fill → engine → summaries
//! - Daily and monthly performance aggregation
//! - Run fingerprinting
//! - CSV / Parquet / JSON artifact export

pub mod config;
pub mod export;
pub mod fingerprint;
pub mod performance;
pub mod runner;
pub mod sources;

pub use config::{BacktestConfig, ConfigError};
pub use export::{load_artifacts, read_pnl_csv, save_artifacts, ArtifactPaths};
pub use fingerprint::RunFingerprint;
pub use performance::{
    daily_summaries, drawdown_pct, monthly_summaries, DailySummary, ExposureReporting,
    MonthlySummary,
};
pub use runner::{
    run_from_data, run_from_prices, run_from_sources, RunError, RunReport, RunStats,
    SCHEMA_VERSION,
};
pub use sources::{
    CsvMinuteSource, CsvPositionSource, MinuteSource, PositionProvider, SourceError,
    StaticPositions, SyntheticMinuteSource, SyntheticPositions,
};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn run_report_is_send_sync() {
        assert_send::<RunReport>();
        assert_sync::<RunReport>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<BacktestConfig>();
        assert_sync::<BacktestConfig>();
        assert_send::<ExposureReporting>();
        assert_sync::<ExposureReporting>();
    }

    #[test]
    fn summaries_are_send_sync() {
        assert_send::<DailySummary>();
        assert_sync::<DailySummary>();
        assert_send::<MonthlySummary>();
        assert_sync::<MonthlySummary>();
    }

    #[test]
    fn sources_are_send_sync() {
        assert_send::<CsvMinuteSource>();
        assert_sync::<CsvMinuteSource>();
        assert_send::<CsvPositionSource>();
        assert_sync::<CsvPositionSource>();
        assert_send::<StaticPositions>();
        assert_sync::<StaticPositions>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
    }
}
