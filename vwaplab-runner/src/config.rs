//! TOML backtest configuration.
//!
//! Every section is optional; a missing key takes the documented default.
//!
//! ```toml
//! [engine]
//! initial_capital = 10000000.0
//! position_lag = 1
//!
//! [fees]
//! stamp_duty_buy = 0.001
//! stamp_duty_sell = 0.001
//!
//! [aggregation]
//! interval_width = 5
//! forward_fill = true
//!
//! [performance]
//! days_per_month = 20.0
//! exposure = { mode = "sentinel", long = 10.0, short = -10.0 }
//!
//! [output]
//! parquet = true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vwaplab_core::engine::{EngineConfig, FeeError, FeeSchedule, DEFAULT_INITIAL_CAPITAL};

use crate::performance::{ExposureReporting, DEFAULT_DAYS_PER_MONTH};

/// Errors from loading or validating a config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("invalid fee schedule: {0}")]
    Fees(#[from] FeeError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    pub initial_capital: f64,
    pub position_lag: usize,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            position_lag: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationSection {
    /// Minutes per interval.
    pub interval_width: u32,
    /// Carry the last tradeable VWAP into gaps before simulating.
    pub forward_fill: bool,
}

impl Default for AggregationSection {
    fn default() -> Self {
        Self {
            interval_width: 5,
            forward_fill: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceSection {
    pub days_per_month: f64,
    pub exposure: ExposureReporting,
}

impl Default for PerformanceSection {
    fn default() -> Self {
        Self {
            days_per_month: DEFAULT_DAYS_PER_MONTH,
            exposure: ExposureReporting::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Also write `pnl.parquet`.
    pub parquet: bool,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self { parquet: true }
    }
}

/// Full configuration of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub engine: EngineSection,
    pub fees: FeeSchedule,
    pub aggregation: AggregationSection,
    pub performance: PerformanceSection,
    pub output: OutputSection,
}

impl BacktestConfig {
    /// Load and validate a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let capital = self.engine.initial_capital;
        if !capital.is_finite() || capital <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "engine.initial_capital must be finite and positive, got {capital}"
            )));
        }
        if self.aggregation.interval_width == 0 {
            return Err(ConfigError::Invalid(
                "aggregation.interval_width must be at least 1".into(),
            ));
        }
        let days = self.performance.days_per_month;
        if !days.is_finite() || days <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "performance.days_per_month must be positive, got {days}"
            )));
        }
        self.fees.validate()?;
        Ok(())
    }

    /// The engine's view of this config.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            initial_capital: self.engine.initial_capital,
            fees: self.fees,
            position_lag: self.engine.position_lag,
        }
    }
}
