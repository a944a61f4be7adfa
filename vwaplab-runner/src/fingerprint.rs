//! Run fingerprints — deterministic BLAKE3 hashes of a run's inputs.
//!
//! Two runs with the same config, prices and positions get the same
//! `run_id`, regardless of which source produced the data.

use serde::{Deserialize, Serialize};
use serde_json::json;
use vwaplab_core::data::{IntervalPrices, PositionMatrix};

use crate::config::BacktestConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFingerprint {
    /// Hash of the canonical config JSON.
    pub config_hash: String,
    /// Hash over the interval prices and target positions.
    pub dataset_hash: String,
    /// Hash of the two above.
    pub run_id: String,
}

impl RunFingerprint {
    pub fn compute(
        config: &BacktestConfig,
        prices: &IntervalPrices,
        positions: &PositionMatrix,
    ) -> Self {
        let config_hash = config_hash(config);
        let dataset_hash = dataset_hash(prices, positions);
        let canonical = json!({
            "config_hash": &config_hash,
            "dataset_hash": &dataset_hash,
        });
        let run_id = blake3::hash(canonical.to_string().as_bytes())
            .to_hex()
            .to_string();
        Self {
            config_hash,
            dataset_hash,
            run_id,
        }
    }

    /// First 12 hex characters of the run id.
    pub fn short_id(&self) -> &str {
        &self.run_id[..self.run_id.len().min(12)]
    }
}

pub fn config_hash(config: &BacktestConfig) -> String {
    // serde_json::Value keeps object keys sorted
    let canonical = serde_json::to_value(config)
        .map(|v| v.to_string())
        .unwrap_or_default();
    blake3::hash(canonical.as_bytes()).to_hex().to_string()
}

/// Hash keys, instruments, VWAPs, volumes and weights in axis order.
pub fn dataset_hash(prices: &IntervalPrices, positions: &PositionMatrix) -> String {
    let mut hasher = blake3::Hasher::new();

    for id in &prices.instruments {
        hasher.update(id.as_str().as_bytes());
        hasher.update(&[0]);
    }
    for (key, row) in prices.keys.iter().zip(&prices.bars) {
        hasher.update(key.label().as_bytes());
        for bar in row {
            match bar.vwap {
                Some(v) => hasher.update(&v.to_le_bytes()),
                None => hasher.update(&[0xff; 8]),
            };
            hasher.update(&bar.volume.to_le_bytes());
        }
    }
    for row in &positions.rows {
        for w in row {
            hasher.update(&w.to_le_bytes());
        }
    }

    hasher.finalize().to_hex().to_string()
}
