//! Synthetic data for demos, benches and tests.
//!
//! Deterministic: the same config always yields the same panel. Minute VWAPs
//! follow a multiplicative random walk per instrument; a configurable share
//! of minutes is left without a price to exercise the missing-data paths.
//! Results produced on synthetic data are tagged by the runner.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::data::{MinutePanel, PositionMatrix};
use crate::domain::{InstrumentId, IntervalKey, MinuteKey, MinuteSample};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub seed: u64,
    pub start: NaiveDate,
    /// Trading (week) days to generate.
    pub days: usize,
    pub minutes_per_day: u32,
    pub instruments: usize,
    /// Probability that a minute has no price.
    pub missing_rate: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            start: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap_or_default(),
            days: 20,
            minutes_per_day: 330,
            instruments: 5,
            missing_rate: 0.01,
        }
    }
}

impl SyntheticConfig {
    /// Instrument ids `SYN00`, `SYN01`, ...
    pub fn instrument_ids(&self) -> Vec<InstrumentId> {
        (0..self.instruments)
            .map(|i| InstrumentId::new(format!("SYN{i:02}")))
            .collect()
    }

    /// The first `days` weekdays on or after `start`.
    pub fn trading_days(&self) -> Vec<NaiveDate> {
        let mut days = Vec::with_capacity(self.days);
        let mut current = self.start;
        while days.len() < self.days {
            if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                days.push(current);
            }
            current += Duration::days(1);
        }
        days
    }
}

/// Generate a random-walk minute panel.
pub fn generate_minute_panel(config: &SyntheticConfig) -> MinutePanel {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let days = config.trading_days();
    let mut panel = MinutePanel::new();

    for id in config.instrument_ids() {
        let mut price: f64 = rng.gen_range(20.0..200.0);
        let samples = panel.samples.entry(id).or_default();
        for day in &days {
            for minute in 0..config.minutes_per_day {
                price *= 1.0 + rng.gen_range(-0.002..0.002);
                let volume = rng.gen_range(0..20_000u32) as f64;
                let vwap = if rng.gen_bool(config.missing_rate.clamp(0.0, 1.0)) {
                    None
                } else {
                    Some(price)
                };
                samples.push(MinuteSample::new(MinuteKey::new(*day, minute), vwap, volume));
            }
        }
    }
    panel
}

/// Random target weights: each row is demeaned and scaled to unit gross exposure.
pub fn generate_positions(
    keys: &[IntervalKey],
    instruments: &[InstrumentId],
    seed: u64,
) -> PositionMatrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let rows = keys
        .iter()
        .map(|_| {
            let raw: Vec<f64> = instruments.iter().map(|_| rng.gen_range(-1.0..1.0)).collect();
            normalize_row(&raw)
        })
        .collect();
    PositionMatrix::new(keys.to_vec(), instruments.to_vec(), rows)
}

/// Cross-sectional demean, then scale so Σ|w| = 1. A constant row becomes flat.
pub fn normalize_row(raw: &[f64]) -> Vec<f64> {
    if raw.is_empty() {
        return Vec::new();
    }
    let mean = raw.iter().sum::<f64>() / raw.len() as f64;
    let centered: Vec<f64> = raw.iter().map(|w| w - mean).collect();
    let gross: f64 = centered.iter().map(|w| w.abs()).sum();
    if gross < 1e-12 {
        return vec![0.0; raw.len()];
    }
    centered.iter().map(|w| w / gross).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_is_deterministic() {
        let config = SyntheticConfig {
            days: 2,
            minutes_per_day: 30,
            instruments: 3,
            ..SyntheticConfig::default()
        };
        assert_eq!(generate_minute_panel(&config), generate_minute_panel(&config));
    }

    #[test]
    fn panel_has_expected_shape() {
        let config = SyntheticConfig {
            days: 3,
            minutes_per_day: 10,
            instruments: 2,
            missing_rate: 0.0,
            ..SyntheticConfig::default()
        };
        let panel = generate_minute_panel(&config);
        assert_eq!(panel.samples.len(), 2);
        assert_eq!(panel.sample_count(), 2 * 3 * 10);
        assert!(panel
            .samples
            .values()
            .flatten()
            .all(|s| s.vwap.is_some_and(|v| v > 0.0)));
    }

    #[test]
    fn trading_days_skip_weekends() {
        let config = SyntheticConfig {
            // Friday
            start: NaiveDate::from_ymd_opt(2024, 4, 5).unwrap(),
            days: 2,
            ..SyntheticConfig::default()
        };
        let days = config.trading_days();
        assert_eq!(days[0], NaiveDate::from_ymd_opt(2024, 4, 5).unwrap());
        assert_eq!(days[1], NaiveDate::from_ymd_opt(2024, 4, 8).unwrap());
    }

    #[test]
    fn normalized_rows_are_dollar_neutral_unit_gross() {
        let row = normalize_row(&[0.9, -0.2, 0.4, 0.1]);
        let net: f64 = row.iter().sum();
        let gross: f64 = row.iter().map(|w| w.abs()).sum();
        assert!(net.abs() < 1e-12);
        assert!((gross - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_row_normalizes_to_flat() {
        assert_eq!(normalize_row(&[0.3, 0.3]), vec![0.0, 0.0]);
    }
}
