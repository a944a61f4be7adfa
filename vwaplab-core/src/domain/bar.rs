//! Bars — minute samples of the raw panel and aggregated interval bars.

use serde::{Deserialize, Serialize};

use super::interval::MinuteKey;

/// Returns true if a VWAP can be traded against: present, finite and positive.
///
/// Everything else counts as a missing value.
pub fn is_tradeable(vwap: Option<f64>) -> bool {
    matches!(vwap, Some(v) if v.is_finite() && v > 0.0)
}

/// One sub-interval sample for a single instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinuteSample {
    pub key: MinuteKey,
    /// Minute-level VWAP, `None` when the source had no value.
    pub vwap: Option<f64>,
    pub volume: f64,
}

impl MinuteSample {
    pub fn new(key: MinuteKey, vwap: Option<f64>, volume: f64) -> Self {
        Self { key, vwap, volume }
    }

    /// Returns true if either field is unusable for a weighted mean.
    pub fn is_void(&self) -> bool {
        !matches!(self.vwap, Some(v) if v.is_finite()) || !self.volume.is_finite()
    }
}

/// Volume-weighted average price and traded volume over one interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntervalBar {
    pub vwap: Option<f64>,
    pub volume: f64,
}

impl IntervalBar {
    pub fn new(vwap: Option<f64>, volume: f64) -> Self {
        Self { vwap, volume }
    }

    /// A bar for an interval the instrument has no samples in.
    pub fn missing() -> Self {
        Self {
            vwap: None,
            volume: 0.0,
        }
    }

    pub fn is_tradeable(&self) -> bool {
        is_tradeable(self.vwap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn key() -> MinuteKey {
        MinuteKey::new(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(), 0)
    }

    #[test]
    fn tradeable_requires_finite_positive_price() {
        assert!(is_tradeable(Some(10.0)));
        assert!(!is_tradeable(None));
        assert!(!is_tradeable(Some(0.0)));
        assert!(!is_tradeable(Some(-1.0)));
        assert!(!is_tradeable(Some(f64::NAN)));
        assert!(!is_tradeable(Some(f64::INFINITY)));
    }

    #[test]
    fn sample_with_missing_vwap_is_void() {
        assert!(MinuteSample::new(key(), None, 100.0).is_void());
        assert!(MinuteSample::new(key(), Some(10.0), f64::NAN).is_void());
        assert!(!MinuteSample::new(key(), Some(10.0), 0.0).is_void());
    }

    #[test]
    fn missing_bar_is_not_tradeable() {
        let bar = IntervalBar::missing();
        assert!(!bar.is_tradeable());
        assert_eq!(bar.volume, 0.0);
    }
}
