//! Time keys: trading day + intraday interval index.
//!
//! `IntervalKey` orders by trading day first, then interval index, which is
//! the total order every series in the engine is indexed by. `MinuteKey` is
//! the finer sub-interval key of the raw panel; it maps onto an interval by
//! integer division of the minute index by the interval width.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors from parsing an interval label.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabelError {
    #[error("label '{0}' has no interval suffix")]
    MissingInterval(String),
    #[error("label '{label}' has an invalid day: {reason}")]
    InvalidDay { label: String, reason: String },
    #[error("label '{label}' has an invalid interval index: {reason}")]
    InvalidInterval { label: String, reason: String },
}

/// (trading day, intraday interval index).
///
/// Field order matters: the derived `Ord` compares `day` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IntervalKey {
    pub day: NaiveDate,
    pub interval: u32,
}

impl IntervalKey {
    pub fn new(day: NaiveDate, interval: u32) -> Self {
        Self { day, interval }
    }

    /// Calendar month of the trading day as `(year, month)`.
    pub fn month(&self) -> (i32, u32) {
        (self.day.year(), self.day.month())
    }

    /// The PnL table label, e.g. `2024-04-01-03`.
    pub fn label(&self) -> String {
        self.to_string()
    }

    /// Parse a label produced by [`IntervalKey::label`].
    pub fn from_label(label: &str) -> Result<Self, LabelError> {
        let (day, interval) = label
            .rsplit_once('-')
            .ok_or_else(|| LabelError::MissingInterval(label.to_string()))?;
        let day = NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| {
            LabelError::InvalidDay {
                label: label.to_string(),
                reason: e.to_string(),
            }
        })?;
        let interval = interval
            .parse::<u32>()
            .map_err(|e| LabelError::InvalidInterval {
                label: label.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { day, interval })
    }
}

impl fmt::Display for IntervalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.day.format("%Y-%m-%d"), self.interval)
    }
}

/// Sub-interval (minute) key of the raw price panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MinuteKey {
    pub day: NaiveDate,
    pub minute: u32,
}

impl MinuteKey {
    pub fn new(day: NaiveDate, minute: u32) -> Self {
        Self { day, minute }
    }

    /// The interval this minute belongs to, for a given interval width.
    ///
    /// `width` must be non-zero; the aggregator rejects zero before calling.
    pub fn interval(&self, width: u32) -> IntervalKey {
        IntervalKey {
            day: self.day,
            interval: self.minute / width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn orders_by_day_then_interval() {
        let a = IntervalKey::new(day("2024-04-01"), 40);
        let b = IntervalKey::new(day("2024-04-02"), 0);
        let c = IntervalKey::new(day("2024-04-02"), 1);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn label_zero_pads_interval() {
        let key = IntervalKey::new(day("2024-04-01"), 3);
        assert_eq!(key.label(), "2024-04-01-03");
        let key = IntervalKey::new(day("2024-04-01"), 112);
        assert_eq!(key.label(), "2024-04-01-112");
    }

    #[test]
    fn label_parses_back() {
        let key = IntervalKey::new(day("2024-11-29"), 7);
        assert_eq!(IntervalKey::from_label(&key.label()).unwrap(), key);
    }

    #[test]
    fn bad_labels_are_rejected() {
        assert!(matches!(
            IntervalKey::from_label("20240401"),
            Err(LabelError::MissingInterval(_))
        ));
        assert!(matches!(
            IntervalKey::from_label("2024-13-01-02"),
            Err(LabelError::InvalidDay { .. })
        ));
        assert!(matches!(
            IntervalKey::from_label("2024-04-01-xx"),
            Err(LabelError::InvalidInterval { .. })
        ));
    }

    #[test]
    fn minute_maps_to_interval_by_integer_division() {
        let d = day("2024-04-01");
        assert_eq!(MinuteKey::new(d, 0).interval(5), IntervalKey::new(d, 0));
        assert_eq!(MinuteKey::new(d, 4).interval(5), IntervalKey::new(d, 0));
        assert_eq!(MinuteKey::new(d, 5).interval(5), IntervalKey::new(d, 1));
        assert_eq!(MinuteKey::new(d, 14).interval(5), IntervalKey::new(d, 2));
    }

    #[test]
    fn month_is_year_and_month() {
        let key = IntervalKey::new(day("2024-04-30"), 0);
        assert_eq!(key.month(), (2024, 4));
    }
}
