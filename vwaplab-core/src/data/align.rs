//! Multi-instrument interval alignment.
//!
//! Given interval bars per instrument, align them to a common key axis.
//! Missing cells get a missing bar (no value is invented at this stage;
//! forward fill is a separate, explicit step).

use std::collections::{BTreeMap, BTreeSet};

use super::panel::IntervalPrices;
use crate::domain::{InstrumentId, IntervalBar, IntervalKey};

/// Align per-instrument interval bars onto the sorted union of their keys.
///
/// Column order follows the map's instrument order.
pub fn align_intervals(
    per_instrument: BTreeMap<InstrumentId, BTreeMap<IntervalKey, IntervalBar>>,
) -> IntervalPrices {
    let all_keys: BTreeSet<IntervalKey> = per_instrument
        .values()
        .flat_map(|bars| bars.keys().copied())
        .collect();
    let keys: Vec<IntervalKey> = all_keys.into_iter().collect();
    let instruments: Vec<InstrumentId> = per_instrument.keys().cloned().collect();

    let bars = keys
        .iter()
        .map(|key| {
            per_instrument
                .values()
                .map(|column| column.get(key).copied().unwrap_or_else(IntervalBar::missing))
                .collect()
        })
        .collect();

    IntervalPrices {
        keys,
        instruments,
        bars,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn key(day: u32, interval: u32) -> IntervalKey {
        IntervalKey::new(NaiveDate::from_ymd_opt(2024, 4, day).unwrap(), interval)
    }

    #[test]
    fn align_fills_missing_cells() {
        let mut input = BTreeMap::new();
        input.insert(
            InstrumentId::from("0005"),
            BTreeMap::from([
                (key(1, 0), IntervalBar::new(Some(60.0), 100.0)),
                (key(1, 1), IntervalBar::new(Some(61.0), 100.0)),
                (key(2, 0), IntervalBar::new(Some(62.0), 100.0)),
            ]),
        );
        input.insert(
            InstrumentId::from("0700"),
            BTreeMap::from([
                (key(1, 0), IntervalBar::new(Some(300.0), 50.0)),
                // 0700 missing (1, 1)
                (key(2, 0), IntervalBar::new(Some(302.0), 50.0)),
            ]),
        );

        let aligned = align_intervals(input);

        assert_eq!(aligned.keys, vec![key(1, 0), key(1, 1), key(2, 0)]);
        assert_eq!(aligned.instruments.len(), 2);
        assert_eq!(aligned.bars[1][0].vwap, Some(61.0));
        assert_eq!(aligned.bars[1][1], IntervalBar::missing());
    }

    #[test]
    fn empty_input_yields_empty_axis() {
        let aligned = align_intervals(BTreeMap::new());
        assert!(aligned.is_empty());
        assert!(aligned.instruments.is_empty());
    }
}
