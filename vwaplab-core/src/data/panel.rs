//! Panel containers: the raw minute panel, the aggregated interval price
//! matrix, and the target position matrix.
//!
//! The two matrices are row-major over the same kind of key axis
//! (`IntervalKey`) and column-major over instruments. The engine requires both
//! to share the exact key axis and instrument order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{is_tradeable, InstrumentId, IntervalBar, IntervalKey, MinuteSample};

/// Raw sub-interval samples, per instrument.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinutePanel {
    pub samples: BTreeMap<InstrumentId, Vec<MinuteSample>>,
}

impl MinutePanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, instrument: InstrumentId, sample: MinuteSample) {
        self.samples.entry(instrument).or_default().push(sample);
    }

    pub fn instruments(&self) -> impl Iterator<Item = &InstrumentId> {
        self.samples.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.values().all(|s| s.is_empty())
    }

    /// Total number of samples across instruments.
    pub fn sample_count(&self) -> usize {
        self.samples.values().map(Vec::len).sum()
    }
}

/// Interval bars on a common key axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalPrices {
    /// Sorted ascending, unique.
    pub keys: Vec<IntervalKey>,
    pub instruments: Vec<InstrumentId>,
    /// `bars[row][column]`; each row has `instruments.len()` entries.
    pub bars: Vec<Vec<IntervalBar>>,
}

impl IntervalPrices {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn row(&self, index: usize) -> &[IntervalBar] {
        &self.bars[index]
    }

    /// True when every instrument has a tradeable VWAP in this row.
    pub fn row_is_tradeable(&self, index: usize) -> bool {
        self.bars[index].iter().all(IntervalBar::is_tradeable)
    }

    pub fn column_index(&self, instrument: &InstrumentId) -> Option<usize> {
        self.instruments.iter().position(|i| i == instrument)
    }

    /// VWAP series for one instrument, in key order.
    pub fn vwap_column(&self, column: usize) -> Vec<Option<f64>> {
        self.bars.iter().map(|row| row[column].vwap).collect()
    }

    /// Number of (interval, instrument) cells without a tradeable VWAP.
    pub fn missing_count(&self) -> usize {
        self.bars
            .iter()
            .flat_map(|row| row.iter())
            .filter(|bar| !is_tradeable(bar.vwap))
            .count()
    }
}

/// Target signed weights per interval and instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionMatrix {
    pub keys: Vec<IntervalKey>,
    pub instruments: Vec<InstrumentId>,
    /// `rows[row][column]`.
    pub rows: Vec<Vec<f64>>,
}

impl PositionMatrix {
    pub fn new(keys: Vec<IntervalKey>, instruments: Vec<InstrumentId>, rows: Vec<Vec<f64>>) -> Self {
        Self {
            keys,
            instruments,
            rows,
        }
    }

    /// All-flat matrix over the given axes.
    pub fn zeros(keys: Vec<IntervalKey>, instruments: Vec<InstrumentId>) -> Self {
        let rows = vec![vec![0.0; instruments.len()]; keys.len()];
        Self {
            keys,
            instruments,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> &[f64] {
        &self.rows[index]
    }
}
