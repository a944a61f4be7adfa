//! Interval price aggregation — minute samples to fixed-width VWAP bars.
//!
//! Each interval's VWAP is `Σ(vwap·volume) / Σ(volume)` over the minute
//! samples mapping to it (`minute / width`). The aggregator never invents a
//! value: zero total volume or any unusable sample leaves the interval
//! missing. Filling gaps is the caller's job, via [`forward_fill`], before
//! the panel reaches the engine.
//!
//! Instruments are independent, so the per-instrument pass runs on rayon.

use std::collections::BTreeMap;

use rayon::prelude::*;
use thiserror::Error;

use super::align::align_intervals;
use super::panel::{IntervalPrices, MinutePanel};
use crate::domain::{is_tradeable, IntervalBar, IntervalKey, MinuteSample};

/// Errors from interval aggregation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("interval width must be at least one minute")]
    ZeroWidth,
}

#[derive(Debug, Default, Clone, Copy)]
struct VwapAccumulator {
    price_volume: f64,
    volume: f64,
    void: bool,
}

impl VwapAccumulator {
    fn add(&mut self, sample: &MinuteSample) {
        if sample.is_void() {
            self.void = true;
            if sample.volume.is_finite() {
                self.volume += sample.volume;
            }
            return;
        }
        // is_void() guarantees the vwap is present
        let vwap = sample.vwap.unwrap_or(f64::NAN);
        self.price_volume += vwap * sample.volume;
        self.volume += sample.volume;
    }

    fn finish(self) -> IntervalBar {
        if self.void || self.volume <= 0.0 {
            return IntervalBar::new(None, self.volume.max(0.0));
        }
        let vwap = self.price_volume / self.volume;
        IntervalBar::new(vwap.is_finite().then_some(vwap), self.volume)
    }
}

/// Collapse a minute panel into interval VWAP bars.
///
/// The output key axis is the sorted union of every instrument's interval
/// keys; instruments absent from the panel are absent from the output.
pub fn aggregate_intervals(panel: &MinutePanel, width: u32) -> Result<IntervalPrices, AggregateError> {
    if width == 0 {
        return Err(AggregateError::ZeroWidth);
    }

    let per_instrument = panel
        .samples
        .par_iter()
        .filter(|(_, samples)| !samples.is_empty())
        .map(|(id, samples)| (id.clone(), aggregate_instrument(samples, width)))
        .collect::<BTreeMap<_, _>>();

    let prices = align_intervals(per_instrument);
    tracing::debug!(
        intervals = prices.len(),
        instruments = prices.instruments.len(),
        missing = prices.missing_count(),
        "aggregated minute panel"
    );
    Ok(prices)
}

/// Aggregate one instrument's samples; order of samples does not matter.
pub fn aggregate_instrument(samples: &[MinuteSample], width: u32) -> BTreeMap<IntervalKey, IntervalBar> {
    let mut accumulators: BTreeMap<IntervalKey, VwapAccumulator> = BTreeMap::new();
    for sample in samples {
        accumulators
            .entry(sample.key.interval(width))
            .or_default()
            .add(sample);
    }
    accumulators
        .into_iter()
        .map(|(key, acc)| (key, acc.finish()))
        .collect()
}

/// Carry the last tradeable VWAP forward over missing cells, per instrument.
///
/// Fills across day boundaries; leading gaps (no earlier value) stay missing.
/// Volumes are left untouched. Returns the number of cells filled.
pub fn forward_fill(prices: &mut IntervalPrices) -> usize {
    let mut filled = 0;
    for column in 0..prices.instruments.len() {
        let mut last: Option<f64> = None;
        for row in prices.bars.iter_mut() {
            let bar = &mut row[column];
            if is_tradeable(bar.vwap) {
                last = bar.vwap;
            } else if let Some(value) = last {
                bar.vwap = Some(value);
                filled += 1;
            }
        }
    }
    filled
}
