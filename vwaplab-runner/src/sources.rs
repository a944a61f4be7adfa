//! Input sources for the runner: minute panels and target positions.
//!
//! Both inputs sit behind a trait so the runner can take files, in-memory
//! matrices, or synthetic data without caring which. The CSV sources read
//! long-format files:
//!
//! - minutes: `day,minute,instrument,vwap,volume` (empty `vwap` = no price)
//! - positions: `day,interval,instrument,weight`
//!
//! Position providers always answer on the caller's key axis and instrument
//! order. Both sides must name the same instruments, and every position entry
//! must sit on a price interval. Inside that shape, a cell with no entry is
//! flat (0.0).

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use vwaplab_core::data::{MinutePanel, PositionMatrix};
use vwaplab_core::domain::{InstrumentId, IntervalKey, MinuteKey, MinuteSample};
use vwaplab_core::synthetic::{generate_minute_panel, generate_positions, SyntheticConfig};

/// Errors from reading input data.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Csv {
        path: PathBuf,
        source: csv::Error,
    },
    #[error("{path}: no rows")]
    Empty { path: PathBuf },
    #[error("{path}: duplicate entry for '{instrument}' at {at}")]
    Duplicate {
        path: PathBuf,
        instrument: InstrumentId,
        at: String,
    },
    #[error(
        "position instruments do not match prices: missing [{}], unexpected [{}]",
        join_ids(.missing),
        join_ids(.unexpected)
    )]
    ShapeMismatch {
        /// Priced instruments with no position entries.
        missing: Vec<InstrumentId>,
        /// Position instruments with no prices.
        unexpected: Vec<InstrumentId>,
    },
    #[error("{count} position entries lie outside the price intervals (first at {first})")]
    OffAxis { count: usize, first: IntervalKey },
}

fn join_ids(ids: &[InstrumentId]) -> String {
    ids.iter()
        .map(InstrumentId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Traits ──────────────────────────────────────────────────────────

/// Provider of raw minute samples.
pub trait MinuteSource {
    fn load_panel(&self) -> Result<MinutePanel, SourceError>;

    /// Whether the panel is generated rather than observed.
    fn is_synthetic(&self) -> bool {
        false
    }
}

/// Provider of target weights on a given key axis.
pub trait PositionProvider {
    fn positions(
        &self,
        keys: &[IntervalKey],
        instruments: &[InstrumentId],
    ) -> Result<PositionMatrix, SourceError>;
}

// ── CSV minute panel ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct MinuteRow {
    day: NaiveDate,
    minute: u32,
    instrument: String,
    vwap: Option<f64>,
    volume: f64,
}

/// Minute panel stored as a long-format CSV file.
#[derive(Debug, Clone)]
pub struct CsvMinuteSource {
    path: PathBuf,
}

impl CsvMinuteSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MinuteSource for CsvMinuteSource {
    fn load_panel(&self) -> Result<MinutePanel, SourceError> {
        let csv_err = |source| SourceError::Csv {
            path: self.path.clone(),
            source,
        };
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(csv_err)?;

        let mut panel = MinutePanel::new();
        let mut seen: HashSet<(InstrumentId, MinuteKey)> = HashSet::new();
        for row in reader.deserialize::<MinuteRow>() {
            let row = row.map_err(csv_err)?;
            let instrument = InstrumentId::new(row.instrument);
            let key = MinuteKey::new(row.day, row.minute);
            if !seen.insert((instrument.clone(), key)) {
                return Err(SourceError::Duplicate {
                    path: self.path.clone(),
                    instrument,
                    at: format!("{} minute {}", key.day, key.minute),
                });
            }
            panel.push(instrument, MinuteSample::new(key, row.vwap, row.volume));
        }

        if panel.is_empty() {
            return Err(SourceError::Empty {
                path: self.path.clone(),
            });
        }
        debug!(
            path = %self.path.display(),
            instruments = panel.samples.len(),
            samples = panel.sample_count(),
            "loaded minute panel"
        );
        Ok(panel)
    }
}

// ── CSV positions ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct PositionRow {
    day: NaiveDate,
    interval: u32,
    instrument: String,
    weight: f64,
}

/// Target weights stored as a long-format CSV file.
#[derive(Debug, Clone)]
pub struct CsvPositionSource {
    path: PathBuf,
}

impl CsvPositionSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_entries(&self) -> Result<BTreeMap<(IntervalKey, InstrumentId), f64>, SourceError> {
        let csv_err = |source| SourceError::Csv {
            path: self.path.clone(),
            source,
        };
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(csv_err)?;

        let mut entries = BTreeMap::new();
        for row in reader.deserialize::<PositionRow>() {
            let row = row.map_err(csv_err)?;
            let key = IntervalKey::new(row.day, row.interval);
            let instrument = InstrumentId::new(row.instrument);
            if entries.insert((key, instrument.clone()), row.weight).is_some() {
                return Err(SourceError::Duplicate {
                    path: self.path.clone(),
                    instrument,
                    at: key.label(),
                });
            }
        }
        if entries.is_empty() {
            return Err(SourceError::Empty {
                path: self.path.clone(),
            });
        }
        Ok(entries)
    }
}

impl PositionProvider for CsvPositionSource {
    fn positions(
        &self,
        keys: &[IntervalKey],
        instruments: &[InstrumentId],
    ) -> Result<PositionMatrix, SourceError> {
        let entries = self.read_entries()?;
        matrix_from_entries(&entries, keys, instruments)
    }
}

// ── In-memory providers ─────────────────────────────────────────────

/// A fixed position matrix, re-indexed onto the requested axis.
#[derive(Debug, Clone)]
pub struct StaticPositions {
    matrix: PositionMatrix,
}

impl StaticPositions {
    pub fn new(matrix: PositionMatrix) -> Self {
        Self { matrix }
    }
}

impl PositionProvider for StaticPositions {
    fn positions(
        &self,
        keys: &[IntervalKey],
        instruments: &[InstrumentId],
    ) -> Result<PositionMatrix, SourceError> {
        if self.matrix.keys == keys && self.matrix.instruments == instruments {
            return Ok(self.matrix.clone());
        }
        let mut entries = BTreeMap::new();
        for (key, row) in self.matrix.keys.iter().zip(&self.matrix.rows) {
            for (instrument, weight) in self.matrix.instruments.iter().zip(row) {
                entries.insert((*key, instrument.clone()), *weight);
            }
        }
        matrix_from_entries(&entries, keys, instruments)
    }
}

/// Seeded random-walk minute panel.
#[derive(Debug, Clone, Default)]
pub struct SyntheticMinuteSource {
    pub config: SyntheticConfig,
}

impl SyntheticMinuteSource {
    pub fn new(config: SyntheticConfig) -> Self {
        Self { config }
    }
}

impl MinuteSource for SyntheticMinuteSource {
    fn load_panel(&self) -> Result<MinutePanel, SourceError> {
        Ok(generate_minute_panel(&self.config))
    }

    fn is_synthetic(&self) -> bool {
        true
    }
}

/// Seeded random dollar-neutral weights on any axis.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticPositions {
    pub seed: u64,
}

impl PositionProvider for SyntheticPositions {
    fn positions(
        &self,
        keys: &[IntervalKey],
        instruments: &[InstrumentId],
    ) -> Result<PositionMatrix, SourceError> {
        Ok(generate_positions(keys, instruments, self.seed))
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a dense matrix on the given axis.
///
/// Fails when the instrument sets differ or an entry's interval is not on
/// the axis. Cells inside the axis without an entry are flat.
fn matrix_from_entries(
    entries: &BTreeMap<(IntervalKey, InstrumentId), f64>,
    keys: &[IntervalKey],
    instruments: &[InstrumentId],
) -> Result<PositionMatrix, SourceError> {
    let priced: BTreeSet<&InstrumentId> = instruments.iter().collect();
    let held: BTreeSet<&InstrumentId> = entries.keys().map(|(_, id)| id).collect();
    if priced != held {
        return Err(SourceError::ShapeMismatch {
            missing: priced.difference(&held).map(|id| (*id).clone()).collect(),
            unexpected: held.difference(&priced).map(|id| (*id).clone()).collect(),
        });
    }

    let axis: BTreeSet<&IntervalKey> = keys.iter().collect();
    let mut off_axis = entries.keys().filter(|(key, _)| !axis.contains(key));
    if let Some((first, _)) = off_axis.next() {
        return Err(SourceError::OffAxis {
            count: off_axis.count() + 1,
            first: *first,
        });
    }

    let rows: Vec<Vec<f64>> = keys
        .iter()
        .map(|key| {
            instruments
                .iter()
                .map(|id| entries.get(&(*key, id.clone())).copied().unwrap_or(0.0))
                .collect()
        })
        .collect();
    debug!(
        cells = keys.len() * instruments.len(),
        provided = entries.len(),
        "aligned position matrix"
    );

    Ok(PositionMatrix::new(keys.to_vec(), instruments.to_vec(), rows))
}
