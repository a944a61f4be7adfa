//! Artifact export — CSV tables, Parquet PnL, and the JSON manifest.
//!
//! Tables:
//! - **pnl.csv**: `label,capital,return,turnover,long,short`
//! - **daily.csv**: `from,to,long,short,return,turnover,max_drawdown`
//! - **monthly.csv**: `from,to,long,short,return,sharpe,turnover,max_drawdown`
//!
//! The summary tables are keyed by trading day: `from`/`to` hold dates
//! (`2024-04-01`), not interval labels.
//! - **pnl.parquet**: the interval PnL table
//! - **manifest.json**: the full `RunReport`
//!
//! The manifest carries a `schema_version`; newer versions are rejected on load.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use polars::prelude::{Column, DataFrame, NamedFrom, ParquetWriter, Series};
use serde::Deserialize;
use vwaplab_core::domain::IntervalKey;
use vwaplab_core::engine::PnlRecord;

use crate::performance::{DailySummary, MonthlySummary};
use crate::runner::{RunReport, SCHEMA_VERSION};

// ─── JSON ───────────────────────────────────────────────────────────

/// Serialize a `RunReport` to pretty JSON.
pub fn export_json(report: &RunReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize RunReport to JSON")
}

/// Deserialize a `RunReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<RunReport> {
    let report: RunReport =
        serde_json::from_str(json).context("failed to deserialize RunReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV ────────────────────────────────────────────────────────────

/// Interval PnL table.
pub fn export_pnl_csv(records: &[PnlRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["label", "capital", "return", "turnover", "long", "short"])?;
    for r in records {
        wtr.write_record([
            &r.label(),
            &r.capital.to_string(),
            &r.ret.to_string(),
            &r.turnover.to_string(),
            &r.long.to_string(),
            &r.short.to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Daily summary table; `from` and `to` are both the day.
pub fn export_daily_csv(daily: &[DailySummary]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "from",
        "to",
        "long",
        "short",
        "return",
        "turnover",
        "max_drawdown",
    ])?;
    for d in daily {
        wtr.write_record([
            &d.from.day.to_string(),
            &d.to.day.to_string(),
            &d.long.to_string(),
            &d.short.to_string(),
            &d.ret.to_string(),
            &d.turnover.to_string(),
            &d.max_drawdown.to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Monthly summary table; `from`/`to` are the first and last trading days.
pub fn export_monthly_csv(monthly: &[MonthlySummary]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "from",
        "to",
        "long",
        "short",
        "return",
        "sharpe",
        "turnover",
        "max_drawdown",
    ])?;
    for m in monthly {
        wtr.write_record([
            &m.from.day.to_string(),
            &m.to.day.to_string(),
            &m.long.to_string(),
            &m.short.to_string(),
            &m.ret.to_string(),
            &m.sharpe.to_string(),
            &m.turnover.to_string(),
            &m.max_drawdown.to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

#[derive(Debug, Deserialize)]
struct PnlRow {
    label: String,
    capital: f64,
    #[serde(rename = "return")]
    ret: f64,
    turnover: f64,
    long: f64,
    short: f64,
}

/// Read an exported `pnl.csv` back into records, parsing the interval labels.
pub fn read_pnl_csv(path: &Path) -> Result<Vec<PnlRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut records = Vec::new();
    for row in reader.deserialize::<PnlRow>() {
        let row = row.with_context(|| format!("invalid row in {}", path.display()))?;
        let key = IntervalKey::from_label(&row.label)
            .with_context(|| format!("bad interval label in {}", path.display()))?;
        records.push(PnlRecord {
            key,
            capital: row.capital,
            ret: row.ret,
            turnover: row.turnover,
            long: row.long,
            short: row.short,
        });
    }
    Ok(records)
}

// ─── Parquet ────────────────────────────────────────────────────────

pub fn write_pnl_parquet(path: &Path, records: &[PnlRecord]) -> Result<()> {
    let labels: Vec<String> = records.iter().map(PnlRecord::label).collect();
    let capital: Vec<f64> = records.iter().map(|r| r.capital).collect();
    let returns: Vec<f64> = records.iter().map(|r| r.ret).collect();
    let turnover: Vec<f64> = records.iter().map(|r| r.turnover).collect();
    let long: Vec<f64> = records.iter().map(|r| r.long).collect();
    let short: Vec<f64> = records.iter().map(|r| r.short).collect();

    let mut df = DataFrame::new(vec![
        Column::Series(Series::new("label".into(), labels).into()),
        Column::Series(Series::new("capital".into(), capital).into()),
        Column::Series(Series::new("return".into(), returns).into()),
        Column::Series(Series::new("turnover".into(), turnover).into()),
        Column::Series(Series::new("long".into(), long).into()),
        Column::Series(Series::new("short".into(), short).into()),
    ])
    .context("Failed to build PnL dataframe")?;

    let mut file = File::create(path)
        .with_context(|| format!("Failed to create PnL parquet {}", path.display()))?;
    ParquetWriter::new(&mut file)
        .finish(&mut df)
        .context("Failed to write PnL parquet")?;
    Ok(())
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Paths of the files written by [`save_artifacts`].
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub dir: PathBuf,
    pub manifest: PathBuf,
    pub pnl_csv: PathBuf,
    pub daily_csv: PathBuf,
    pub monthly_csv: PathBuf,
    pub pnl_parquet: Option<PathBuf>,
}

/// Save the full artifact set for a run.
///
/// Creates `run_{short id}/` under `output_dir`. The directory name depends
/// only on the run fingerprint, so re-running identical inputs overwrites
/// the same bundle.
pub fn save_artifacts(report: &RunReport, output_dir: &Path) -> Result<ArtifactPaths> {
    let dir = output_dir.join(format!("run_{}", report.fingerprint.short_id()));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create artifact dir: {}", dir.display()))?;

    let manifest = dir.join("manifest.json");
    std::fs::write(&manifest, export_json(report)?)
        .with_context(|| format!("failed to write {}", manifest.display()))?;

    let pnl_csv = dir.join("pnl.csv");
    std::fs::write(&pnl_csv, export_pnl_csv(&report.records)?)
        .with_context(|| format!("failed to write {}", pnl_csv.display()))?;

    let daily_csv = dir.join("daily.csv");
    std::fs::write(&daily_csv, export_daily_csv(&report.daily)?)
        .with_context(|| format!("failed to write {}", daily_csv.display()))?;

    let monthly_csv = dir.join("monthly.csv");
    std::fs::write(&monthly_csv, export_monthly_csv(&report.monthly)?)
        .with_context(|| format!("failed to write {}", monthly_csv.display()))?;

    let pnl_parquet = if report.config.output.parquet {
        let path = dir.join("pnl.parquet");
        write_pnl_parquet(&path, &report.records)?;
        Some(path)
    } else {
        None
    };

    tracing::info!(dir = %dir.display(), "saved artifacts");
    Ok(ArtifactPaths {
        dir,
        manifest,
        pnl_csv,
        daily_csv,
        monthly_csv,
        pnl_parquet,
    })
}

/// Load a `RunReport` from an artifact directory's manifest.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<RunReport> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(interval: u32, capital: f64) -> PnlRecord {
        PnlRecord {
            key: IntervalKey::new(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(), interval),
            capital,
            ret: 0.1,
            turnover: 1.0,
            long: 0.5,
            short: -0.5,
        }
    }

    #[test]
    fn pnl_csv_has_expected_header_and_labels() {
        let csv = export_pnl_csv(&[record(1, 1_100_000.0)]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("label,capital,return,turnover,long,short"));
        assert_eq!(lines.next(), Some("2024-04-01-01,1100000,0.1,1,0.5,-0.5"));
    }

    #[test]
    fn summary_tables_are_keyed_by_day() {
        let records = [record(1, 100.0), record(2, 100.0)];
        let daily = crate::performance::daily_summaries(
            &records,
            crate::performance::ExposureReporting::default(),
        );
        let csv = export_daily_csv(&daily).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with("2024-04-01,2024-04-01,10,-10,"), "{row}");

        let monthly = crate::performance::monthly_summaries(
            &daily,
            crate::performance::ExposureReporting::default(),
            20.0,
        );
        let csv = export_monthly_csv(&monthly).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with("2024-04-01,2024-04-01,10,-10,"), "{row}");
    }

    #[test]
    fn empty_tables_are_header_only() {
        assert_eq!(export_pnl_csv(&[]).unwrap().lines().count(), 1);
        assert_eq!(
            export_daily_csv(&[]).unwrap().trim_end(),
            "from,to,long,short,return,turnover,max_drawdown"
        );
        assert_eq!(
            export_monthly_csv(&[]).unwrap().trim_end(),
            "from,to,long,short,return,sharpe,turnover,max_drawdown"
        );
    }
}
