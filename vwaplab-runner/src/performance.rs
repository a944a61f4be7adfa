//! Daily and monthly performance summaries — pure functions over PnL records.
//!
//! Records are grouped by trading day, then daily summaries are grouped by
//! calendar month. Groups come out in key order, one per day or month even
//! when its members are not adjacent in the input. Inside a group the input
//! order is kept, and drawdown runs over that capital sequence.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use vwaplab_core::domain::IntervalKey;
use vwaplab_core::engine::PnlRecord;

/// Trading days per month used to scale the monthly Sharpe ratio.
pub const DEFAULT_DAYS_PER_MONTH: f64 = 20.0;

/// How the `long`/`short` columns of the summaries are filled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExposureReporting {
    /// Fixed values on every daily and monthly row.
    Sentinel { long: f64, short: f64 },
    /// Daily: Σ of the interval `long`/`short`. Monthly: Σ of the daily values.
    Aggregated,
}

impl Default for ExposureReporting {
    fn default() -> Self {
        Self::Sentinel {
            long: 10.0,
            short: -10.0,
        }
    }
}

/// One trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub day: NaiveDate,
    /// First interval of the day with a record.
    pub from: IntervalKey,
    /// Last interval of the day with a record.
    pub to: IntervalKey,
    pub long: f64,
    pub short: f64,
    /// Σ interval returns (fraction).
    pub total_return: f64,
    /// Mean interval return, in percent.
    #[serde(rename = "return")]
    pub ret: f64,
    pub turnover: f64,
    /// Percent, over the day's capital sequence.
    pub max_drawdown: f64,
}

/// One calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// First day of the month.
    pub month: NaiveDate,
    pub from: IntervalKey,
    pub to: IntervalKey,
    pub long: f64,
    pub short: f64,
    /// Σ of the daily `ret` values (percent).
    #[serde(rename = "return")]
    pub ret: f64,
    pub sharpe: f64,
    /// Mean daily turnover.
    pub turnover: f64,
    /// Worst daily drawdown in the month.
    pub max_drawdown: f64,
}

// ─── Daily ──────────────────────────────────────────────────────────

/// Group interval records by trading day.
pub fn daily_summaries(records: &[PnlRecord], exposure: ExposureReporting) -> Vec<DailySummary> {
    group_by_key(records, |r| r.key.day)
        .into_iter()
        .map(|group| summarize_day(&group, exposure))
        .collect()
}

fn summarize_day(group: &[&PnlRecord], exposure: ExposureReporting) -> DailySummary {
    let first = group[0];
    let last = group[group.len() - 1];
    let returns: Vec<f64> = group.iter().map(|r| r.ret).collect();
    let capitals: Vec<f64> = group.iter().map(|r| r.capital).collect();

    let (long, short) = match exposure {
        ExposureReporting::Sentinel { long, short } => (long, short),
        ExposureReporting::Aggregated => (
            group.iter().map(|r| r.long).sum(),
            group.iter().map(|r| r.short).sum(),
        ),
    };

    DailySummary {
        day: first.key.day,
        from: first.key,
        to: last.key,
        long,
        short,
        total_return: returns.iter().sum(),
        ret: mean_f64(&returns) * 100.0,
        turnover: group.iter().map(|r| r.turnover).sum(),
        max_drawdown: drawdown_pct(&capitals),
    }
}

/// Maximum peak-to-trough decline in percent.
///
/// The peak starts at the first capital and only ever rises. A non-positive
/// peak contributes no drawdown. Empty input → 0.
pub fn drawdown_pct(capitals: &[f64]) -> f64 {
    let Some(&first) = capitals.first() else {
        return 0.0;
    };
    let (_, max_dd) = capitals.iter().fold((first, 0.0_f64), |(peak, max_dd), &c| {
        let peak = peak.max(c);
        let dd = if peak > 0.0 { (peak - c) / peak * 100.0 } else { 0.0 };
        (peak, max_dd.max(dd))
    });
    max_dd
}

// ─── Monthly ────────────────────────────────────────────────────────

/// Group daily summaries by calendar month.
///
/// Sharpe is `mean / std × sqrt(days_per_month)` over the daily `ret`
/// values, with the sample standard deviation; 0 when the month has fewer
/// than two days or the returns are constant.
pub fn monthly_summaries(
    daily: &[DailySummary],
    exposure: ExposureReporting,
    days_per_month: f64,
) -> Vec<MonthlySummary> {
    group_by_key(daily, |d| (d.day.year(), d.day.month()))
        .into_iter()
        .map(|group| summarize_month(&group, exposure, days_per_month))
        .collect()
}

fn summarize_month(
    group: &[&DailySummary],
    exposure: ExposureReporting,
    days_per_month: f64,
) -> MonthlySummary {
    let first = group[0];
    let last = group[group.len() - 1];
    let returns: Vec<f64> = group.iter().map(|d| d.ret).collect();
    let turnovers: Vec<f64> = group.iter().map(|d| d.turnover).collect();

    let (long, short) = match exposure {
        ExposureReporting::Sentinel { long, short } => (long, short),
        ExposureReporting::Aggregated => (
            group.iter().map(|d| d.long).sum(),
            group.iter().map(|d| d.short).sum(),
        ),
    };

    MonthlySummary {
        month: first.day.with_day(1).unwrap_or(first.day),
        from: first.from,
        to: last.to,
        long,
        short,
        ret: returns.iter().sum(),
        sharpe: sharpe(&returns, days_per_month),
        turnover: mean_f64(&turnovers),
        max_drawdown: group.iter().map(|d| d.max_drawdown).fold(0.0, f64::max),
    }
}

fn sharpe(returns: &[f64], days_per_month: f64) -> f64 {
    let sd = std_dev(returns);
    if sd == 0.0 || !sd.is_finite() {
        return 0.0;
    }
    mean_f64(returns) / sd * days_per_month.sqrt()
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Bucket `items` by key. Buckets are in key order; members keep input order.
fn group_by_key<T, K: Ord>(items: &[T], key: impl Fn(&T) -> K) -> Vec<Vec<&T>> {
    let mut groups: BTreeMap<K, Vec<&T>> = BTreeMap::new();
    for item in items {
        groups.entry(key(item)).or_default().push(item);
    }
    groups.into_values().collect()
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n − 1). 0 for fewer than two values.
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
