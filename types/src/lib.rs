//! Shared data model for jobstat.
//!
//! These structures are the contract between the analytics engine and the
//! code that renders its output, so they serialize with camelCase names.

pub mod formatting;
mod lenient;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Dates
// ─────────────────────────────────────────────────────────────────────────────

/// Calendar day in `YYYYMMDD` form. Lexicographic order is chronological.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CompactDate(String);

impl CompactDate {
    /// Accepts exactly eight ASCII digits naming a real calendar day
    /// (surrounding whitespace ignored). `20240230` is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        NaiveDate::parse_from_str(s, "%Y%m%d")
            .ok()
            .map(|_| Self(s.to_string()))
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Self {
        Self(format!("{year:04}{month:02}{day:02}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompactDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CompactDate {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        CompactDate::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid compact date: {s:?}")))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Input rows and filters
// ─────────────────────────────────────────────────────────────────────────────

/// Which measured value of a row to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKey {
    #[default]
    Dps,
    Hps,
}

impl ValueKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKey::Dps => "dps",
            ValueKey::Hps => "hps",
        }
    }
}

/// One job/raid/boss/date/percentile measurement from the dataset.
///
/// Numeric fields are optional because source rows are scraped; a field that
/// fails to parse is `None` and the row is skipped wherever that field is
/// needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataRow {
    #[serde(default)]
    pub raid: String,
    #[serde(default)]
    pub boss: String,
    #[serde(default, deserialize_with = "lenient::opt_date")]
    pub date: Option<CompactDate>,
    #[serde(default)]
    pub job: String,
    #[serde(default, deserialize_with = "lenient::opt_u32")]
    pub percentile: Option<u32>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub dps: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub hps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub parses: Option<u32>,
}

impl DataRow {
    pub fn new(raid: &str, boss: &str, date: &str, job: &str, percentile: u32) -> Self {
        Self {
            raid: raid.to_string(),
            boss: boss.to_string(),
            date: CompactDate::parse(date),
            job: job.to_string(),
            percentile: Some(percentile),
            dps: None,
            hps: None,
            metric_type: None,
            parses: None,
        }
    }

    pub fn with_dps(mut self, dps: f64) -> Self {
        self.dps = Some(dps);
        self
    }

    pub fn with_hps(mut self, hps: f64) -> Self {
        self.hps = Some(hps);
        self
    }

    pub fn with_metric_type(mut self, metric_type: &str) -> Self {
        self.metric_type = Some(metric_type.to_string());
        self
    }

    /// The finite value stored under `key`, if any.
    pub fn value(&self, key: ValueKey) -> Option<f64> {
        let v = match key {
            ValueKey::Dps => self.dps,
            ValueKey::Hps => self.hps,
        };
        v.filter(|v| v.is_finite())
    }
}

/// Criteria a row must satisfy. `None` fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub raid: Option<String>,
    pub boss: Option<String>,
    pub metric_type: Option<String>,
    /// Literal or composite job identifiers. An empty set matches nothing.
    pub job_names: Option<BTreeSet<String>>,
    pub percentile: Option<u32>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raid(mut self, raid: &str) -> Self {
        self.raid = Some(raid.to_string());
        self
    }

    pub fn with_boss(mut self, boss: &str) -> Self {
        self.boss = Some(boss.to_string());
        self
    }

    pub fn with_metric_type(mut self, metric_type: &str) -> Self {
        self.metric_type = Some(metric_type.to_string());
        self
    }

    pub fn with_jobs<I, S>(mut self, jobs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.job_names = Some(jobs.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_percentile(mut self, percentile: u32) -> Self {
        self.percentile = Some(percentile);
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Time series
// ─────────────────────────────────────────────────────────────────────────────

/// One day of a job's series. `value == None` marks a reconstructed gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub date: CompactDate,
    pub value: Option<f64>,
    pub raw: Option<DataRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSeries {
    pub job: String,
    /// Index-aligned with the aggregate's date range.
    pub points: Vec<SeriesPoint>,
}

impl JobSeries {
    pub fn gap_count(&self) -> usize {
        self.points.iter().filter(|p| p.value.is_none()).count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedSeries {
    pub grouped: BTreeMap<String, JobSeries>,
    pub date_range: Vec<CompactDate>,
    /// Rows skipped for a missing date or non-numeric value.
    pub dropped: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// Snapshots
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// Widen the range to include `v`, starting a new range if there is none.
    pub fn include(range: Option<Self>, v: f64) -> Option<Self> {
        Some(match range {
            Some(r) => Self {
                min: r.min.min(v),
                max: r.max.max(v),
            },
            None => Self { min: v, max: v },
        })
    }
}

/// Single-date cross-section of percentile values for the selected jobs.
///
/// `value_range` spans every date matching the filter, not just
/// `selected_date`, so an axis stays fixed while scrubbing between dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentileSnapshot {
    pub selected_date: Option<CompactDate>,
    pub buckets: Vec<u32>,
    pub series: BTreeMap<String, BTreeMap<u32, f64>>,
    pub value_range: Option<ValueRange>,
}

impl PercentileSnapshot {
    pub fn is_empty(&self) -> bool {
        self.selected_date.is_none()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Gap matrices
// ─────────────────────────────────────────────────────────────────────────────

/// Difference between two ladder percentiles for one job on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapMatrixCell {
    pub lower_percentile: u32,
    pub upper_percentile: u32,
    pub lower_value: Option<f64>,
    pub upper_value: Option<f64>,
    pub raw_difference: Option<f64>,
    pub percent_difference: Option<f64>,
    pub is_missing: bool,
}

/// Upper-triangular grid for one (job, date).
///
/// `cells[i][j]` compares ladder position `i` (lower) with `j` (upper) and is
/// only populated for `j > i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixTile {
    pub job: String,
    pub date: CompactDate,
    pub cells: Vec<Vec<Option<GapMatrixCell>>>,
}

impl MatrixTile {
    pub fn cell(&self, lower: usize, upper: usize) -> Option<&GapMatrixCell> {
        if upper <= lower {
            return None;
        }
        self.cells.get(lower)?.get(upper)?.as_ref()
    }

    pub fn populated_cells(&self) -> impl Iterator<Item = &GapMatrixCell> {
        self.cells.iter().flatten().flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixCategory {
    pub name: String,
    pub tiles: Vec<MatrixTile>,
}

/// Numeric range a heatmap color scale is normalized against.
///
/// `domain_min` is always 0 so the scale anchors at "no change".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorDomain {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub domain_min: f64,
    pub domain_max: f64,
}

impl Default for ColorDomain {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            domain_min: 0.0,
            domain_max: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixPayload {
    pub percentiles: Vec<u32>,
    pub categories: Vec<MatrixCategory>,
    pub color_scale: ColorDomain,
    pub snapshot_dates: Vec<CompactDate>,
}

impl MatrixPayload {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
