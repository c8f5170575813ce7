//! Dataset loading and filter-option discovery.
//!
//! Rows arrive as a JSON array of objects. Rows that cannot be decoded at
//! all are skipped; fields that merely fail to parse are already `None`
//! (see [`DataRow`]).

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use jobstat_types::{CompactDate, DataRow, FilterCriteria};
use serde::Serialize;

use crate::filter::RowFilter;

/// Read a dataset file.
pub fn load_rows(path: &Path) -> Result<Vec<DataRow>, DatasetError> {
    let text = fs::read_to_string(path).map_err(|e| DatasetError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let rows = rows_from_str(&text).map_err(|e| DatasetError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::info!(rows = rows.len(), path = %path.display(), "Loaded dataset");
    Ok(rows)
}

/// Decode rows from JSON text. Only a malformed document is an error.
pub fn rows_from_str(text: &str) -> Result<Vec<DataRow>, serde_json::Error> {
    let values: Vec<serde_json::Value> = serde_json::from_str(text)?;
    let total = values.len();
    let rows: Vec<DataRow> = values
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect();
    if rows.len() < total {
        tracing::debug!(skipped = total - rows.len(), "Skipped undecodable rows");
    }
    Ok(rows)
}

/// Distinct values available for filtering, as a sidebar shows them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
    pub row_count: usize,
    /// Raid -> bosses seen in that raid.
    pub raids: BTreeMap<String, BTreeSet<String>>,
    pub metric_types: BTreeSet<String>,
    pub jobs: BTreeSet<String>,
    pub percentiles: BTreeSet<u32>,
    pub dates: Vec<CompactDate>,
}

impl DatasetSummary {
    pub fn from_rows(rows: &[DataRow]) -> Self {
        let mut summary = Self {
            row_count: rows.len(),
            ..Default::default()
        };
        let mut dates = BTreeSet::new();

        for row in rows {
            summary
                .raids
                .entry(row.raid.clone())
                .or_default()
                .insert(row.boss.clone());
            if let Some(metric) = &row.metric_type {
                summary.metric_types.insert(metric.clone());
            }
            summary.jobs.insert(row.job.clone());
            if let Some(p) = row.percentile {
                summary.percentiles.insert(p);
            }
            if let Some(date) = &row.date {
                dates.insert(date);
            }
        }

        summary.dates = dates.into_iter().cloned().collect();
        summary
    }
}

/// Sorted distinct dates of rows matching `criteria` (literal job matching).
pub fn available_dates(rows: &[DataRow], criteria: &FilterCriteria) -> Vec<CompactDate> {
    let filter = RowFilter::literal(criteria);
    rows.iter()
        .filter(|r| filter.matches(r))
        .filter_map(|r| r.date.as_ref())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .cloned()
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid dataset JSON in {path:?}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}
