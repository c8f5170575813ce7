//! Single-date percentile distributions with a date-independent value range.

use std::collections::{BTreeMap, BTreeSet};

use jobstat_types::{
    CompactDate, DataRow, FilterCriteria, PercentileSnapshot, ValueKey, ValueRange,
};

use crate::composite::CompositeExpander;
use crate::config::EngineConfig;
use crate::filter::RowFilter;

#[derive(Debug, Clone, Default)]
pub struct SnapshotOptions {
    pub value_key: ValueKey,
    /// Keep rows at the ladder's lowest percentile. Off by default because the
    /// bottom tail flattens the axis range for mid percentiles.
    pub include_extremes: bool,
    /// Preferred date; falls back to the most recent date when absent.
    pub target_date: Option<CompactDate>,
    /// Match composite job selections by their constituent jobs.
    pub expand_jobs: bool,
}

/// Build the percentile snapshot for `criteria`.
///
/// `value_range` covers every surviving row on every date, so callers can
/// scrub between dates without the axis jumping.
pub fn build_snapshot(
    rows: &[DataRow],
    criteria: &FilterCriteria,
    options: &SnapshotOptions,
    config: &EngineConfig,
) -> PercentileSnapshot {
    let filter = if options.expand_jobs {
        RowFilter::expanded(criteria, &CompositeExpander::from_config(config))
    } else {
        RowFilter::literal(criteria)
    };
    let hidden = (!options.include_extremes)
        .then(|| config.lowest_percentile())
        .flatten();

    // (date, job, percentile, value) for rows usable in a snapshot
    let survivors: Vec<(&CompactDate, &str, u32, f64)> = rows
        .iter()
        .filter(|row| filter.matches(row))
        .filter_map(|row| {
            let percentile = row.percentile.filter(|p| Some(*p) != hidden)?;
            Some((
                row.date.as_ref()?,
                row.job.as_str(),
                percentile,
                row.value(options.value_key)?,
            ))
        })
        .collect();

    if survivors.is_empty() {
        return PercentileSnapshot::default();
    }

    let value_range = survivors
        .iter()
        .fold(None, |range, (_, _, _, v)| ValueRange::include(range, *v));

    let available = |date: &CompactDate| survivors.iter().any(|(d, ..)| *d == date);
    let selected = match options.target_date.as_ref().filter(|t| available(*t)) {
        Some(target) => target,
        None => {
            let Some(latest) = survivors.iter().map(|(d, ..)| *d).max() else {
                return PercentileSnapshot::default();
            };
            if let Some(requested) = &options.target_date {
                tracing::debug!(
                    requested = %requested,
                    selected = %latest,
                    "Snapshot date unavailable, using most recent"
                );
            }
            latest
        }
    };

    let mut series: BTreeMap<String, BTreeMap<u32, f64>> = BTreeMap::new();
    let mut buckets = BTreeSet::new();
    for (_, job, percentile, value) in survivors.iter().filter(|(d, ..)| *d == selected) {
        series
            .entry(job.to_string())
            .or_default()
            .insert(*percentile, *value);
        buckets.insert(*percentile);
    }

    PercentileSnapshot {
        selected_date: Some(selected.clone()),
        buckets: buckets.into_iter().collect(),
        series,
        value_range,
    }
}
