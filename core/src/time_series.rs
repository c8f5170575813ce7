//! Per-job daily series aligned to one shared, gap-filled calendar.

use std::collections::BTreeMap;

use hashbrown::HashMap;
use jobstat_types::{AggregatedSeries, CompactDate, DataRow, JobSeries, SeriesPoint, ValueKey};

use crate::composite::CompositeExpander;
use crate::dates::build_full_range;

/// Read-time scale factor for a job's values, resolved once per job group.
/// Stored rows are never modified.
pub type ValueAdjustment<'a> = &'a dyn Fn(&str) -> f64;

/// Halve values of composite pair identities; singles pass through.
///
/// Pair rows carry the combined output of two players, so halving puts them
/// on the same per-player scale as single jobs.
pub fn halve_composite(expander: &CompositeExpander) -> impl Fn(&str) -> f64 + '_ {
    move |job| if expander.identify(job).is_pair() { 0.5 } else { 1.0 }
}

/// Group already filtered rows by job and align each job to the full date
/// range of the whole set, inserting `None` values for missing days.
///
/// Rows without a date or a finite value for `value_key` are dropped and
/// counted in `dropped`.
pub fn aggregate<'r, I>(
    rows: I,
    value_key: ValueKey,
    adjustment: Option<ValueAdjustment<'_>>,
) -> AggregatedSeries
where
    I: IntoIterator<Item = &'r DataRow>,
{
    let mut by_job: BTreeMap<&str, HashMap<&CompactDate, (&DataRow, f64)>> = BTreeMap::new();
    let mut dropped = 0usize;

    for row in rows {
        let (Some(date), Some(value)) = (row.date.as_ref(), row.value(value_key)) else {
            dropped += 1;
            continue;
        };
        by_job
            .entry(row.job.as_str())
            .or_default()
            .insert(date, (row, value));
    }

    if dropped > 0 {
        tracing::debug!(dropped, key = value_key.as_str(), "Skipped rows without date or value");
    }

    let date_range = build_full_range(
        by_job
            .values()
            .flat_map(|dates| dates.keys().map(|d| d.as_str())),
    );

    let grouped = by_job
        .into_iter()
        .map(|(job, dates)| {
            let scale = adjustment.map_or(1.0, |adjust| adjust(job));
            let points = date_range
                .iter()
                .map(|date| match dates.get(date) {
                    Some((row, value)) => SeriesPoint {
                        date: date.clone(),
                        value: Some(*value * scale),
                        raw: Some((*row).clone()),
                    },
                    None => SeriesPoint {
                        date: date.clone(),
                        value: None,
                        raw: None,
                    },
                })
                .collect();
            let series = JobSeries {
                job: job.to_string(),
                points,
            };
            (job.to_string(), series)
        })
        .collect();

    AggregatedSeries {
        grouped,
        date_range,
        dropped,
    }
}
