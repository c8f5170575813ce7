//! Memoized job/date/percentile index for gap-matrix builds.

use std::collections::{BTreeMap, BTreeSet};

use hashbrown::{HashMap, HashSet};
use jobstat_types::{CompactDate, DataRow, FilterCriteria, ValueKey};

use crate::filter::matches_row;

pub type PercentileValues = BTreeMap<u32, f64>;

/// Identifies one indexed slice of the dataset.
///
/// `row_count` stands in for dataset identity: a reload that keeps the same
/// length is only picked up after [`GapMatrixCache::clear`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub raid: Option<String>,
    pub boss: Option<String>,
    pub metric_type: Option<String>,
    /// Expanded job selection, sorted.
    pub jobs: Vec<String>,
    pub value_key: ValueKey,
    pub row_count: usize,
}

impl CacheKey {
    pub fn new(
        filters: &FilterCriteria,
        expanded_jobs: &[String],
        value_key: ValueKey,
        row_count: usize,
    ) -> Self {
        let mut jobs = expanded_jobs.to_vec();
        jobs.sort();
        Self {
            raid: filters.raid.clone(),
            boss: filters.boss.clone(),
            metric_type: filters.metric_type.clone(),
            jobs,
            value_key,
            row_count,
        }
    }
}

/// Values bucketed by job, date and percentile. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct CacheEntry {
    pub job_values: HashMap<String, BTreeMap<CompactDate, PercentileValues>>,
    /// Every date with at least one value, ascending.
    pub available_dates: Vec<CompactDate>,
}

impl CacheEntry {
    /// Scan `rows` once. The percentile criterion is ignored since a matrix
    /// needs every ladder value; rows lacking a date, percentile or finite
    /// value are skipped.
    pub fn build(
        rows: &[DataRow],
        filters: &FilterCriteria,
        jobs: &HashSet<String>,
        value_key: ValueKey,
    ) -> Self {
        let scan = FilterCriteria {
            percentile: None,
            ..filters.clone()
        };

        let mut job_values: HashMap<String, BTreeMap<CompactDate, PercentileValues>> =
            HashMap::new();
        let mut dates = BTreeSet::new();
        let mut skipped = 0usize;

        for row in rows.iter().filter(|r| matches_row(r, &scan, Some(jobs))) {
            let (Some(date), Some(percentile), Some(value)) =
                (row.date.as_ref(), row.percentile, row.value(value_key))
            else {
                skipped += 1;
                continue;
            };
            job_values
                .entry(row.job.clone())
                .or_default()
                .entry(date.clone())
                .or_default()
                .insert(percentile, value);
            dates.insert(date.clone());
        }

        if skipped > 0 {
            tracing::debug!(skipped, "Gap matrix index skipped incomplete rows");
        }

        Self {
            job_values,
            available_dates: dates.into_iter().collect(),
        }
    }

    pub fn values(&self, job: &str, date: &CompactDate) -> Option<&PercentileValues> {
        self.job_values.get(job)?.get(date)
    }

    pub fn latest_date(&self) -> Option<&CompactDate> {
        self.available_dates.last()
    }

    pub fn has_date(&self, date: &CompactDate) -> bool {
        self.available_dates.binary_search(date).is_ok()
    }
}

/// Long-lived cache owned by the caller. Entries are never updated in place;
/// call [`clear`](Self::clear) whenever the dataset is replaced.
#[derive(Debug, Default)]
pub struct GapMatrixCache {
    entries: HashMap<CacheKey, CacheEntry>,
}

impl GapMatrixCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn get_or_insert_with(
        &mut self,
        key: CacheKey,
        build: impl FnOnce() -> CacheEntry,
    ) -> &CacheEntry {
        self.entries.entry(key).or_insert_with(build)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
