//! Row predicate over raid, boss, metric type, job and percentile.

use hashbrown::HashSet;
use jobstat_types::{DataRow, FilterCriteria};

use crate::composite::CompositeExpander;

/// Match `row` against `criteria`.
///
/// Jobs are checked against `expanded_jobs` when given, otherwise against the
/// literal `criteria.job_names`. Absent criteria match anything; an empty job
/// set matches nothing.
pub fn matches_row(
    row: &DataRow,
    criteria: &FilterCriteria,
    expanded_jobs: Option<&HashSet<String>>,
) -> bool {
    if criteria.raid.as_ref().is_some_and(|r| *r != row.raid) {
        return false;
    }
    if criteria.boss.as_ref().is_some_and(|b| *b != row.boss) {
        return false;
    }
    if let Some(metric) = &criteria.metric_type {
        if row.metric_type.as_ref() != Some(metric) {
            return false;
        }
    }
    if let Some(p) = criteria.percentile {
        if row.percentile != Some(p) {
            return false;
        }
    }
    match (expanded_jobs, &criteria.job_names) {
        (Some(jobs), _) => jobs.contains(row.job.as_str()),
        (None, Some(names)) => names.contains(&row.job),
        (None, None) => true,
    }
}

/// A filter with its job set resolved once, for use across a whole scan.
#[derive(Debug, Clone)]
pub struct RowFilter<'a> {
    criteria: &'a FilterCriteria,
    expanded_jobs: Option<HashSet<String>>,
}

impl<'a> RowFilter<'a> {
    /// Match job names literally, as DPS plots do.
    pub fn literal(criteria: &'a FilterCriteria) -> Self {
        Self {
            criteria,
            expanded_jobs: None,
        }
    }

    /// Match composite selections by their constituent jobs, so a pair
    /// selection also surfaces each partner's own rows.
    pub fn expanded(criteria: &'a FilterCriteria, expander: &CompositeExpander) -> Self {
        let expanded_jobs = criteria.job_names.as_ref().map(|names| {
            let names: Vec<&String> = names.iter().collect();
            expander.expand_selection(&names).into_iter().collect()
        });
        Self {
            criteria,
            expanded_jobs,
        }
    }

    pub fn matches(&self, row: &DataRow) -> bool {
        matches_row(row, self.criteria, self.expanded_jobs.as_ref())
    }

    pub fn apply<'r>(&self, rows: &'r [DataRow]) -> Vec<&'r DataRow> {
        rows.iter().filter(|r| self.matches(r)).collect()
    }
}
