//! Gap matrix payload builder.

use hashbrown::HashSet;
use jobstat_types::{
    ColorDomain, CompactDate, DataRow, FilterCriteria, GapMatrixCell, MatrixCategory,
    MatrixPayload, MatrixTile, ValueKey, ValueRange,
};

use super::cache::{CacheEntry, CacheKey, GapMatrixCache, PercentileValues};
use crate::composite::{CompositeExpander, normalize_selection};
use crate::config::{EngineConfig, RoleCategory};

/// Trailing category for selected jobs missing from every configured one.
pub const OTHER_ROLES: &str = "Other Roles";

/// Inputs for one payload build.
#[derive(Debug, Clone, Copy)]
pub struct MatrixRequest<'a> {
    pub rows: &'a [DataRow],
    pub filters: &'a FilterCriteria,
    pub value_key: ValueKey,
    /// Preferred snapshot dates; unknown dates are ignored.
    pub target_dates: &'a [CompactDate],
}

/// Builds gap-matrix payloads and owns the index cache between builds.
#[derive(Debug)]
pub struct GapMatrixEngine {
    config: EngineConfig,
    expander: CompositeExpander,
    ladder: Vec<u32>,
    cache: GapMatrixCache,
}

impl Default for GapMatrixEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl GapMatrixEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            expander: CompositeExpander::from_config(&config),
            ladder: config.matrix_ladder(),
            config,
            cache: GapMatrixCache::new(),
        }
    }

    /// Percentiles compared by every matrix, ascending.
    pub fn ladder(&self) -> &[u32] {
        &self.ladder
    }

    /// Drop every cached index. Call whenever the dataset is reloaded.
    pub fn clear_cache(&mut self) {
        tracing::debug!(entries = self.cache.len(), "Clearing gap matrix cache");
        self.cache.clear();
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn build_matrix_payload(&mut self, request: &MatrixRequest<'_>) -> MatrixPayload {
        let selection = normalize_selection(
            request
                .filters
                .job_names
                .as_ref()
                .map(|names| names.iter().cloned().collect::<Vec<_>>()),
        );
        let jobs = self.expander.expand_selection(&selection);
        if jobs.is_empty() {
            return empty_payload(&self.ladder);
        }
        let groups = categorize(&self.config.role_categories, &jobs);

        let key = CacheKey::new(request.filters, &jobs, request.value_key, request.rows.len());
        let hit = self.cache.get(&key).is_some();
        tracing::debug!(
            hit,
            jobs = jobs.len(),
            key = request.value_key.as_str(),
            "Gap matrix cache lookup"
        );

        let job_set: HashSet<String> = jobs.iter().cloned().collect();
        let entry = self.cache.get_or_insert_with(key, || {
            CacheEntry::build(request.rows, request.filters, &job_set, request.value_key)
        });

        let dates = resolve_dates(entry, request.target_dates);
        if dates.is_empty() {
            return empty_payload(&self.ladder);
        }

        let no_values = PercentileValues::new();
        let mut extent: Option<ValueRange> = None;
        let mut categories = Vec::new();
        for (name, members) in groups {
            let mut tiles = Vec::new();
            for job in members {
                for date in &dates {
                    // absent (job, date) pairs become all-missing tiles
                    let values = entry.values(job, date).unwrap_or(&no_values);
                    tiles.push(build_tile(job, date, values, &self.ladder, &mut extent));
                }
            }
            let populated = tiles
                .iter()
                .any(|tile| tile.populated_cells().any(|cell| !cell.is_missing));
            if populated {
                categories.push(MatrixCategory { name, tiles });
            }
        }

        MatrixPayload {
            percentiles: self.ladder.clone(),
            categories,
            color_scale: color_domain(extent),
            snapshot_dates: dates,
        }
    }
}

fn empty_payload(ladder: &[u32]) -> MatrixPayload {
    MatrixPayload {
        percentiles: ladder.to_vec(),
        ..Default::default()
    }
}

/// Group selected jobs by configured category, in configured order. Jobs in
/// no category go to a trailing [`OTHER_ROLES`] group in selection order.
fn categorize<'j>(
    categories: &[RoleCategory],
    jobs: &'j [String],
) -> Vec<(String, Vec<&'j str>)> {
    let mut placed: HashSet<&str> = HashSet::new();
    let mut groups = Vec::new();

    for category in categories {
        let members: Vec<&str> = category
            .jobs
            .iter()
            .filter_map(|job| jobs.iter().find(|j| *j == job))
            .map(|j| j.as_str())
            .filter(|j| placed.insert(*j))
            .collect();
        if !members.is_empty() {
            groups.push((category.name.clone(), members));
        }
    }

    let rest: Vec<&str> = jobs
        .iter()
        .map(|j| j.as_str())
        .filter(|j| !placed.contains(j))
        .collect();
    if !rest.is_empty() {
        groups.push((OTHER_ROLES.to_string(), rest));
    }
    groups
}

/// Requested dates that have data, or the latest available date if none do.
fn resolve_dates(entry: &CacheEntry, targets: &[CompactDate]) -> Vec<CompactDate> {
    let mut seen = HashSet::new();
    let matched: Vec<CompactDate> = targets
        .iter()
        .filter(|d| entry.has_date(d) && seen.insert(*d))
        .cloned()
        .collect();
    if !matched.is_empty() {
        return matched;
    }
    if !targets.is_empty() {
        tracing::debug!(
            requested = targets.len(),
            "No requested matrix date available, using latest"
        );
    }
    entry.latest_date().cloned().into_iter().collect()
}

fn build_tile(
    job: &str,
    date: &CompactDate,
    values: &PercentileValues,
    ladder: &[u32],
    extent: &mut Option<ValueRange>,
) -> MatrixTile {
    let n = ladder.len();
    let mut cells = vec![vec![None; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let cell = gap_cell(
                ladder[i],
                ladder[j],
                values.get(&ladder[i]).copied(),
                values.get(&ladder[j]).copied(),
            );
            if let Some(diff) = cell.raw_difference {
                *extent = ValueRange::include(*extent, diff);
            }
            cells[i][j] = Some(cell);
        }
    }
    MatrixTile {
        job: job.to_string(),
        date: date.clone(),
        cells,
    }
}

fn gap_cell(
    lower_percentile: u32,
    upper_percentile: u32,
    lower_value: Option<f64>,
    upper_value: Option<f64>,
) -> GapMatrixCell {
    let (raw_difference, percent_difference) = match (lower_value, upper_value) {
        (Some(lower), Some(upper)) => {
            let raw = upper - lower;
            let pct = (lower != 0.0).then(|| raw / lower * 100.0);
            (Some(raw), pct)
        }
        _ => (None, None),
    };
    GapMatrixCell {
        lower_percentile,
        upper_percentile,
        lower_value,
        upper_value,
        raw_difference,
        percent_difference,
        is_missing: raw_difference.is_none(),
    }
}

/// Color scale for observed raw differences, anchored at zero.
///
/// The upper bound is the largest observed difference clamped at zero, or 1
/// when nothing was observed so a linear scale stays defined.
pub fn color_domain(observed: Option<ValueRange>) -> ColorDomain {
    ColorDomain {
        min: observed.map(|r| r.min),
        max: observed.map(|r| r.max),
        domain_min: 0.0,
        domain_max: observed.map_or(1.0, |r| r.max.max(0.0)),
    }
}
