use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use jobstat_core::config::EngineConfig;
use jobstat_core::dataset::{DatasetSummary, available_dates, load_rows};
use jobstat_core::{
    CompactDate, CompositeExpander, DataRow, FilterCriteria, GapMatrixEngine, MatrixRequest,
    RowFilter, SnapshotOptions, ValueKey, aggregate, build_snapshot, halve_composite,
    normalize_selection,
};

use crate::render;

/// Dataset location and the filters shared by every query command.
#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    #[arg(short, long)]
    pub data: PathBuf,
    #[arg(long)]
    pub raid: Option<String>,
    #[arg(long)]
    pub boss: Option<String>,
    #[arg(long)]
    pub metric_type: Option<String>,
    /// Job or composite pair ("Scholar+Sage", "Sage (x2)"); repeatable
    #[arg(long = "job")]
    pub jobs: Vec<String>,
}

impl FilterArgs {
    pub fn criteria(&self) -> FilterCriteria {
        let jobs = normalize_selection(self.jobs.clone());
        FilterCriteria {
            raid: self.raid.clone(),
            boss: self.boss.clone(),
            metric_type: self.metric_type.clone(),
            job_names: (!jobs.is_empty()).then(|| jobs.into_iter().collect()),
            percentile: None,
        }
    }

    /// Whether any row filter beyond the dataset path was given.
    pub fn is_filtered(&self) -> bool {
        self.raid.is_some()
            || self.boss.is_some()
            || self.metric_type.is_some()
            || !self.jobs.is_empty()
    }

    fn rows(&self) -> Result<Vec<DataRow>, String> {
        load_rows(&self.data).map_err(|e| e.to_string())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub json: bool,
    pub european: bool,
}

fn value_key(hps: bool) -> ValueKey {
    if hps { ValueKey::Hps } else { ValueKey::Dps }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| e.to_string())
}

fn parse_date(s: &str) -> Result<CompactDate, String> {
    CompactDate::parse(s).ok_or_else(|| format!("error: invalid date {s:?}, expected YYYYMMDD"))
}

pub fn summary(filters: &FilterArgs, render: RenderOptions) -> Result<String, String> {
    let rows = filters.rows()?;
    let mut summary = DatasetSummary::from_rows(&rows);
    if filters.is_filtered() {
        summary.dates = available_dates(&rows, &filters.criteria());
    }
    if render.json {
        to_json(&summary)
    } else {
        Ok(render::summary(&summary))
    }
}

pub fn series(
    filters: &FilterArgs,
    percentile: u32,
    hps: bool,
    halve_pairs: bool,
    config: &EngineConfig,
    render: RenderOptions,
) -> Result<String, String> {
    let rows = filters.rows()?;
    let criteria = filters.criteria().with_percentile(percentile);
    let matched = RowFilter::literal(&criteria).apply(&rows);

    let expander = CompositeExpander::from_config(config);
    let halve = halve_composite(&expander);
    let adjustment = halve_pairs.then_some(&halve as &dyn Fn(&str) -> f64);
    let result = aggregate(matched, value_key(hps), adjustment);
    tracing::info!(
        jobs = result.grouped.len(),
        days = result.date_range.len(),
        dropped = result.dropped,
        "Built series"
    );

    if render.json {
        to_json(&result)
    } else {
        Ok(render::series(&result, render.european))
    }
}

pub fn snapshot(
    filters: &FilterArgs,
    date: Option<&str>,
    include_extremes: bool,
    hps: bool,
    expand: bool,
    config: &EngineConfig,
    render: RenderOptions,
) -> Result<String, String> {
    let rows = filters.rows()?;
    let options = SnapshotOptions {
        value_key: value_key(hps),
        include_extremes,
        target_date: date.map(parse_date).transpose()?,
        expand_jobs: expand,
    };
    let snapshot = build_snapshot(&rows, &filters.criteria(), &options, config);

    if render.json {
        to_json(&snapshot)
    } else {
        Ok(render::snapshot(&snapshot, render.european))
    }
}

pub fn matrix(
    filters: &FilterArgs,
    dates: &[String],
    hps: bool,
    config: EngineConfig,
    render: RenderOptions,
) -> Result<String, String> {
    let rows = filters.rows()?;
    let target_dates = dates
        .iter()
        .map(|d| parse_date(d))
        .collect::<Result<Vec<_>, _>>()?;
    let criteria = filters.criteria();

    let mut engine = GapMatrixEngine::new(config);
    let payload = engine.build_matrix_payload(&MatrixRequest {
        rows: &rows,
        filters: &criteria,
        value_key: value_key(hps),
        target_dates: &target_dates,
    });

    if render.json {
        to_json(&payload)
    } else {
        Ok(render::matrix(&payload, render.european))
    }
}
