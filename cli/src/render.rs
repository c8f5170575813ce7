//! Plain-text rendering of engine results.

use std::fmt::Write;

use jobstat_core::dataset::DatasetSummary;
use jobstat_core::formatting::{
    format_compact, format_compact_date, format_optional, format_pct, format_percentile,
    format_signed_compact,
};
use jobstat_core::{AggregatedSeries, MatrixPayload, PercentileSnapshot};

pub fn summary(summary: &DatasetSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Rows: {}", summary.row_count);
    for (raid, bosses) in &summary.raids {
        let bosses: Vec<&str> = bosses.iter().map(String::as_str).collect();
        let _ = writeln!(out, "Raid {raid}: {}", bosses.join(", "));
    }
    if !summary.metric_types.is_empty() {
        let metrics: Vec<&str> = summary.metric_types.iter().map(String::as_str).collect();
        let _ = writeln!(out, "Metric types: {}", metrics.join(", "));
    }
    let jobs: Vec<&str> = summary.jobs.iter().map(String::as_str).collect();
    let _ = writeln!(out, "Jobs ({}): {}", jobs.len(), jobs.join(", "));
    let percentiles: Vec<String> = summary
        .percentiles
        .iter()
        .map(|p| format_percentile(*p))
        .collect();
    let _ = writeln!(out, "Percentiles: {}", percentiles.join(" "));
    match (summary.dates.first(), summary.dates.last()) {
        (Some(first), Some(last)) => {
            let _ = write!(
                out,
                "Dates: {} .. {} ({} days with data)",
                format_compact_date(first.as_str()),
                format_compact_date(last.as_str()),
                summary.dates.len()
            );
        }
        _ => out.push_str("Dates: none"),
    }
    out
}

/// One line per job, one column per day of the shared calendar.
pub fn series(series: &AggregatedSeries, european: bool) -> String {
    if series.grouped.is_empty() {
        return "No data".to_string();
    }
    let width = job_width(series.grouped.keys());

    let mut out = String::new();
    let _ = write!(out, "{:width$}", "");
    for date in &series.date_range {
        let _ = write!(out, " {:>10}", format_compact_date(date.as_str()));
    }
    for (job, job_series) in &series.grouped {
        let _ = write!(out, "\n{job:width$}");
        for point in &job_series.points {
            let _ = write!(out, " {:>10}", format_optional(point.value, european));
        }
    }
    if series.dropped > 0 {
        let _ = write!(out, "\n({} rows without date or value skipped)", series.dropped);
    }
    out
}

/// One line per job, one column per visible percentile bucket.
pub fn snapshot(snapshot: &PercentileSnapshot, european: bool) -> String {
    let Some(date) = &snapshot.selected_date else {
        return "No data".to_string();
    };
    let width = job_width(snapshot.series.keys());

    let mut out = format!("Date: {}\n", format_compact_date(date.as_str()));
    let _ = write!(out, "{:width$}", "");
    for bucket in &snapshot.buckets {
        let _ = write!(out, " {:>9}", format_percentile(*bucket));
    }
    for (job, values) in &snapshot.series {
        let _ = write!(out, "\n{job:width$}");
        for bucket in &snapshot.buckets {
            let _ = write!(
                out,
                " {:>9}",
                format_optional(values.get(bucket).copied(), european)
            );
        }
    }
    if let Some(range) = snapshot.value_range {
        let _ = write!(
            out,
            "\nRange: {} .. {}",
            format_compact(range.min, european),
            format_compact(range.max, european)
        );
    }
    out
}

/// Every populated cell of every tile, grouped by category.
pub fn matrix(payload: &MatrixPayload, european: bool) -> String {
    if payload.is_empty() {
        return "No data".to_string();
    }

    let mut out = String::new();
    for category in &payload.categories {
        let _ = writeln!(out, "== {} ==", category.name);
        for tile in &category.tiles {
            let _ = writeln!(
                out,
                "{} @ {}",
                tile.job,
                format_compact_date(tile.date.as_str())
            );
            for cell in tile.populated_cells().filter(|c| !c.is_missing) {
                let raw = cell
                    .raw_difference
                    .map(|v| format_signed_compact(v, european))
                    .unwrap_or_else(|| "-".to_string());
                let pct = cell
                    .percent_difference
                    .map(|v| format_pct(v, european))
                    .unwrap_or_else(|| "-".to_string());
                let _ = writeln!(
                    out,
                    "  {:>4} -> {:<4} {:>10} {:>9}",
                    format_percentile(cell.lower_percentile),
                    format_percentile(cell.upper_percentile),
                    raw,
                    pct
                );
            }
        }
    }
    let scale = &payload.color_scale;
    let _ = write!(
        out,
        "Color domain: {} .. {}",
        format_compact(scale.domain_min, european),
        format_compact(scale.domain_max, european)
    );
    out
}

fn job_width<'a>(jobs: impl Iterator<Item = &'a String>) -> usize {
    jobs.map(|j| j.chars().count()).max().unwrap_or(0).max(4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobstat_core::config::EngineConfig;
    use jobstat_core::{
        CompactDate, DataRow, FilterCriteria, GapMatrixEngine, MatrixRequest, SnapshotOptions,
        ValueKey, aggregate, build_snapshot,
    };

    fn rows() -> Vec<DataRow> {
        vec![
            DataRow::new("Arcadion", "M1", "20240101", "Ninja", 10).with_dps(10_000.0),
            DataRow::new("Arcadion", "M1", "20240101", "Ninja", 90).with_dps(15_000.0),
            DataRow::new("Arcadion", "M1", "20240103", "Ninja", 10).with_dps(11_000.0),
        ]
    }

    #[test]
    fn test_series_marks_gaps() {
        let rows = rows();
        let p10: Vec<&DataRow> = rows.iter().filter(|r| r.percentile == Some(10)).collect();
        let text = series(&aggregate(p10, ValueKey::Dps, None), false);
        assert!(text.contains("2024-01-02"));
        let ninja: Vec<&str> = text
            .lines()
            .find(|l| l.starts_with("Ninja"))
            .unwrap()
            .split_whitespace()
            .collect();
        assert_eq!(ninja, vec!["Ninja", "10.00K", "-", "11.00K"]);
    }

    #[test]
    fn test_snapshot_table() {
        let snap = build_snapshot(
            &rows(),
            &FilterCriteria::new(),
            &SnapshotOptions::default(),
            &EngineConfig::default(),
        );
        let text = snapshot(&snap, true);
        assert!(text.starts_with("Date: 2024-01-03"));
        assert!(text.contains("p10"));
        assert!(text.contains("11,00K"));
    }

    #[test]
    fn test_matrix_lists_present_cells() {
        let rows = rows();
        let filters = FilterCriteria::new().with_jobs(["Ninja"]);
        let dates = [
            CompactDate::parse("20240101").unwrap(),
            CompactDate::parse("20240103").unwrap(),
        ];
        let mut engine = GapMatrixEngine::default();
        let payload = engine.build_matrix_payload(&MatrixRequest {
            rows: &rows,
            filters: &filters,
            value_key: ValueKey::Dps,
            target_dates: &dates,
        });
        let text = matrix(&payload, false);
        assert!(text.contains("== Melee DPS =="));
        assert!(text.contains("Ninja @ 2024-01-01"));
        // 20240103 only has p10: tile listed without complete cells
        assert!(text.contains("Ninja @ 2024-01-03"));
        assert_eq!(text.matches("->").count(), 1);
        assert!(text.contains("p10 -> p90"));
        assert!(text.ends_with("Color domain: 0 .. 5.00K"));
    }

    #[test]
    fn test_empty_results() {
        assert_eq!(
            snapshot(&PercentileSnapshot::default(), false),
            "No data"
        );
        assert_eq!(matrix(&MatrixPayload::default(), false), "No data");
    }
}
