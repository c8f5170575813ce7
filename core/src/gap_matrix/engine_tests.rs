//! Tests for the gap matrix engine
//!
//! Covers cell arithmetic, triangularity, date resolution, category layout,
//! color domain anchoring and cache behavior.

use jobstat_types::{CompactDate, DataRow, FilterCriteria, MatrixPayload, ValueKey, ValueRange};

use super::engine::{GapMatrixEngine, MatrixRequest, OTHER_ROLES, color_domain};
use crate::config::EngineConfig;

fn row(job: &str, date: &str, percentile: u32, dps: f64) -> DataRow {
    DataRow::new("Arcadion", "M1", date, job, percentile).with_dps(dps)
}

fn date(s: &str) -> CompactDate {
    CompactDate::parse(s).unwrap()
}

fn build(
    engine: &mut GapMatrixEngine,
    rows: &[DataRow],
    filters: &FilterCriteria,
    target_dates: &[CompactDate],
) -> MatrixPayload {
    engine.build_matrix_payload(&MatrixRequest {
        rows,
        filters,
        value_key: ValueKey::Dps,
        target_dates,
    })
}

/// Ladder position of a percentile in the default matrix ladder
fn pos(engine: &GapMatrixEngine, percentile: u32) -> usize {
    engine.ladder().iter().position(|p| *p == percentile).unwrap()
}

#[test]
fn test_end_to_end_single_gap() {
    let rows = vec![row("X", "20240101", 10, 100.0), row("X", "20240101", 90, 400.0)];
    let mut engine = GapMatrixEngine::default();
    let filters = FilterCriteria::new().with_jobs(["X"]);

    let payload = build(&mut engine, &rows, &filters, &[]);

    assert_eq!(payload.categories.len(), 1);
    assert_eq!(payload.categories[0].name, OTHER_ROLES);
    let tile = &payload.categories[0].tiles[0];
    let cell = tile.cell(pos(&engine, 10), pos(&engine, 90)).unwrap();
    assert_eq!(cell.raw_difference, Some(300.0));
    assert_eq!(cell.percent_difference, Some(300.0));
    assert!(!cell.is_missing);

    assert_eq!(payload.color_scale.domain_min, 0.0);
    assert_eq!(payload.color_scale.domain_max, 300.0);
    assert_eq!(payload.snapshot_dates, vec![date("20240101")]);
}

#[test]
fn test_missing_inputs_mark_cell_missing() {
    let rows = vec![row("X", "20240101", 10, 100.0), row("X", "20240101", 20, 120.0)];
    let mut engine = GapMatrixEngine::default();
    let payload = build(&mut engine, &rows, &FilterCriteria::new().with_jobs(["X"]), &[]);

    let tile = &payload.categories[0].tiles[0];
    let cell = tile.cell(pos(&engine, 10), pos(&engine, 50)).unwrap();
    assert!(cell.is_missing);
    assert_eq!(cell.lower_value, Some(100.0));
    assert_eq!(cell.upper_value, None);
    assert_eq!(cell.raw_difference, None);
    assert_eq!(cell.percent_difference, None);
}

#[test]
fn test_category_without_complete_cell_is_omitted() {
    let rows = vec![row("X", "20240101", 10, 100.0)];
    let mut engine = GapMatrixEngine::default();
    let payload = build(&mut engine, &rows, &FilterCriteria::new().with_jobs(["X"]), &[]);

    assert!(payload.is_empty());
    assert_eq!(payload.snapshot_dates, vec![date("20240101")]);
    // nothing observed: domain falls back to 1
    assert_eq!(payload.color_scale.domain_max, 1.0);
    assert_eq!(payload.color_scale.max, None);
}

#[test]
fn test_job_absent_on_requested_date_gets_missing_tile() {
    let rows = vec![
        row("Ninja", "20240101", 10, 100.0),
        row("Ninja", "20240101", 90, 400.0),
        row("Bard", "20240102", 10, 50.0),
        row("Bard", "20240102", 90, 80.0),
    ];
    let filters = FilterCriteria::new().with_jobs(["Ninja", "Bard"]);
    let mut engine = GapMatrixEngine::default();
    let payload = build(
        &mut engine,
        &rows,
        &filters,
        &[date("20240101"), date("20240102")],
    );

    let names: Vec<&str> = payload.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Melee DPS", "Physical Ranged DPS"]);
    for category in &payload.categories {
        let tiles: Vec<&str> = category.tiles.iter().map(|t| t.date.as_str()).collect();
        assert_eq!(tiles, vec!["20240101", "20240102"]);
    }

    let ninja_absent = &payload.categories[0].tiles[1];
    assert_eq!(ninja_absent.job, "Ninja");
    let n = payload.percentiles.len();
    assert_eq!(ninja_absent.populated_cells().count(), n * (n - 1) / 2);
    assert!(ninja_absent.populated_cells().all(|c| c.is_missing));

    let bard_absent = &payload.categories[1].tiles[0];
    assert_eq!(bard_absent.job, "Bard");
    assert!(bard_absent.populated_cells().all(|c| c.is_missing));
    assert_eq!(payload.color_scale.domain_max, 300.0);
}

#[test]
fn test_zero_lower_value_has_no_percent() {
    let rows = vec![row("X", "20240101", 10, 0.0), row("X", "20240101", 20, 50.0)];
    let mut engine = GapMatrixEngine::default();
    let payload = build(&mut engine, &rows, &FilterCriteria::new().with_jobs(["X"]), &[]);

    let cell = payload.categories[0].tiles[0]
        .cell(pos(&engine, 10), pos(&engine, 20))
        .unwrap();
    assert_eq!(cell.raw_difference, Some(50.0));
    assert_eq!(cell.percent_difference, None);
    assert!(!cell.is_missing);
}

#[test]
fn test_matrix_is_strictly_upper_triangular() {
    let rows: Vec<DataRow> = [10, 20, 30, 40, 50, 60, 70, 80, 90, 95, 99]
        .iter()
        .map(|p| row("Ninja", "20240101", *p, *p as f64 * 100.0))
        .collect();
    let mut engine = GapMatrixEngine::default();
    let payload = build(&mut engine, &rows, &FilterCriteria::new().with_jobs(["Ninja"]), &[]);

    let tile = &payload.categories[0].tiles[0];
    let n = payload.percentiles.len();
    assert_eq!(tile.populated_cells().count(), n * (n - 1) / 2);
    for cell in tile.populated_cells() {
        assert!(cell.upper_percentile > cell.lower_percentile);
    }
    for i in 0..n {
        for j in 0..=i {
            assert!(tile.cell(i, j).is_none());
            assert!(tile.cells[i][j].is_none());
        }
    }
}

#[test]
fn test_payload_ladder_excludes_extremes() {
    let rows = vec![
        row("Ninja", "20240101", 0, 1.0),
        row("Ninja", "20240101", 100, 1_000.0),
    ];
    let mut engine = GapMatrixEngine::default();
    let payload = build(&mut engine, &rows, &FilterCriteria::new().with_jobs(["Ninja"]), &[]);

    assert!(!payload.percentiles.contains(&0));
    assert!(!payload.percentiles.contains(&100));
    // only extreme values present: no complete cell, so no category
    assert!(payload.is_empty());
    assert_eq!(payload.color_scale.domain_max, 1.0);
}

#[test]
fn test_color_domain_anchored_at_zero() {
    let domain = color_domain(Some(ValueRange { min: 50.0, max: 300.0 }));
    assert_eq!(domain.domain_min, 0.0);
    assert_eq!(domain.domain_max, 300.0);
    assert_eq!(domain.min, Some(50.0));

    let negative = color_domain(Some(ValueRange { min: -80.0, max: -10.0 }));
    assert_eq!(negative.domain_max, 0.0);

    let empty = color_domain(None);
    assert_eq!((empty.domain_min, empty.domain_max), (0.0, 1.0));
}

#[test]
fn test_target_dates_and_fallback() {
    let rows: Vec<DataRow> = ["20240101", "20240105", "20240110"]
        .iter()
        .flat_map(|d| [row("Ninja", d, 10, 100.0), row("Ninja", d, 90, 150.0)])
        .collect();
    let filters = FilterCriteria::new().with_jobs(["Ninja"]);
    let mut engine = GapMatrixEngine::default();

    let payload = build(
        &mut engine,
        &rows,
        &filters,
        &[date("20240105"), date("20240103"), date("20240101"), date("20240105")],
    );
    assert_eq!(payload.snapshot_dates, vec![date("20240105"), date("20240101")]);
    assert_eq!(payload.categories[0].tiles.len(), 2);

    let payload = build(&mut engine, &rows, &filters, &[date("20240301")]);
    assert_eq!(payload.snapshot_dates, vec![date("20240110")]);
}

#[test]
fn test_categories_follow_config_order() {
    let rows: Vec<DataRow> = ["Bard", "Paladin", "Sage", "Blue Mage"]
        .iter()
        .flat_map(|job| [row(job, "20240101", 10, 1.0), row(job, "20240101", 20, 2.0)])
        .collect();
    let filters = FilterCriteria::new().with_jobs(["Blue Mage", "Bard", "Sage", "Paladin", "Monk"]);
    let mut engine = GapMatrixEngine::default();
    let payload = build(&mut engine, &rows, &filters, &[]);

    let names: Vec<&str> = payload.categories.iter().map(|c| c.name.as_str()).collect();
    // Monk selected but has no rows: Melee DPS omitted
    assert_eq!(
        names,
        vec!["Tanks", "Healers", "Physical Ranged DPS", OTHER_ROLES]
    );
    assert_eq!(payload.categories[3].tiles[0].job, "Blue Mage");
}

#[test]
fn test_composite_selection_expands_to_parts() {
    let rows = vec![
        row("Scholar", "20240101", 10, 1.0),
        row("Scholar", "20240101", 20, 2.0),
        row("Sage", "20240101", 10, 2.0),
        row("Sage", "20240101", 20, 3.0),
    ];
    let filters = FilterCriteria::new().with_jobs(["Scholar+Sage"]);
    let mut engine = GapMatrixEngine::default();
    let payload = build(&mut engine, &rows, &filters, &[]);

    assert_eq!(payload.categories.len(), 1);
    let jobs: Vec<&str> = payload.categories[0].tiles.iter().map(|t| t.job.as_str()).collect();
    assert_eq!(jobs, vec!["Scholar", "Sage"]);
}

#[test]
fn test_empty_selection_or_data_gives_empty_payload() {
    let rows = vec![row("Ninja", "20240101", 10, 1.0)];
    let mut engine = GapMatrixEngine::default();

    let payload = build(&mut engine, &rows, &FilterCriteria::new(), &[]);
    assert!(payload.is_empty());
    assert!(payload.snapshot_dates.is_empty());
    assert_eq!(payload.color_scale.domain_max, 1.0);
    assert_eq!(engine.cache_len(), 0);

    let filters = FilterCriteria::new().with_jobs(["Ninja"]).with_boss("M2");
    let payload = build(&mut engine, &rows, &filters, &[]);
    assert!(payload.is_empty());
    assert_eq!(payload.percentiles, engine.ladder().to_vec());
}

#[test]
fn test_cache_reused_until_cleared() {
    let rows = vec![row("Ninja", "20240101", 10, 100.0), row("Ninja", "20240101", 20, 150.0)];
    let filters = FilterCriteria::new().with_jobs(["Ninja"]);
    let mut engine = GapMatrixEngine::default();

    build(&mut engine, &rows, &filters, &[]);
    build(&mut engine, &rows, &filters, &[date("20240101")]);
    assert_eq!(engine.cache_len(), 1);

    // same length, different content: stale until cleared
    let replaced = vec![row("Ninja", "20240101", 10, 100.0), row("Ninja", "20240101", 20, 500.0)];
    let stale = build(&mut engine, &replaced, &filters, &[]);
    assert_eq!(stale.color_scale.domain_max, 50.0);

    engine.clear_cache();
    let fresh = build(&mut engine, &replaced, &filters, &[]);
    assert_eq!(fresh.color_scale.domain_max, 400.0);
}

#[test]
fn test_custom_ladder_from_config() {
    let config = EngineConfig {
        percentile_ladder: vec![0, 25, 50, 75, 100],
        ..EngineConfig::default()
    };
    let mut engine = GapMatrixEngine::new(config);
    let rows = vec![row("Ninja", "20240101", 25, 10.0), row("Ninja", "20240101", 75, 30.0)];
    let payload = build(&mut engine, &rows, &FilterCriteria::new().with_jobs(["Ninja"]), &[]);

    assert_eq!(payload.percentiles, vec![25, 50, 75]);
    let tile = &payload.categories[0].tiles[0];
    assert_eq!(tile.cell(0, 2).and_then(|c| c.raw_difference), Some(20.0));
    assert!(tile.cell(0, 1).is_some_and(|c| c.is_missing));
}
