//! End-to-end checks over a small synthetic dataset: rows → selection →
//! comparison → legend → color → tessellation.

use siting_algo::{
    build_legend, compare_all, fill_color, padded_bounds, project_sites, select_best_configs,
    tessellate, ColorScale, ComparisonMetric, LegendSettings, Projection, TransmissionAssumptions,
    WebMercatorViewport, NO_DATA,
};
use siting_core::{LcoeParams, LocationId, LocationIndex, SimulationRow};

/// A 5×4 grid of locations, each with a ladder of configurations whose CF
/// depends on latitude.
fn synthetic_rows() -> Vec<SimulationRow> {
    let mut rows = Vec::new();
    let mut id = 0;
    for i in 0..5 {
        for j in 0..4 {
            id += 1;
            let lat = 20.0 + i as f64 * 2.5;
            let lon = -115.0 + j as f64 * 3.0;
            let quality = 0.55 + 0.08 * i as f64 + 0.01 * j as f64;
            for (solar, batt) in [(1.0, 0.0), (3.0, 4.0), (5.0, 8.0), (8.0, 16.0), (10.0, 24.0)] {
                let cf = (quality * (0.4 + solar / 16.0 + batt / 80.0)).min(1.0);
                rows.push(SimulationRow::new(LocationId::new(id), lat, lon, solar, batt, cf));
            }
        }
    }
    // One location with no usable output at all.
    rows.push(SimulationRow::new(LocationId::new(99), 10.0, -100.0, 1.0, 0.0, 0.0));
    rows
}

#[test]
fn test_one_result_per_location_with_consistent_target_flag() {
    let rows = synthetic_rows();
    let index = LocationIndex::build(rows.clone());
    let params = LcoeParams::default();
    let results = select_best_configs(&index, &params);

    assert_eq!(results.len(), index.len());
    for result in &results {
        let location_rows = index.rows(result.row.location_id);
        let max_cf = location_rows
            .iter()
            .map(|r| r.annual_cf)
            .fold(f64::NEG_INFINITY, f64::max);
        if result.meets_target {
            assert!(result.row.annual_cf >= params.target_cf);
        } else {
            assert_eq!(result.row.annual_cf, max_cf);
        }
    }

    let dead = results
        .iter()
        .find(|r| r.row.location_id == LocationId::new(99))
        .unwrap();
    assert!(dead.lcoe.is_infinite());
    assert!(!dead.meets_target);
}

#[test]
fn test_delta_antisymmetric_across_dataset() {
    let index = LocationIndex::build(synthetic_rows());
    let results = select_best_configs(&index, &LcoeParams::default().with_target_cf(0.7));
    let tx = TransmissionAssumptions::default();

    let a = &results[0];
    let b = &results[7];
    let from_a = compare_all(&results, Some(a), &tx);
    let from_b = compare_all(&results, Some(b), &tx);
    assert_eq!(from_a[7].delta().unwrap(), -from_b[0].delta().unwrap());
}

#[test]
fn test_legend_strictly_increasing_in_every_mode() {
    let index = LocationIndex::build(synthetic_rows());
    let settings = LegendSettings::default();

    for target in [0.5, 0.7, 0.9, 0.99] {
        let results = select_best_configs(&index, &LcoeParams::default().with_target_cf(target));
        let reference = results.iter().find(|r| r.is_displayable());

        let absolute = build_legend(
            &compare_all(&results, None, &TransmissionAssumptions::default()),
            None,
            ComparisonMetric::Delta,
            &settings,
        );
        let mut legends = vec![absolute];
        if let Some(reference) = reference {
            let points = compare_all(&results, Some(reference), &TransmissionAssumptions::default());
            for metric in [ComparisonMetric::Delta, ComparisonMetric::Transmission] {
                legends.push(build_legend(&points, Some(reference), metric, &settings));
            }
        }

        for legend in legends {
            for pair in legend.breakpoints.windows(2) {
                assert!(pair[1] > pair[0], "target {target}: {:?}", legend.breakpoints);
            }
        }
    }
}

#[test]
fn test_unmet_results_render_as_no_data() {
    let index = LocationIndex::build(synthetic_rows());
    let results = select_best_configs(&index, &LcoeParams::default());
    let points = compare_all(&results, None, &TransmissionAssumptions::default());
    let legend = build_legend(&points, None, ComparisonMetric::Delta, &LegendSettings::default());
    let scale = ColorScale::for_legend(&legend);

    for point in &points {
        let fill = fill_color(point, &legend, &scale);
        if !point.result.is_displayable() {
            assert_eq!(fill, NO_DATA);
        }
    }
}

#[test]
fn test_tessellation_covers_every_projected_location() {
    let index = LocationIndex::build(synthetic_rows());
    let results = select_best_configs(&index, &LcoeParams::default());

    let view = WebMercatorViewport::new(25.0, -110.0, 4.0, 1024.0, 768.0);
    let sites = project_sites(
        &view,
        results
            .iter()
            .map(|r| (r.row.location_id, r.row.latitude, r.row.longitude)),
    );
    assert_eq!(sites.len(), results.len());

    let (w, h) = view.viewport_size();
    let cells = tessellate(&sites, padded_bounds(w, h, 1.0), None);
    assert_eq!(cells.len(), sites.len());
    assert!(cells.iter().all(|c| !c.svg_path().is_empty()));
}
