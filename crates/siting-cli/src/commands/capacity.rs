//! `siting capacity`: one fixed build across every location.

use anyhow::{bail, Result};
use serde::Serialize;
use siting_algo::{configuration_slice, ColorScale, Rgb};
use siting_core::{Diagnostics, GigawattHours, Gigawatts, LocationId, LocationIndex};
use std::path::PathBuf;
use tracing::info;

use crate::commands::util::{load_rows, report_diagnostics, write_json};

#[derive(Debug, Serialize)]
struct CapacityPoint {
    location_id: LocationId,
    latitude: f64,
    longitude: f64,
    annual_cf: f64,
    fill: Rgb,
}

pub fn handle(rows: &PathBuf, solar: f64, batt: f64, out: Option<&PathBuf>) -> Result<()> {
    if !solar.is_finite() || !batt.is_finite() || solar < 0.0 || batt < 0.0 {
        bail!("--solar and --batt must be finite and non-negative");
    }

    let mut diagnostics = Diagnostics::new();
    let index = LocationIndex::build_sanitized(load_rows(rows)?, &mut diagnostics);
    report_diagnostics(&diagnostics);

    let scale = ColorScale::capacity_factor();
    let points: Vec<CapacityPoint> = configuration_slice(&index, Gigawatts(solar), GigawattHours(batt))
        .into_iter()
        .map(|row| CapacityPoint {
            location_id: row.location_id,
            latitude: row.latitude,
            longitude: row.longitude,
            annual_cf: row.annual_cf,
            fill: scale.color(row.annual_cf),
        })
        .collect();

    info!(
        locations = index.len(),
        matched = points.len(),
        solar_gw = solar,
        batt_gwh = batt,
        "capacity slice complete"
    );
    write_json(&points, out)
}
