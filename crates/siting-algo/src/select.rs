//! Per-location configuration selection.
//!
//! For each location the selector evaluates every simulated configuration under
//! the current [`LcoeParams`] and keeps one:
//!
//! 1. the cheapest configuration reaching `target_cf` (`meets_target = true`),
//! 2. otherwise the configuration with the highest `annual_cf`
//!    (`meets_target = false`).
//!
//! Independently it records the largest build, ordered by `(solar_gw,
//! batt_gwh)` descending, so a front-end can report the best achievable
//! configuration even when the target is unmet.
//!
//! Ties keep the earlier row in row order in every case: a later row only
//! replaces the current pick when it is strictly better.

use serde::Serialize;
use siting_core::{GigawattHours, Gigawatts, LcoeParams, LocationIndex, SimulationRow};
use tracing::debug;

use crate::lcoe::config_lcoe;

/// The configuration chosen for one location under one parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LcoeResult {
    #[serde(flatten)]
    pub row: SimulationRow,
    /// Currency per MWh, `f64::INFINITY` when the row serves no energy
    #[serde(serialize_with = "serialize_non_finite_as_null")]
    pub lcoe: f64,
    pub target_cf: f64,
    pub meets_target: bool,
    pub max_config_solar: Gigawatts,
    pub max_config_batt: GigawattHours,
    #[serde(serialize_with = "serialize_non_finite_as_null")]
    pub max_config_lcoe: f64,
}

impl LcoeResult {
    /// Finite and target-meeting: eligible for a finite color scale.
    pub fn is_displayable(&self) -> bool {
        self.meets_target && self.lcoe.is_finite()
    }
}

pub(crate) fn serialize_non_finite_as_null<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        serializer.serialize_none()
    }
}

struct Candidate {
    row: SimulationRow,
    lcoe: f64,
}

/// Pick the result for a single location; `None` when `rows` is empty.
pub fn select_for_location(rows: &[SimulationRow], params: &LcoeParams) -> Option<LcoeResult> {
    let mut best_meeting: Option<Candidate> = None;
    let mut best_fallback: Option<Candidate> = None;
    let mut max_config: Option<Candidate> = None;

    for row in rows {
        let lcoe = config_lcoe(row, params);

        if row.annual_cf >= params.target_cf {
            let better = best_meeting.as_ref().map_or(true, |best| lcoe < best.lcoe);
            if better {
                best_meeting = Some(Candidate { row: *row, lcoe });
            }
        }

        let better_fallback = best_fallback
            .as_ref()
            .map_or(true, |best| row.annual_cf > best.row.annual_cf);
        if better_fallback {
            best_fallback = Some(Candidate { row: *row, lcoe });
        }

        let larger = max_config.as_ref().map_or(true, |best| {
            row.solar_gw > best.row.solar_gw
                || (row.solar_gw == best.row.solar_gw && row.batt_gwh > best.row.batt_gwh)
        });
        if larger {
            max_config = Some(Candidate { row: *row, lcoe });
        }
    }

    let (chosen, meets_target) = match (best_meeting, best_fallback) {
        (Some(meeting), _) => (meeting, true),
        (None, Some(fallback)) => (fallback, false),
        (None, None) => return None,
    };
    let max_config = max_config?;

    Some(LcoeResult {
        row: chosen.row,
        lcoe: chosen.lcoe,
        target_cf: params.target_cf,
        meets_target,
        max_config_solar: max_config.row.solar_gw,
        max_config_batt: max_config.row.batt_gwh,
        max_config_lcoe: max_config.lcoe,
    })
}

/// Select one result per indexed location, in index order.
pub fn select_best_configs(index: &LocationIndex, params: &LcoeParams) -> Vec<LcoeResult> {
    let results: Vec<LcoeResult> = index
        .iter()
        .filter_map(|(_, rows)| select_for_location(rows, params))
        .collect();

    debug!(
        locations = index.len(),
        results = results.len(),
        meeting_target = results.iter().filter(|r| r.meets_target).count(),
        target_cf = params.target_cf,
        "selected best configurations"
    );
    results
}

/// Rows simulated with exactly the given build, one per location.
///
/// Used by the capacity-factor view, which shows a single fixed configuration
/// across all sites instead of the per-site optimum.
pub fn configuration_slice(
    index: &LocationIndex,
    solar_gw: Gigawatts,
    batt_gwh: GigawattHours,
) -> Vec<SimulationRow> {
    index
        .iter()
        .filter_map(|(_, rows)| {
            rows.iter()
                .find(|row| row.solar_gw == solar_gw && row.batt_gwh == batt_gwh)
                .copied()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use siting_core::LocationId;

    fn row(id: u64, solar: f64, batt: f64, cf: f64) -> SimulationRow {
        SimulationRow::new(LocationId::new(id), 10.0, 20.0, solar, batt, cf)
    }

    fn params(target_cf: f64) -> LcoeParams {
        LcoeParams::default().with_target_cf(target_cf)
    }

    #[test]
    fn test_cheapest_meeting_row_wins() {
        let rows = [
            row(1, 8.0, 16.0, 0.97),
            row(1, 5.0, 8.0, 0.92),
            row(1, 3.0, 2.0, 0.60),
        ];
        let result = select_for_location(&rows, &params(0.9)).unwrap();
        assert!(result.meets_target);
        assert_eq!(result.row.solar_gw, Gigawatts(5.0));
        assert!(result.row.annual_cf >= 0.9);
    }

    #[test]
    fn test_fallback_takes_highest_cf() {
        let rows = [
            row(1, 3.0, 2.0, 0.60),
            row(1, 5.0, 8.0, 0.85),
            row(1, 4.0, 4.0, 0.70),
        ];
        let result = select_for_location(&rows, &params(0.9)).unwrap();
        assert!(!result.meets_target);
        assert_eq!(result.row.annual_cf, 0.85);
    }

    #[test]
    fn test_fallback_tie_keeps_first_row() {
        let rows = [row(1, 3.0, 2.0, 0.5), row(1, 6.0, 1.0, 0.5)];
        let result = select_for_location(&rows, &params(0.9)).unwrap();
        assert_eq!(result.row.solar_gw, Gigawatts(3.0));
    }

    #[test]
    fn test_max_config_recorded_even_when_not_chosen() {
        let rows = [
            row(1, 5.0, 8.0, 0.92),
            row(1, 10.0, 4.0, 0.95),
            row(1, 10.0, 20.0, 0.99),
            row(1, 2.0, 40.0, 0.40),
        ];
        let result = select_for_location(&rows, &params(0.9)).unwrap();
        assert_eq!(result.row.solar_gw, Gigawatts(5.0));
        assert_eq!(result.max_config_solar, Gigawatts(10.0));
        assert_eq!(result.max_config_batt, GigawattHours(20.0));
        assert_eq!(result.max_config_lcoe, config_lcoe(&rows[2], &params(0.9)));
    }

    #[test]
    fn test_identical_max_config_first_row_wins() {
        let rows = [row(1, 10.0, 20.0, 0.80), row(1, 10.0, 20.0, 0.95)];
        let result = select_for_location(&rows, &params(0.9)).unwrap();
        assert_eq!(result.max_config_lcoe, config_lcoe(&rows[0], &params(0.9)));
    }

    #[test]
    fn test_zero_cf_only_location_falls_back_with_infinite_lcoe() {
        let rows = [row(1, 1.0, 0.0, 0.0)];
        let result = select_for_location(&rows, &params(0.5)).unwrap();
        assert!(!result.meets_target);
        assert!(result.lcoe.is_infinite());
        assert!(!result.is_displayable());
    }

    #[test]
    fn test_target_zero_accepts_zero_cf_but_prefers_finite() {
        let rows = [row(1, 1.0, 0.0, 0.0), row(1, 1.0, 1.0, 0.3)];
        let result = select_for_location(&rows, &params(0.0)).unwrap();
        assert!(result.meets_target);
        assert!(result.lcoe.is_finite());
    }

    #[test]
    fn test_empty_rows_yield_nothing() {
        assert!(select_for_location(&[], &params(0.9)).is_none());
    }

    #[test]
    fn test_one_result_per_location() {
        let index = LocationIndex::build(vec![
            row(1, 5.0, 8.0, 0.92),
            row(2, 5.0, 8.0, 0.40),
            row(1, 3.0, 4.0, 0.75),
            row(3, 1.0, 0.0, 0.0),
        ]);
        let results = select_best_configs(&index, &params(0.9));
        assert_eq!(results.len(), 3);
        let ids: Vec<u64> = results.iter().map(|r| r.row.location_id.value()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_configuration_slice() {
        let index = LocationIndex::build(vec![
            row(1, 5.0, 8.0, 0.92),
            row(1, 3.0, 4.0, 0.75),
            row(2, 3.0, 4.0, 0.55),
        ]);
        let slice = configuration_slice(&index, Gigawatts(3.0), GigawattHours(4.0));
        assert_eq!(slice.len(), 2);
        let slice = configuration_slice(&index, Gigawatts(5.0), GigawattHours(8.0));
        assert_eq!(slice.len(), 1);
    }

    #[test]
    fn test_result_serializes_infinite_lcoe_as_null() {
        let result = select_for_location(&[row(1, 1.0, 0.0, 0.0)], &params(0.5)).unwrap();
        let json = serde_json::to_value(result).unwrap();
        assert!(json["lcoe"].is_null());
        assert_eq!(json["location_id"], 1);
        assert_eq!(json["meets_target"], false);
    }
}
