//! Adaptive legend domains.
//!
//! The color legend is derived from the current population of results rather
//! than fixed bounds, so the scale stays informative as cost assumptions move.
//!
//! | Kind | When | Breakpoints |
//! |------|------|-------------|
//! | [`LegendKind::Absolute`] | no reference | p0, p33, p67, p100 of displayable LCOE |
//! | [`LegendKind::Delta`] | reference, cost delta | `[-m, 0, m]`, `m = max(1, p95(|delta|))` |
//! | [`LegendKind::Transmission`] | reference, breakeven | `[0, mid, max]`, `max = max(1, p95)`, `mid = max(p50, max/2)` |
//!
//! All three modes use [`percentile`]: values sorted ascending, index
//! `floor(q · n)` clamped to `[0, n - 1]`.
//!
//! Breakpoints are always strictly increasing. A value that does not exceed
//! its predecessor is replaced by the next representable `f64` above it.
//!
//! A domain can be frozen with [`LegendLock`] so the color mapping does not
//! shift while assumptions are tweaked.

use serde::{Deserialize, Serialize};

use crate::compare::ComparedResult;
use crate::select::LcoeResult;

/// Metric shown when a reference location is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonMetric {
    /// Signed LCOE difference to the reference
    #[default]
    Delta,
    /// Breakeven transmission capital per GW·km
    Transmission,
}

/// Which scale a legend domain describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendKind {
    Absolute,
    Delta,
    Transmission,
}

impl LegendKind {
    /// The legend kind a recompute should produce.
    pub fn for_mode(reference_set: bool, metric: ComparisonMetric) -> Self {
        match (reference_set, metric) {
            (false, _) => LegendKind::Absolute,
            (true, ComparisonMetric::Delta) => LegendKind::Delta,
            (true, ComparisonMetric::Transmission) => LegendKind::Transmission,
        }
    }
}

/// Percentiles used for the comparison scales.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegendSettings {
    pub delta_percentile: f64,
    pub transmission_percentile: f64,
}

impl Default for LegendSettings {
    fn default() -> Self {
        Self {
            delta_percentile: 0.95,
            transmission_percentile: 0.95,
        }
    }
}

/// Display text for a legend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendLabels {
    pub title: String,
    pub min: String,
    pub mid: String,
    pub max: String,
    pub reference: String,
    /// Label for the "no data / target not met" swatch
    pub no_data: Option<String>,
}

/// Breakpoints and labels mapping a scalar metric onto a color scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendDomain {
    pub kind: LegendKind,
    pub breakpoints: Vec<f64>,
    pub labels: LegendLabels,
    /// True for the neutral legend shown when nothing is displayable
    pub placeholder: bool,
}

impl LegendDomain {
    /// Neutral legend for an empty result set.
    pub fn placeholder() -> Self {
        Self {
            kind: LegendKind::Absolute,
            breakpoints: vec![0.0, 1.0],
            labels: LegendLabels {
                title: "LCOE ($/MWh)".to_string(),
                min: "--".to_string(),
                mid: "--".to_string(),
                max: "--".to_string(),
                reference: "Reference: --".to_string(),
                no_data: None,
            },
            placeholder: true,
        }
    }

    pub fn min(&self) -> f64 {
        self.breakpoints.first().copied().unwrap_or(0.0)
    }

    pub fn max(&self) -> f64 {
        self.breakpoints.last().copied().unwrap_or(0.0)
    }
}

/// Value at quantile `q` of an ascending slice; `None` when empty.
pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let last = sorted.len() - 1;
    let raw = (q * sorted.len() as f64).floor();
    let idx = if raw.is_nan() || raw < 0.0 {
        0
    } else {
        (raw as usize).min(last)
    };
    Some(sorted[idx])
}

/// Smallest `f64` strictly greater than `x`.
fn next_up(x: f64) -> f64 {
    if x.is_nan() || x == f64::INFINITY {
        return x;
    }
    if x == 0.0 {
        return f64::from_bits(1);
    }
    let bits = x.to_bits();
    if x > 0.0 {
        f64::from_bits(bits + 1)
    } else {
        f64::from_bits(bits - 1)
    }
}

/// Nudge duplicates (and inversions) upward until the sequence strictly increases.
pub fn strictly_increasing(mut values: Vec<f64>) -> Vec<f64> {
    for i in 1..values.len() {
        if values[i] <= values[i - 1] || values[i].is_nan() {
            values[i] = next_up(values[i - 1]);
        }
    }
    values
}

fn sorted_finite(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut values: Vec<f64> = values.filter(|v| v.is_finite()).collect();
    values.sort_by(f64::total_cmp);
    values
}

/// `1234.5` → `"1,235"` (with `decimals = 0`); `"--"` for non-finite values.
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "--".to_string();
    }
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Currency label: `"$1,235"`, `"-$1,500"`, or `"--"` for non-finite values.
pub fn format_currency(value: f64, decimals: usize) -> String {
    let num = format_number(value, decimals);
    if num == "--" {
        num
    } else if let Some(magnitude) = num.strip_prefix('-') {
        format!("-${magnitude}")
    } else {
        format!("${num}")
    }
}

fn reference_label(reference: &LcoeResult) -> String {
    format!("Reference: {}/MWh", format_currency(reference.lcoe, 0))
}

/// Build the legend for the current results.
///
/// `reference` selects between the absolute and comparison scales; `metric`
/// selects the comparison scale. When no result is displayable (finite and
/// target-meeting) the neutral [`LegendDomain::placeholder`] is returned.
pub fn build_legend(
    points: &[ComparedResult],
    reference: Option<&LcoeResult>,
    metric: ComparisonMetric,
    settings: &LegendSettings,
) -> LegendDomain {
    if !points.iter().any(|p| p.result.is_displayable()) {
        return LegendDomain::placeholder();
    }

    match reference {
        None => absolute_legend(points),
        Some(reference) => match metric {
            ComparisonMetric::Delta => delta_legend(points, reference, settings),
            ComparisonMetric::Transmission => transmission_legend(points, reference, settings),
        },
    }
}

fn absolute_legend(points: &[ComparedResult]) -> LegendDomain {
    let costs = sorted_finite(
        points
            .iter()
            .filter(|p| p.result.meets_target)
            .map(|p| p.result.lcoe),
    );
    // Callers guarantee at least one displayable point.
    let min = costs.first().copied().unwrap_or(0.0);
    let max = costs.last().copied().unwrap_or(0.0);
    let median = percentile(&costs, 0.5).unwrap_or(min);
    let p33 = percentile(&costs, 0.33).unwrap_or(min);
    let p67 = percentile(&costs, 0.67).unwrap_or(max);

    LegendDomain {
        kind: LegendKind::Absolute,
        breakpoints: strictly_increasing(vec![min, p33, p67, max]),
        labels: LegendLabels {
            title: "LCOE ($/MWh)".to_string(),
            min: format_currency(min, 0),
            mid: format_currency(median, 0),
            max: format_currency(max, 0),
            reference: "Reference: --".to_string(),
            no_data: Some(format!("> {}", format_currency(max, 0))),
        },
        placeholder: false,
    }
}

fn delta_legend(
    points: &[ComparedResult],
    reference: &LcoeResult,
    settings: &LegendSettings,
) -> LegendDomain {
    let abs_deltas = sorted_finite(
        points
            .iter()
            .filter(|p| p.result.meets_target)
            .filter_map(|p| p.delta())
            .map(f64::abs),
    );

    let title = "LCOE Δ ($/MWh)".to_string();
    let reference = reference_label(reference);

    if abs_deltas.is_empty() {
        return LegendDomain {
            kind: LegendKind::Delta,
            breakpoints: vec![-1.0, 0.0, 1.0],
            labels: LegendLabels {
                title,
                min: "--".to_string(),
                mid: "$0".to_string(),
                max: "--".to_string(),
                reference,
                no_data: None,
            },
            placeholder: false,
        };
    }

    let picked = percentile(&abs_deltas, settings.delta_percentile).unwrap_or(0.0);
    let fallback = abs_deltas.last().copied().unwrap_or(1.0);
    let max_abs = if picked > 0.0 { picked } else { fallback }.max(1.0);
    let label_value = max_abs.round().max(1.0);

    LegendDomain {
        kind: LegendKind::Delta,
        breakpoints: strictly_increasing(vec![-max_abs, 0.0, max_abs]),
        labels: LegendLabels {
            title,
            min: format_currency(-label_value, 0),
            mid: "$0".to_string(),
            max: format!("+{}", format_currency(label_value, 0)),
            reference,
            no_data: Some("Outside target CF".to_string()),
        },
        placeholder: false,
    }
}

fn transmission_legend(
    points: &[ComparedResult],
    reference: &LcoeResult,
    settings: &LegendSettings,
) -> LegendDomain {
    let values = sorted_finite(
        points
            .iter()
            .filter(|p| p.result.meets_target)
            .filter_map(|p| p.tx_metrics())
            .map(|tx| tx.breakeven_per_gw_km)
            .filter(|v| *v > 0.0),
    );

    let (breakpoints, mid_label, max_label) = match values.last() {
        None => (vec![0.0, 1.0, 1.0], "--".to_string(), "--".to_string()),
        Some(&observed_max) => {
            let picked = percentile(&values, settings.transmission_percentile).unwrap_or(0.0);
            let raw_max = if picked > 0.0 { picked } else { observed_max };
            let max = raw_max.max(1.0);
            let median = percentile(&values, 0.5).unwrap_or(0.0);
            let mid = median.max(max * 0.5);
            (
                vec![0.0, mid, max],
                format!("{}/GW/km", format_currency(mid, 0)),
                format!("{}/GW/km", format_currency(max, 0)),
            )
        }
    };

    LegendDomain {
        kind: LegendKind::Transmission,
        breakpoints: strictly_increasing(breakpoints),
        labels: LegendLabels {
            title: "Breakeven Transmission ($/GW/km)".to_string(),
            min: "$0/GW/km".to_string(),
            mid: mid_label,
            no_data: Some(format!("> {max_label}")),
            max: max_label,
            reference: reference_label(reference),
        },
        placeholder: false,
    }
}

/// Freeze state for the legend.
///
/// While engaged, the first domain seen is reused verbatim on every
/// recompute. The frozen domain is dropped when the legend kind changes (a
/// delta scale is not comparable to a transmission scale) and the lock is
/// released entirely when no reference is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LegendLock {
    #[default]
    Released,
    Engaged(Option<LegendDomain>),
}

impl LegendLock {
    /// Engage the lock, freezing `current` if one is already displayed.
    pub fn engage(current: Option<LegendDomain>) -> Self {
        LegendLock::Engaged(current)
    }

    pub fn is_engaged(&self) -> bool {
        matches!(self, LegendLock::Engaged(_))
    }

    pub fn frozen(&self) -> Option<&LegendDomain> {
        match self {
            LegendLock::Engaged(domain) => domain.as_ref(),
            LegendLock::Released => None,
        }
    }

    /// Resolve the domain for one recompute, returning the updated lock.
    ///
    /// `build` runs only when the frozen domain cannot be reused.
    pub fn resolve<F>(&self, reference_set: bool, desired: LegendKind, build: F) -> (Self, LegendDomain)
    where
        F: FnOnce() -> LegendDomain,
    {
        match self {
            _ if !reference_set => (LegendLock::Released, build()),
            LegendLock::Released => (LegendLock::Released, build()),
            LegendLock::Engaged(Some(frozen)) if frozen.kind == desired => {
                (self.clone(), frozen.clone())
            }
            LegendLock::Engaged(_) => {
                let domain = build();
                (LegendLock::Engaged(Some(domain.clone())), domain)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{compare_all, TransmissionAssumptions};
    use siting_core::{GigawattHours, Gigawatts, LocationId, SimulationRow};

    fn result(id: u64, lon: f64, lcoe: f64, meets: bool) -> LcoeResult {
        LcoeResult {
            row: SimulationRow::new(LocationId::new(id), 0.0, lon, 5.0, 8.0, 0.95),
            lcoe,
            target_cf: 0.9,
            meets_target: meets,
            max_config_solar: Gigawatts(5.0),
            max_config_batt: GigawattHours(8.0),
            max_config_lcoe: lcoe,
        }
    }

    fn assert_strictly_increasing(values: &[f64]) {
        for pair in values.windows(2) {
            assert!(pair[1] > pair[0], "{values:?} is not strictly increasing");
        }
    }

    #[test]
    fn test_percentile_floor_index() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        assert_eq!(percentile(&sorted, 0.0), Some(1.0));
        assert_eq!(percentile(&sorted, 0.33), Some(4.0));
        assert_eq!(percentile(&sorted, 0.5), Some(6.0));
        assert_eq!(percentile(&sorted, 0.95), Some(10.0));
        assert_eq!(percentile(&sorted, 1.0), Some(10.0));
        assert_eq!(percentile(&[], 0.5), None);
    }

    #[test]
    fn test_strictly_increasing_nudges_duplicates() {
        let values = strictly_increasing(vec![5.0, 5.0, 5.0, 7.0]);
        assert_strictly_increasing(&values);
        assert_eq!(values[0], 5.0);
        assert!(values[2] - 5.0 < 1e-12);
        assert_eq!(values[3], 7.0);

        let values = strictly_increasing(vec![-0.0, 0.0, -3.0]);
        assert_strictly_increasing(&values);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1234567.4, 0), "$1,234,567");
        assert_eq!(format_currency(999.6, 0), "$1,000");
        assert_eq!(format_currency(42.0, 0), "$42");
        assert_eq!(format_currency(-1500.0, 0), "-$1,500");
        assert_eq!(format_currency(-0.4, 0), "$0");
        assert_eq!(format_currency(f64::INFINITY, 0), "--");
        assert_eq!(format_number(1234.5678, 2), "1,234.57");
    }

    #[test]
    fn test_absolute_legend_quartiles() {
        let results: Vec<LcoeResult> = (0..10)
            .map(|i| result(i, i as f64, 30.0 + i as f64 * 10.0, true))
            .chain([result(99, 0.0, 500.0, false), result(98, 0.0, f64::INFINITY, true)])
            .collect();
        let points = compare_all(&results, None, &TransmissionAssumptions::default());
        let legend = build_legend(&points, None, ComparisonMetric::Delta, &LegendSettings::default());

        assert_eq!(legend.kind, LegendKind::Absolute);
        assert_eq!(legend.breakpoints, vec![30.0, 60.0, 90.0, 120.0]);
        assert_eq!(legend.labels.min, "$30");
        assert_eq!(legend.labels.mid, "$80");
        assert_eq!(legend.labels.max, "$120");
        assert_eq!(legend.labels.no_data.as_deref(), Some("> $120"));
        assert!(!legend.placeholder);
    }

    #[test]
    fn test_absolute_legend_single_value_is_strict() {
        let results = vec![result(1, 0.0, 42.0, true)];
        let points = compare_all(&results, None, &TransmissionAssumptions::default());
        let legend = build_legend(&points, None, ComparisonMetric::Delta, &LegendSettings::default());
        assert_eq!(legend.breakpoints.len(), 4);
        assert_strictly_increasing(&legend.breakpoints);
        assert_eq!(legend.breakpoints[0], 42.0);
    }

    #[test]
    fn test_empty_population_yields_placeholder() {
        let results = vec![result(1, 0.0, 42.0, false)];
        let points = compare_all(&results, None, &TransmissionAssumptions::default());
        let legend = build_legend(&points, None, ComparisonMetric::Delta, &LegendSettings::default());
        assert!(legend.placeholder);
        assert_strictly_increasing(&legend.breakpoints);

        let legend = build_legend(&[], None, ComparisonMetric::Delta, &LegendSettings::default());
        assert!(legend.placeholder);
    }

    #[test]
    fn test_delta_legend_symmetric() {
        let results = vec![
            result(1, 0.0, 40.0, true),
            result(2, 1.0, 55.0, true),
            result(3, 2.0, 30.0, true),
            result(4, 3.0, 41.0, true),
        ];
        let points = compare_all(&results, Some(&results[0]), &TransmissionAssumptions::default());
        let legend = build_legend(
            &points,
            Some(&results[0]),
            ComparisonMetric::Delta,
            &LegendSettings::default(),
        );

        // |delta| sorted: [0, 1, 10, 15]; floor(0.95 * 4) = 3 -> 15
        assert_eq!(legend.kind, LegendKind::Delta);
        assert_eq!(legend.breakpoints, vec![-15.0, 0.0, 15.0]);
        assert_eq!(legend.labels.min, "-$15");
        assert_eq!(legend.labels.max, "+$15");
        assert_eq!(legend.labels.reference, "Reference: $40/MWh");
    }

    #[test]
    fn test_delta_legend_minimum_span_is_one() {
        let results = vec![result(1, 0.0, 40.0, true), result(2, 1.0, 40.2, true)];
        let points = compare_all(&results, Some(&results[0]), &TransmissionAssumptions::default());
        let legend = build_legend(
            &points,
            Some(&results[0]),
            ComparisonMetric::Delta,
            &LegendSettings::default(),
        );
        assert_eq!(legend.breakpoints, vec![-1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_transmission_legend() {
        let reference = result(1, 0.0, 60.0, true);
        // Savings per degree of separation: 10/1, 30/2, 20/4
        let results = vec![
            reference,
            result(2, 1.0, 50.0, true),
            result(3, 2.0, 30.0, true),
            result(4, 4.0, 40.0, true),
            result(5, 3.0, 70.0, true),
        ];
        let tx = TransmissionAssumptions::default();
        let points = compare_all(&results, Some(&reference), &tx);
        let legend = build_legend(
            &points,
            Some(&reference),
            ComparisonMetric::Transmission,
            &LegendSettings::default(),
        );

        let mut positive: Vec<f64> = points
            .iter()
            .filter_map(|p| p.tx_metrics())
            .map(|t| t.breakeven_per_gw_km)
            .filter(|v| *v > 0.0)
            .collect();
        positive.sort_by(f64::total_cmp);
        assert_eq!(positive.len(), 3);

        // p95 -> index 2, p50 -> index 1
        assert_eq!(legend.kind, LegendKind::Transmission);
        assert_eq!(legend.breakpoints[0], 0.0);
        assert_eq!(legend.breakpoints[1], positive[1].max(positive[2] * 0.5));
        assert_eq!(legend.breakpoints[2], positive[2]);
        assert_strictly_increasing(&legend.breakpoints);
    }

    #[test]
    fn test_transmission_legend_without_positive_values() {
        let reference = result(1, 0.0, 30.0, true);
        let results = vec![reference, result(2, 1.0, 50.0, true)];
        let points = compare_all(&results, Some(&reference), &TransmissionAssumptions::default());
        let legend = build_legend(
            &points,
            Some(&reference),
            ComparisonMetric::Transmission,
            &LegendSettings::default(),
        );
        assert_eq!(legend.breakpoints[0], 0.0);
        assert_eq!(legend.breakpoints[1], 1.0);
        assert_strictly_increasing(&legend.breakpoints);
        assert_eq!(legend.labels.max, "--");
    }

    #[test]
    fn test_lock_reuses_frozen_domain() {
        let frozen = LegendDomain {
            kind: LegendKind::Delta,
            breakpoints: vec![-7.5, 0.0, 7.5],
            labels: LegendDomain::placeholder().labels,
            placeholder: false,
        };
        let lock = LegendLock::engage(Some(frozen.clone()));
        let (lock, domain) = lock.resolve(true, LegendKind::Delta, || {
            panic!("frozen domain should be reused")
        });
        assert_eq!(domain, frozen);
        assert!(lock.is_engaged());
    }

    #[test]
    fn test_lock_refreezes_on_kind_change() {
        let frozen = LegendDomain {
            kind: LegendKind::Delta,
            breakpoints: vec![-7.5, 0.0, 7.5],
            labels: LegendDomain::placeholder().labels,
            placeholder: false,
        };
        let lock = LegendLock::engage(Some(frozen));
        let fresh = LegendDomain {
            kind: LegendKind::Transmission,
            breakpoints: vec![0.0, 2.0, 4.0],
            ..LegendDomain::placeholder()
        };
        let (lock, domain) = lock.resolve(true, LegendKind::Transmission, || fresh.clone());
        assert_eq!(domain, fresh);
        assert_eq!(lock.frozen(), Some(&fresh));
    }

    #[test]
    fn test_lock_released_without_reference() {
        let lock = LegendLock::engage(Some(LegendDomain::placeholder()));
        let (lock, _) = lock.resolve(false, LegendKind::Absolute, LegendDomain::placeholder);
        assert_eq!(lock, LegendLock::Released);
    }
}
