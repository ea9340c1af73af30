//! Cost comparison against a reference location.
//!
//! Once a reference site is chosen, every other site is differenced against it:
//!
//! - `delta = candidate.lcoe - reference.lcoe` (negative = cheaper)
//! - transmission breakeven: how much capital a 1 GW link from the candidate
//!   to the reference could absorb while still paying for itself out of the
//!   per-MWh savings.
//!
//! ```text
//! annual_payment      = savings_per_mwh · annual_energy(candidate)
//! breakeven_per_gw    = annual_payment / CRF(tx_rate, tx_life)
//! breakeven_per_gw_km = breakeven_per_gw / distance_km
//! ```
//!
//! When the candidate is not cheaper (or serves no energy) there is no
//! economic case for a link and both breakeven figures are zero.

use serde::{Deserialize, Serialize};
use siting_core::{haversine, Degrees};

use crate::lcoe::capital_recovery_factor;
use crate::select::LcoeResult;

/// Financing assumptions for the transmission link.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransmissionAssumptions {
    pub discount_rate: f64,
    pub life_years: u32,
}

impl Default for TransmissionAssumptions {
    fn default() -> Self {
        Self {
            discount_rate: 0.06,
            life_years: 50,
        }
    }
}

impl TransmissionAssumptions {
    pub fn capital_recovery_factor(&self) -> f64 {
        capital_recovery_factor(self.discount_rate, self.life_years as f64)
    }
}

/// Transmission breakeven figures for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TxMetrics {
    pub distance_km: f64,
    /// `-delta`; positive only when the candidate is cheaper
    pub savings_per_mwh: f64,
    pub breakeven_per_gw: f64,
    pub breakeven_per_gw_km: f64,
}

/// Comparison of one result against the reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparisonResult {
    /// `None` when either LCOE is infinite
    pub delta: Option<f64>,
    /// `None` when `delta` is undefined or the distance is not finite
    pub tx_metrics: Option<TxMetrics>,
}

/// A selected result annotated with its comparison, if a reference is set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparedResult {
    #[serde(flatten)]
    pub result: LcoeResult,
    #[serde(flatten)]
    pub comparison: Option<ComparisonResult>,
}

impl ComparedResult {
    pub fn delta(&self) -> Option<f64> {
        self.comparison.and_then(|c| c.delta)
    }

    pub fn tx_metrics(&self) -> Option<TxMetrics> {
        self.comparison.and_then(|c| c.tx_metrics)
    }
}

/// Signed LCOE difference, defined only when both values are finite.
pub fn lcoe_delta(candidate: &LcoeResult, reference: &LcoeResult) -> Option<f64> {
    if candidate.lcoe.is_finite() && reference.lcoe.is_finite() {
        Some(candidate.lcoe - reference.lcoe)
    } else {
        None
    }
}

/// Breakeven transmission economics for `candidate` given its `delta`.
pub fn transmission_metrics(
    candidate: &LcoeResult,
    reference: &LcoeResult,
    delta: f64,
    assumptions: &TransmissionAssumptions,
) -> Option<TxMetrics> {
    if !delta.is_finite() {
        return None;
    }
    let distance_km = haversine(
        Degrees(candidate.row.latitude),
        Degrees(candidate.row.longitude),
        Degrees(reference.row.latitude),
        Degrees(reference.row.longitude),
    )
    .value();
    if !distance_km.is_finite() {
        return None;
    }

    let savings_per_mwh = -delta;
    if savings_per_mwh <= 0.0 || candidate.row.annual_cf <= 0.0 {
        return Some(TxMetrics {
            distance_km,
            savings_per_mwh,
            breakeven_per_gw: 0.0,
            breakeven_per_gw_km: 0.0,
        });
    }

    let annual_payment = savings_per_mwh * candidate.row.annual_energy().value();
    let crf = assumptions.capital_recovery_factor();
    let breakeven_per_gw = if crf > 0.0 { annual_payment / crf } else { 0.0 };
    let breakeven_per_gw_km = if distance_km > 0.0 {
        breakeven_per_gw / distance_km
    } else {
        0.0
    };

    Some(TxMetrics {
        distance_km,
        savings_per_mwh,
        breakeven_per_gw,
        breakeven_per_gw_km,
    })
}

/// Full comparison of `candidate` against `reference`.
pub fn compare(
    candidate: &LcoeResult,
    reference: &LcoeResult,
    assumptions: &TransmissionAssumptions,
) -> ComparisonResult {
    let delta = lcoe_delta(candidate, reference);
    let tx_metrics =
        delta.and_then(|d| transmission_metrics(candidate, reference, d, assumptions));
    ComparisonResult { delta, tx_metrics }
}

/// Annotate every result; without a reference the comparisons are `None`.
pub fn compare_all(
    results: &[LcoeResult],
    reference: Option<&LcoeResult>,
    assumptions: &TransmissionAssumptions,
) -> Vec<ComparedResult> {
    results
        .iter()
        .map(|result| ComparedResult {
            result: *result,
            comparison: reference.map(|r| compare(result, r, assumptions)),
        })
        .collect()
}
