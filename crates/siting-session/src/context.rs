//! Immutable analysis context.
//!
//! [`AnalysisContext`] holds everything a recompute depends on besides the
//! dataset: cost assumptions, the reference selection, the comparison metric
//! and the legend lock. Every change produces a new context; nothing is
//! mutated in place.
//!
//! [`AnalysisContext::recompute`] runs the full pipeline against a
//! [`LocationIndex`] and returns an [`AnalysisSnapshot`] holding the results
//! together with the context to use next. That follow-up context may differ
//! from the input:
//!
//! - a reference whose location no longer has a result is cleared, which
//!   also releases the legend lock
//! - an engaged lock with nothing frozen yet freezes the legend just built

use serde::Serialize;
use siting_algo::{
    build_legend, compare_all, ComparedResult, ComparisonMetric, LcoeResult, LegendDomain,
    LegendLock, LegendSettings, TransmissionAssumptions,
};
use siting_core::{LcoeParams, LocationId, LocationIndex};
use tracing::{debug, warn};

use crate::config::SitingConfig;
use crate::error::{Error, Result};
use crate::events::{ComparisonMode, RecomputeTrigger, SessionEvent};

/// Inputs to one recompute, besides the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisContext {
    params: LcoeParams,
    transmission: TransmissionAssumptions,
    legend_settings: LegendSettings,
    reference: Option<LocationId>,
    metric: ComparisonMetric,
    lock: LegendLock,
}

impl Default for AnalysisContext {
    fn default() -> Self {
        Self::from_config(&SitingConfig::default())
    }
}

impl AnalysisContext {
    pub fn from_config(config: &SitingConfig) -> Self {
        Self {
            params: config.lcoe,
            transmission: config.transmission,
            legend_settings: config.legend,
            reference: None,
            metric: ComparisonMetric::default(),
            lock: LegendLock::Released,
        }
    }

    pub fn params(&self) -> &LcoeParams {
        &self.params
    }

    pub fn transmission(&self) -> &TransmissionAssumptions {
        &self.transmission
    }

    pub fn reference(&self) -> Option<LocationId> {
        self.reference
    }

    pub fn metric(&self) -> ComparisonMetric {
        self.metric
    }

    pub fn lock(&self) -> &LegendLock {
        &self.lock
    }

    pub fn mode(&self) -> ComparisonMode {
        match self.reference {
            Some(_) => ComparisonMode::Relative(self.metric),
            None => ComparisonMode::Absolute,
        }
    }

    /// Replace the cost assumptions after validating them.
    pub fn with_params(&self, params: LcoeParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            ..self.clone()
        })
    }

    /// Select `location_id` as the reference; it must exist in `index`.
    pub fn with_reference(&self, location_id: LocationId, index: &LocationIndex) -> Result<Self> {
        if !index.contains(location_id) {
            return Err(Error::UnknownLocation(location_id));
        }
        Ok(Self {
            reference: Some(location_id),
            ..self.clone()
        })
    }

    /// Drop the reference; this always releases the legend lock.
    pub fn clear_reference(&self) -> Self {
        Self {
            reference: None,
            lock: LegendLock::Released,
            ..self.clone()
        }
    }

    /// Switch the comparison metric.
    ///
    /// A frozen legend of the other kind is discarded on the next recompute.
    pub fn with_metric(&self, metric: ComparisonMetric) -> Self {
        Self {
            metric,
            ..self.clone()
        }
    }

    /// Freeze `displayed`, or the next legend built if `None`.
    pub fn lock_legend(&self, displayed: Option<&LegendDomain>) -> Self {
        Self {
            lock: LegendLock::engage(displayed.cloned()),
            ..self.clone()
        }
    }

    pub fn release_legend(&self) -> Self {
        Self {
            lock: LegendLock::Released,
            ..self.clone()
        }
    }

    /// Run selection, comparison and legend building against `index`.
    pub fn recompute(&self, index: &LocationIndex, trigger: RecomputeTrigger) -> AnalysisSnapshot {
        let results = siting_algo::select_best_configs(index, &self.params);
        let mut events = Vec::new();

        let mut next = self.clone();
        let reference = match self.reference {
            None => None,
            Some(id) => {
                let found = results.iter().find(|r| r.row.location_id == id).copied();
                if found.is_none() {
                    warn!(location_id = %id, "reference location no longer present, clearing");
                    next = next.clear_reference();
                    events.push(SessionEvent::ReferenceCleared { location_id: id });
                }
                found
            }
        };

        let points = compare_all(&results, reference.as_ref(), &self.transmission);
        let desired = next.mode().legend_kind();
        let was_engaged = self.lock.is_engaged();
        let reused = next
            .lock
            .frozen()
            .is_some_and(|frozen| reference.is_some() && frozen.kind == desired);

        let (lock, legend) = next.lock.resolve(reference.is_some(), desired, || {
            build_legend(&points, reference.as_ref(), next.metric, &self.legend_settings)
        });
        next.lock = lock;

        if reused {
            events.push(SessionEvent::LegendReused { kind: legend.kind });
        }
        if was_engaged && !next.lock.is_engaged() {
            events.push(SessionEvent::LegendReleased);
        }
        let meeting_target = results.iter().filter(|r| r.meets_target).count();
        events.push(SessionEvent::Recomputed {
            trigger,
            locations: results.len(),
            meeting_target,
        });

        debug!(
            %trigger,
            locations = results.len(),
            meeting_target,
            legend = ?legend.kind,
            locked = next.lock.is_engaged(),
            "recomputed analysis"
        );

        AnalysisSnapshot {
            mode: next.mode(),
            context: next,
            reference,
            results: points,
            legend,
            events,
        }
    }
}

/// Output of one recompute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSnapshot {
    /// Context for the next change
    #[serde(skip)]
    pub context: AnalysisContext,
    pub mode: ComparisonMode,
    pub reference: Option<LcoeResult>,
    pub results: Vec<ComparedResult>,
    pub legend: LegendDomain,
    pub events: Vec<SessionEvent>,
}

impl AnalysisSnapshot {
    pub fn result(&self, location_id: LocationId) -> Option<&ComparedResult> {
        self.results
            .iter()
            .find(|r| r.result.row.location_id == location_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siting_algo::LegendKind;
    use siting_core::SimulationRow;

    fn index() -> LocationIndex {
        let mut rows = Vec::new();
        for id in 1..=6u64 {
            let lat = 20.0 + id as f64;
            for (solar, batt, cf) in [(3.0, 4.0, 0.80), (5.0, 8.0, 0.91), (8.0, 16.0, 0.97)] {
                let cf: f64 = cf - 0.01 * id as f64;
                rows.push(SimulationRow::new(LocationId::new(id), lat, -110.0, solar, batt, cf));
            }
        }
        LocationIndex::build(rows)
    }

    fn params_with_capex(capex: f64) -> LcoeParams {
        LcoeParams {
            solar_capex_per_kw: capex,
            ..LcoeParams::default()
        }
    }

    #[test]
    fn test_absolute_mode_without_reference() {
        let snapshot = AnalysisContext::default().recompute(&index(), RecomputeTrigger::DatasetReloaded);
        assert_eq!(snapshot.mode, ComparisonMode::Absolute);
        assert_eq!(snapshot.legend.kind, LegendKind::Absolute);
        assert_eq!(snapshot.results.len(), 6);
        assert!(snapshot.results.iter().all(|r| r.comparison.is_none()));
    }

    #[test]
    fn test_reference_produces_deltas() {
        let index = index();
        let ctx = AnalysisContext::default()
            .with_reference(LocationId::new(2), &index)
            .unwrap();
        let snapshot = ctx.recompute(&index, RecomputeTrigger::ReferenceChanged);

        assert_eq!(snapshot.mode, ComparisonMode::Relative(ComparisonMetric::Delta));
        assert_eq!(snapshot.legend.kind, LegendKind::Delta);
        assert_eq!(snapshot.result(LocationId::new(2)).unwrap().delta(), Some(0.0));
        assert!(snapshot.reference.is_some());
    }

    #[test]
    fn test_unknown_reference_rejected() {
        let err = AnalysisContext::default()
            .with_reference(LocationId::new(404), &index())
            .unwrap_err();
        assert!(matches!(err, Error::UnknownLocation(id) if id == LocationId::new(404)));
    }

    #[test]
    fn test_locked_legend_survives_param_change_bit_for_bit() {
        let index = index();
        let ctx = AnalysisContext::default()
            .with_reference(LocationId::new(1), &index)
            .unwrap();
        let first = ctx.recompute(&index, RecomputeTrigger::ReferenceChanged);
        let locked = first.context.lock_legend(Some(&first.legend));

        let changed = locked.with_params(params_with_capex(900.0)).unwrap();
        let second = changed.recompute(&index, RecomputeTrigger::ParamsChanged);

        let before: Vec<u64> = first.legend.breakpoints.iter().map(|b| b.to_bits()).collect();
        let after: Vec<u64> = second.legend.breakpoints.iter().map(|b| b.to_bits()).collect();
        assert_eq!(before, after);
        assert!(second
            .events
            .contains(&SessionEvent::LegendReused { kind: LegendKind::Delta }));

        // Unlocked, the same change moves the domain.
        let unlocked = second.context.release_legend().recompute(&index, RecomputeTrigger::ParamsChanged);
        assert_ne!(unlocked.legend.breakpoints, first.legend.breakpoints);
    }

    #[test]
    fn test_clearing_reference_unlocks() {
        let index = index();
        let ctx = AnalysisContext::default()
            .with_reference(LocationId::new(1), &index)
            .unwrap()
            .lock_legend(None);
        let snapshot = ctx.recompute(&index, RecomputeTrigger::ReferenceChanged);
        assert!(snapshot.context.lock().is_engaged());

        let cleared = snapshot.context.clear_reference();
        assert!(!cleared.lock().is_engaged());
        let snapshot = cleared.recompute(&index, RecomputeTrigger::ReferenceChanged);
        assert_eq!(snapshot.legend.kind, LegendKind::Absolute);
    }

    #[test]
    fn test_metric_change_invalidates_lock() {
        let index = index();
        let ctx = AnalysisContext::default()
            .with_reference(LocationId::new(6), &index)
            .unwrap()
            .lock_legend(None);
        let delta = ctx.recompute(&index, RecomputeTrigger::ReferenceChanged);
        assert_eq!(delta.context.lock().frozen().map(|d| d.kind), Some(LegendKind::Delta));

        let tx = delta
            .context
            .with_metric(ComparisonMetric::Transmission)
            .recompute(&index, RecomputeTrigger::ReferenceChanged);
        assert_eq!(tx.legend.kind, LegendKind::Transmission);
        assert_eq!(
            tx.context.lock().frozen().map(|d| d.kind),
            Some(LegendKind::Transmission)
        );
    }

    #[test]
    fn test_stale_reference_cleared_on_reload() {
        let index = index();
        let ctx = AnalysisContext::default()
            .with_reference(LocationId::new(3), &index)
            .unwrap()
            .lock_legend(None);

        let reloaded = LocationIndex::build(
            index
                .iter()
                .filter(|(id, _)| *id != LocationId::new(3))
                .flat_map(|(_, rows)| rows.iter().copied()),
        );
        let snapshot = ctx.recompute(&reloaded, RecomputeTrigger::DatasetReloaded);

        assert_eq!(snapshot.mode, ComparisonMode::Absolute);
        assert!(snapshot.reference.is_none());
        assert!(snapshot.context.reference().is_none());
        assert!(!snapshot.context.lock().is_engaged());
        assert!(snapshot.events.contains(&SessionEvent::ReferenceCleared {
            location_id: LocationId::new(3)
        }));
        assert_eq!(snapshot.legend.kind, LegendKind::Absolute);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let bad = LcoeParams {
            discount_rate: -0.1,
            ..LcoeParams::default()
        };
        assert!(matches!(
            AnalysisContext::default().with_params(bad),
            Err(Error::Engine(_))
        ));
    }
}
