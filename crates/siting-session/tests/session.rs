//! Session-level behavior: debounced recompute, legend locking across
//! parameter changes, reference lifetime across reloads.

use std::cell::Cell;
use std::rc::Rc;

use siting_algo::{ComparisonMetric, LegendKind, WebMercatorViewport};
use siting_core::{Diagnostics, LcoeParams, LocationId, SimulationRow};
use siting_session::{
    Clock, ComparisonMode, RecomputeTrigger, Session, SessionEvent, SitingConfig,
};

/// Clock advanced by hand from the test body.
#[derive(Clone, Default)]
struct ManualClock(Rc<Cell<u64>>);

impl ManualClock {
    fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

fn last_trigger(events: &[SessionEvent]) -> Option<RecomputeTrigger> {
    events.iter().rev().find_map(|event| match event {
        SessionEvent::Recomputed { trigger, .. } => Some(*trigger),
        _ => None,
    })
}

fn rows() -> Vec<SimulationRow> {
    let mut rows = Vec::new();
    for id in 1..=8u64 {
        let lat = 28.0 + (id % 4) as f64 * 1.5;
        let lon = -112.0 + (id / 4) as f64 * 2.0;
        let quality = 0.80 + 0.02 * id as f64;
        for (solar, batt) in [(2.0, 2.0), (4.0, 8.0), (6.0, 12.0), (9.0, 24.0)] {
            let cf = (quality * (0.55 + solar / 30.0 + batt / 120.0)).min(1.0);
            rows.push(SimulationRow::new(LocationId::new(id), lat, lon, solar, batt, cf));
        }
    }
    rows
}

fn session() -> Session {
    let mut diagnostics = Diagnostics::new();
    let session = Session::new(rows(), SitingConfig::default(), &mut diagnostics);
    assert!(!diagnostics.has_issues());
    session
}

fn params(capex: f64) -> LcoeParams {
    LcoeParams {
        solar_capex_per_kw: capex,
        ..LcoeParams::default()
    }
}

#[test]
fn test_burst_of_param_changes_recomputes_once_with_last_value() {
    let mut session = session();
    let start = session.recompute_count();

    for (i, t) in [0u64, 30, 60, 90, 120].into_iter().enumerate() {
        session.set_params(t, params(500.0 + i as f64 * 10.0)).unwrap();
        assert!(session.tick(t).unwrap().is_none());
    }
    assert!(session.has_pending_recompute());
    assert!(session.tick(269).unwrap().is_none());

    let snapshot = session.tick(270).unwrap().unwrap();
    assert_eq!(snapshot.context.params().solar_capex_per_kw, 540.0);
    assert!(matches!(
        snapshot.events.last(),
        Some(SessionEvent::Recomputed {
            trigger: RecomputeTrigger::ParamsChanged,
            ..
        })
    ));
    assert_eq!(session.recompute_count(), start + 1);
    assert!(session.tick(10_000).unwrap().is_none());
}

#[test]
fn test_session_clock_drives_debounce() {
    let clock = ManualClock::default();
    let mut session = session().with_clock(clock.clone());
    let start = session.recompute_count();

    session.update_params(params(480.0)).unwrap();
    clock.advance(100);
    session.update_params(params(460.0)).unwrap();
    clock.advance(149);
    assert!(session.poll().unwrap().is_none());

    clock.advance(1);
    let snapshot = session.poll().unwrap().unwrap();
    assert_eq!(snapshot.context.params().solar_capex_per_kw, 460.0);
    assert_eq!(session.recompute_count(), start + 1);
    assert!(!session.has_pending_recompute());
}

#[test]
fn test_locked_legend_stable_across_param_recompute() {
    let mut session = session();
    session.select_reference(LocationId::new(4)).unwrap();
    session.lock_legend();
    let frozen = session.snapshot().legend.clone();

    session.set_params(0, params(420.0)).unwrap();
    session.tick(150).unwrap();

    let legend = &session.snapshot().legend;
    assert_eq!(legend.kind, LegendKind::Delta);
    let bits = |v: &[f64]| v.iter().map(|b| b.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&legend.breakpoints), bits(&frozen.breakpoints));

    session.clear_reference();
    assert!(!session.context().lock().is_engaged());
    assert_eq!(session.snapshot().mode, ComparisonMode::Absolute);
}

#[test]
fn test_metric_switch_rebuilds_locked_legend() {
    let mut session = session();
    session.select_reference(LocationId::new(8)).unwrap();
    session.lock_legend();

    let snapshot = session.set_metric(ComparisonMetric::Transmission);
    assert_eq!(snapshot.legend.kind, LegendKind::Transmission);
    assert_eq!(
        snapshot.mode,
        ComparisonMode::Relative(ComparisonMetric::Transmission)
    );
    assert!(snapshot.context.lock().is_engaged());
    assert_eq!(last_trigger(&snapshot.events), Some(RecomputeTrigger::MetricChanged));
}

#[test]
fn test_release_legend_is_tagged_as_legend_change() {
    let mut session = session();
    session.select_reference(LocationId::new(3)).unwrap();
    session.lock_legend();

    let snapshot = session.release_legend();
    assert!(!snapshot.context.lock().is_engaged());
    assert_eq!(last_trigger(&snapshot.events), Some(RecomputeTrigger::LegendChanged));
    assert_eq!(RecomputeTrigger::LegendChanged.to_string(), "legend changed");
}

#[test]
fn test_reload_without_reference_location_clears_it() {
    let mut session = session();
    session.select_reference(LocationId::new(2)).unwrap();

    let remaining: Vec<SimulationRow> = rows()
        .into_iter()
        .filter(|r| r.location_id != LocationId::new(2))
        .collect();
    let mut diagnostics = Diagnostics::new();
    let snapshot = session.reload(remaining, &mut diagnostics);

    assert!(snapshot.reference.is_none());
    assert_eq!(snapshot.mode, ComparisonMode::Absolute);
    assert_eq!(snapshot.results.len(), 7);
}

#[test]
fn test_unknown_reference_is_an_error_and_leaves_state() {
    let mut session = session();
    let before = session.recompute_count();
    assert!(session.select_reference(LocationId::new(999)).is_err());
    assert_eq!(session.recompute_count(), before);
    assert!(session.context().reference().is_none());
}

#[test]
fn test_tessellation_follows_viewport() {
    let session = session();
    let wide = WebMercatorViewport::new(29.5, -111.0, 5.0, 800.0, 600.0);
    let zoomed = WebMercatorViewport::new(29.5, -111.0, 7.0, 800.0, 600.0);

    let recomputes = session.recompute_count();

    let a = session.tessellate(&wide, None);
    let b = session.tessellate(&zoomed, None);
    assert_eq!(a.cells.len(), session.snapshot().results.len());
    assert_eq!(b.cells.len(), a.cells.len());
    assert_ne!(a.cells[0].site, b.cells[0].site);
    assert_eq!(
        b.event,
        SessionEvent::CellsRebuilt {
            trigger: RecomputeTrigger::ViewportChanged,
            sites: 8,
            cells: 8,
        }
    );
    assert_eq!(session.recompute_count(), recomputes);
}
