//! Interactive session: dataset, current context and pending recompute.
//!
//! [`Session`] is the single control point a front-end drives. Parameter
//! changes are debounced; reference, metric and lock changes recompute
//! immediately; viewport changes only rebuild geometry.

use siting_algo::{
    padded_bounds, project_sites, tessellate, ComparisonMetric, LandMask, Projection, VoronoiCell,
};
use siting_core::{Diagnostics, LcoeParams, LocationId, LocationIndex, SimulationRow};
use tracing::{debug, info};

use crate::config::SitingConfig;
use crate::context::{AnalysisContext, AnalysisSnapshot};
use crate::debounce::{Clock, Debouncer, SystemClock};
use crate::error::Result;
use crate::events::{RecomputeTrigger, SessionEvent};

/// Cells for one projection and the event describing the rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct Tessellation {
    pub cells: Vec<VoronoiCell>,
    pub event: SessionEvent,
}

pub struct Session {
    config: SitingConfig,
    index: LocationIndex,
    snapshot: AnalysisSnapshot,
    pending_params: Debouncer<LcoeParams>,
    clock: Box<dyn Clock>,
    recomputes: usize,
}

impl Session {
    /// Index `rows` (dropping invalid ones into `diagnostics`) and compute the
    /// initial snapshot.
    pub fn new(rows: Vec<SimulationRow>, config: SitingConfig, diagnostics: &mut Diagnostics) -> Self {
        let index = LocationIndex::build_sanitized(rows, diagnostics);
        info!(
            locations = index.len(),
            rows = index.row_count(),
            "session dataset loaded"
        );
        let context = AnalysisContext::from_config(&config);
        let snapshot = context.recompute(&index, RecomputeTrigger::DatasetReloaded);
        Self {
            pending_params: Debouncer::new(config.recompute.quiet_interval()),
            clock: Box::new(SystemClock::new()),
            config,
            index,
            snapshot,
            recomputes: 1,
        }
    }

    /// Use `clock` for [`Session::update_params`] and [`Session::poll`].
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn snapshot(&self) -> &AnalysisSnapshot {
        &self.snapshot
    }

    pub fn context(&self) -> &AnalysisContext {
        &self.snapshot.context
    }

    pub fn index(&self) -> &LocationIndex {
        &self.index
    }

    pub fn config(&self) -> &SitingConfig {
        &self.config
    }

    /// Number of recomputes run so far.
    pub fn recompute_count(&self) -> usize {
        self.recomputes
    }

    pub fn has_pending_recompute(&self) -> bool {
        self.pending_params.is_pending()
    }

    fn apply(&mut self, context: AnalysisContext, trigger: RecomputeTrigger) -> &AnalysisSnapshot {
        self.snapshot = context.recompute(&self.index, trigger);
        self.recomputes += 1;
        &self.snapshot
    }

    /// Queue new cost assumptions; they apply once the quiet interval passes.
    pub fn set_params(&mut self, now_ms: u64, params: LcoeParams) -> Result<()> {
        params.validate()?;
        self.pending_params.schedule(now_ms, params);
        Ok(())
    }

    /// Run the pending parameter recompute if it is due.
    pub fn tick(&mut self, now_ms: u64) -> Result<Option<&AnalysisSnapshot>> {
        let Some(params) = self.pending_params.poll(now_ms) else {
            return Ok(None);
        };
        let context = self.context().with_params(params)?;
        Ok(Some(self.apply(context, RecomputeTrigger::ParamsChanged)))
    }

    /// [`Session::set_params`] stamped with the session clock.
    pub fn update_params(&mut self, params: LcoeParams) -> Result<()> {
        let now_ms = self.clock.now_ms();
        self.set_params(now_ms, params)
    }

    /// [`Session::tick`] at the session clock's current time.
    pub fn poll(&mut self) -> Result<Option<&AnalysisSnapshot>> {
        let now_ms = self.clock.now_ms();
        self.tick(now_ms)
    }

    pub fn select_reference(&mut self, location_id: LocationId) -> Result<&AnalysisSnapshot> {
        let context = self.context().with_reference(location_id, &self.index)?;
        Ok(self.apply(context, RecomputeTrigger::ReferenceChanged))
    }

    pub fn clear_reference(&mut self) -> &AnalysisSnapshot {
        let context = self.context().clear_reference();
        self.apply(context, RecomputeTrigger::ReferenceChanged)
    }

    pub fn set_metric(&mut self, metric: ComparisonMetric) -> &AnalysisSnapshot {
        let context = self.context().with_metric(metric);
        self.apply(context, RecomputeTrigger::MetricChanged)
    }

    /// Freeze the legend currently displayed.
    pub fn lock_legend(&mut self) {
        let context = self.context().lock_legend(Some(&self.snapshot.legend));
        self.snapshot.context = context;
    }

    pub fn release_legend(&mut self) -> &AnalysisSnapshot {
        let context = self.context().release_legend();
        self.apply(context, RecomputeTrigger::LegendChanged)
    }

    /// Replace the dataset; a reference missing from it is cleared.
    pub fn reload(&mut self, rows: Vec<SimulationRow>, diagnostics: &mut Diagnostics) -> &AnalysisSnapshot {
        self.index = LocationIndex::build_sanitized(rows, diagnostics);
        let context = self.context().clone();
        self.apply(context, RecomputeTrigger::DatasetReloaded)
    }

    /// Voronoi cells for the current results under `projection`.
    ///
    /// Results are untouched; only geometry is rebuilt.
    pub fn tessellate<P: Projection + ?Sized>(&self, projection: &P, land: Option<&LandMask>) -> Tessellation {
        let sites = project_sites(
            projection,
            self.snapshot
                .results
                .iter()
                .map(|r| (r.result.row.location_id, r.result.row.latitude, r.result.row.longitude)),
        );
        let (width, height) = projection.viewport_size();
        let bounds = padded_bounds(width, height, self.config.viewport.padding_factor);
        let cells = tessellate(&sites, bounds, land);

        let trigger = RecomputeTrigger::ViewportChanged;
        debug!(%trigger, sites = sites.len(), cells = cells.len(), "cells rebuilt");
        Tessellation {
            event: SessionEvent::CellsRebuilt {
                trigger,
                sites: sites.len(),
                cells: cells.len(),
            },
            cells,
        }
    }
}
