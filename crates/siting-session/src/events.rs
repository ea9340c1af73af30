//! Event types describing what a recompute changed.

use serde::Serialize;
use siting_algo::{ComparisonMetric, LegendKind};
use siting_core::LocationId;

/// What caused a recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecomputeTrigger {
    /// Cost assumptions or the CF target changed (debounced).
    ParamsChanged,
    /// A reference was selected or cleared.
    ReferenceChanged,
    /// The comparison metric was switched.
    MetricChanged,
    /// The legend lock was released.
    LegendChanged,
    /// The map was panned or zoomed; only geometry is rebuilt.
    ViewportChanged,
    /// A new dataset was loaded.
    DatasetReloaded,
}

impl std::fmt::Display for RecomputeTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecomputeTrigger::ParamsChanged => write!(f, "params changed"),
            RecomputeTrigger::ReferenceChanged => write!(f, "reference changed"),
            RecomputeTrigger::MetricChanged => write!(f, "metric changed"),
            RecomputeTrigger::LegendChanged => write!(f, "legend changed"),
            RecomputeTrigger::ViewportChanged => write!(f, "viewport changed"),
            RecomputeTrigger::DatasetReloaded => write!(f, "dataset reloaded"),
        }
    }
}

/// Current comparison mode, derived from the reference and metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "metric")]
pub enum ComparisonMode {
    /// No reference: absolute LCOE.
    Absolute,
    /// Differenced against the reference.
    Relative(ComparisonMetric),
}

impl ComparisonMode {
    pub fn legend_kind(self) -> LegendKind {
        match self {
            ComparisonMode::Absolute => LegendKind::Absolute,
            ComparisonMode::Relative(metric) => LegendKind::for_mode(true, metric),
        }
    }
}

/// Events emitted by a recompute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum SessionEvent {
    /// Results were recomputed.
    Recomputed {
        trigger: RecomputeTrigger,
        locations: usize,
        meeting_target: usize,
    },

    /// The reference location vanished from the results and was cleared.
    ReferenceCleared { location_id: LocationId },

    /// A locked legend was reused unchanged.
    LegendReused { kind: LegendKind },

    /// The legend lock was released.
    LegendReleased,

    /// Voronoi cells were rebuilt for a new projection.
    CellsRebuilt {
        trigger: RecomputeTrigger,
        sites: usize,
        cells: usize,
    },
}
