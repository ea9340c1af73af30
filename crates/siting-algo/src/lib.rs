//! # siting-algo: LCOE analysis and map geometry
//!
//! Pure functions from simulation rows and cost assumptions to the values a
//! map front-end draws.
//!
//! ## Cost pipeline
//!
//! | Stage | Entry point | Output |
//! |-------|-------------|--------|
//! | LCOE | [`config_lcoe`] | currency/MWh per configuration |
//! | Selection | [`select_best_configs`] | one [`LcoeResult`] per location |
//! | Comparison | [`compare_all`] | delta and transmission breakeven vs. a reference |
//! | Legend | [`build_legend`] | adaptive [`LegendDomain`] |
//! | Color | [`ColorScale`] | `#rrggbb` fill per result |
//!
//! ## Geometry
//!
//! - [`tessellate`]: screen-space Voronoi cells, clipped to a padded viewport
//!   and optionally to a [`LandMask`]
//! - [`WebMercatorViewport`]: the default [`Projection`]
//!
//! ## Population summaries
//!
//! - [`match_population`], [`population_percentile_curve`], [`latitude_histogram`]
//!
//! ## Example
//!
//! ```
//! use siting_algo::{build_legend, compare_all, select_best_configs, ComparisonMetric,
//!     LegendSettings, TransmissionAssumptions};
//! use siting_core::{LcoeParams, LocationId, LocationIndex, SimulationRow};
//!
//! let index = LocationIndex::build(vec![
//!     SimulationRow::new(LocationId::new(1), 30.0, -110.0, 5.0, 8.0, 0.92),
//!     SimulationRow::new(LocationId::new(2), 31.0, -111.0, 6.0, 12.0, 0.95),
//! ]);
//! let results = select_best_configs(&index, &LcoeParams::default());
//! let points = compare_all(&results, Some(&results[0]), &TransmissionAssumptions::default());
//! let legend = build_legend(&points, Some(&results[0]), ComparisonMetric::Delta,
//!     &LegendSettings::default());
//! assert_eq!(legend.breakpoints.len(), 3);
//! ```

pub mod color;
pub mod compare;
pub mod lcoe;
pub mod legend;
pub mod population;
pub mod select;
pub mod voronoi;

pub use color::{display_value, fill_color, ColorScale, Rgb, NO_DATA};
pub use compare::{
    compare, compare_all, lcoe_delta, transmission_metrics, ComparedResult, ComparisonResult,
    TransmissionAssumptions, TxMetrics,
};
pub use lcoe::{capital_recovery_factor, config_lcoe, AnnualCost};
pub use legend::{
    build_legend, format_currency, format_number, percentile, strictly_increasing,
    ComparisonMetric, LegendDomain, LegendKind, LegendLabels, LegendLock, LegendSettings,
};
pub use population::{
    latitude_histogram, match_population, population_percentile_curve, ChartSeries,
    PopulationCell, PopulationMetric, PopulationSample,
};
pub use select::{configuration_slice, select_best_configs, select_for_location, LcoeResult};
pub use voronoi::{
    padded_bounds, project_sites, tessellate, CellOutline, LandMask, Projection, Site,
    VoronoiCell, WebMercatorViewport,
};
