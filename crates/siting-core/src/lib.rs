//! # siting-core: Data Model for Baseload Siting Analysis
//!
//! Provides the record types shared by the siting engine: simulation rows for
//! solar + storage configurations, cost assumptions, and the indices that group
//! rows by location or by coordinate.
//!
//! ## Data Model
//!
//! Each [`SimulationRow`] describes one solar + battery configuration at one
//! site and the fraction of the year (`annual_cf`) it keeps a fixed 1 GW
//! baseload fully served. A site has many rows (one per configuration); the
//! [`LocationIndex`] groups them:
//!
//! ```
//! use siting_core::*;
//!
//! let rows = vec![
//!     SimulationRow::new(LocationId::new(1), 35.0, -110.0, 5.0, 8.0, 0.92),
//!     SimulationRow::new(LocationId::new(1), 35.0, -110.0, 3.0, 4.0, 0.71),
//!     SimulationRow::new(LocationId::new(2), 36.5, -112.0, 5.0, 8.0, 0.88),
//! ];
//!
//! let index = LocationIndex::build(rows);
//! assert_eq!(index.len(), 2);
//! assert_eq!(index.rows(LocationId::new(1)).len(), 2);
//! ```
//!
//! ## Modules
//!
//! - [`units`] - GW / GWh / MWh / km newtypes and the haversine distance
//! - [`params`] - [`LcoeParams`] cost assumptions
//! - [`index`] - [`LocationIndex`], [`CoordKey`], [`CoordIndex`]
//! - [`diagnostics`] - Collector for rows dropped during sanitizing
//! - [`error`] - [`SitingError`] / [`SitingResult`]

use serde::{Deserialize, Serialize};

pub mod diagnostics;
pub mod error;
pub mod index;
pub mod params;
pub mod units;

pub use diagnostics::{DiagnosticIssue, Diagnostics};
pub use error::{SitingError, SitingResult};
pub use index::{sanitize_rows, CoordIndex, CoordKey, LocationIndex};
pub use params::LcoeParams;
pub use units::{
    haversine, Degrees, GigawattHours, Gigawatts, Kilometers, MegawattHours, Megawatts, Radians,
};

/// Identifier shared by every simulation row at one site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(u64);

impl LocationId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for LocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One simulated solar + storage configuration at one site.
///
/// Immutable once loaded. `annual_cf` is the fraction of the year the fixed
/// 1 GW baseload is met.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationRow {
    pub location_id: LocationId,
    pub latitude: f64,
    pub longitude: f64,
    pub solar_gw: Gigawatts,
    pub batt_gwh: GigawattHours,
    pub annual_cf: f64,
}

impl SimulationRow {
    pub fn new(
        location_id: LocationId,
        latitude: f64,
        longitude: f64,
        solar_gw: f64,
        batt_gwh: f64,
        annual_cf: f64,
    ) -> Self {
        Self {
            location_id,
            latitude,
            longitude,
            solar_gw: Gigawatts(solar_gw),
            batt_gwh: GigawattHours(batt_gwh),
            annual_cf,
        }
    }

    /// Reason this row cannot be used, if any.
    pub fn defect(&self) -> Option<&'static str> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Some("non-finite coordinates");
        }
        if !(-90.0..=90.0).contains(&self.latitude) || !(-180.0..=180.0).contains(&self.longitude)
        {
            return Some("coordinates out of range");
        }
        if !self.solar_gw.is_finite() || !self.batt_gwh.is_finite() {
            return Some("non-finite capacity");
        }
        if self.solar_gw.value() < 0.0 || self.batt_gwh.value() < 0.0 {
            return Some("negative capacity");
        }
        if !self.annual_cf.is_finite() {
            return Some("non-finite annual_cf");
        }
        if !(0.0..=1.0).contains(&self.annual_cf) {
            return Some("annual_cf outside [0, 1]");
        }
        None
    }

    /// Annual energy delivered to the fixed baseload by this configuration.
    pub fn annual_energy(&self) -> MegawattHours {
        Megawatts::BASELOAD.annual_energy(self.annual_cf)
    }
}
