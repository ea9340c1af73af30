//! Key-value indices over simulation rows.
//!
//! Two keyings are used by the engine:
//!
//! - [`LocationIndex`]: `location_id → rows`, built once per dataset load.
//! - [`CoordIndex`]: `coordinate → record`, used to join other point grids
//!   (e.g. population cells) onto simulation locations.
//!
//! ## Coordinate keys
//!
//! Floating-point coordinates are not usable as hash keys directly. A
//! [`CoordKey`] scales latitude and longitude by 10⁶ and rounds half away from
//! zero to an `i64`, so two coordinates match when they agree to 6 decimal
//! places (≈ 0.11 m at the equator). Non-finite coordinates have no key.

use std::collections::HashMap;

use tracing::warn;

use crate::diagnostics::{DiagnosticIssue, Diagnostics};
use crate::{LocationId, SimulationRow};

const COORD_SCALE: f64 = 1_000_000.0;

/// Tolerance-based hash key for a (latitude, longitude) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoordKey {
    lat_micro: i64,
    lon_micro: i64,
}

impl CoordKey {
    /// Build a key, or `None` when either coordinate is not finite.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return None;
        }
        Some(Self {
            lat_micro: (latitude * COORD_SCALE).round() as i64,
            lon_micro: (longitude * COORD_SCALE).round() as i64,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.lat_micro as f64 / COORD_SCALE
    }

    pub fn longitude(&self) -> f64 {
        self.lon_micro as f64 / COORD_SCALE
    }
}

impl std::fmt::Display for CoordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude(), self.longitude())
    }
}

/// Mapping from a [`CoordKey`] to one record. Later records with the same key
/// replace earlier ones.
#[derive(Debug, Clone)]
pub struct CoordIndex<T> {
    entries: HashMap<CoordKey, T>,
}

impl<T> Default for CoordIndex<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> CoordIndex<T> {
    /// Index `items` by the coordinates `coords` extracts; items with
    /// non-finite coordinates are skipped.
    pub fn build<I, F>(items: I, coords: F) -> Self
    where
        I: IntoIterator<Item = T>,
        F: Fn(&T) -> (f64, f64),
    {
        let mut entries = HashMap::new();
        for item in items {
            let (lat, lon) = coords(&item);
            if let Some(key) = CoordKey::new(lat, lon) {
                entries.insert(key, item);
            }
        }
        Self { entries }
    }

    pub fn get(&self, latitude: f64, longitude: f64) -> Option<&T> {
        CoordKey::new(latitude, longitude).and_then(|key| self.entries.get(&key))
    }

    pub fn get_key(&self, key: &CoordKey) -> Option<&T> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Rows grouped by `location_id`, in first-seen order.
///
/// Every location present holds at least one row. The index is read-only once
/// built; a dataset reload builds a fresh one.
#[derive(Debug, Clone, Default)]
pub struct LocationIndex {
    order: Vec<LocationId>,
    rows: HashMap<LocationId, Vec<SimulationRow>>,
}

impl LocationIndex {
    /// Group rows by location in a single pass.
    pub fn build<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = SimulationRow>,
    {
        let mut order = Vec::new();
        let mut grouped: HashMap<LocationId, Vec<SimulationRow>> = HashMap::new();
        for row in rows {
            let id = row.location_id;
            grouped
                .entry(id)
                .or_insert_with(|| {
                    order.push(id);
                    Vec::new()
                })
                .push(row);
        }
        Self {
            order,
            rows: grouped,
        }
    }

    /// Drop unusable rows (recording each in `diagnostics`), then group.
    pub fn build_sanitized<I>(rows: I, diagnostics: &mut Diagnostics) -> Self
    where
        I: IntoIterator<Item = SimulationRow>,
    {
        Self::build(sanitize_rows(rows, diagnostics))
    }

    /// Rows for `id`; empty for an unknown location.
    pub fn rows(&self, id: LocationId) -> &[SimulationRow] {
        self.rows.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, id: LocationId) -> bool {
        self.rows.contains_key(&id)
    }

    /// Iterate locations in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (LocationId, &[SimulationRow])> + '_ {
        self.order.iter().map(move |id| (*id, self.rows(*id)))
    }

    pub fn location_ids(&self) -> &[LocationId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.values().map(Vec::len).sum()
    }
}

/// Keep only rows whose values can enter cost math and geometry.
pub fn sanitize_rows<I>(rows: I, diagnostics: &mut Diagnostics) -> Vec<SimulationRow>
where
    I: IntoIterator<Item = SimulationRow>,
{
    let mut kept = Vec::new();
    let mut dropped = 0usize;
    for (line, row) in rows.into_iter().enumerate() {
        match row.defect() {
            None => kept.push(row),
            Some(reason) => {
                dropped += 1;
                diagnostics.add(
                    DiagnosticIssue::warning("row", reason)
                        .with_entity(format!("location {}", row.location_id))
                        .with_line(line + 1),
                );
            }
        }
    }
    if dropped > 0 {
        warn!(dropped, kept = kept.len(), "dropped unusable simulation rows");
    }
    kept
}
