//! Color scales for the map layers.
//!
//! A [`ColorScale`] is piecewise linear over strictly increasing breakpoints
//! and clamps outside them. When a ramp has a different number of stops than
//! the domain has breakpoints, the ramp is resampled evenly.

use std::fmt;

use serde::Serialize;

use crate::compare::ComparedResult;
use crate::legend::{LegendDomain, LegendKind};

/// Fill for results that are not displayable (target unmet, no comparison).
pub const NO_DATA: Rgb = Rgb::new(0x47, 0x55, 0x69);

const ABSOLUTE_RAMP: [Rgb; 4] = [
    Rgb::new(0x0e, 0xa5, 0xe9),
    Rgb::new(0x22, 0xc5, 0x5e),
    Rgb::new(0xea, 0xb3, 0x08),
    Rgb::new(0xef, 0x44, 0x44),
];

const DELTA_RAMP: [Rgb; 3] = [
    Rgb::new(0x22, 0xc5, 0x5e),
    Rgb::new(0xcb, 0xd5, 0xe1),
    Rgb::new(0xef, 0x44, 0x44),
];

const TRANSMISSION_RAMP: [Rgb; 3] = [
    Rgb::new(0xcb, 0xd5, 0xe1),
    Rgb::new(0x86, 0xef, 0xac),
    Rgb::new(0x22, 0xc5, 0x5e),
];

const CAPACITY_FACTOR_DOMAIN: [f64; 5] = [0.0, 0.05, 0.4, 0.7, 1.0];
const CAPACITY_FACTOR_RAMP: [Rgb; 5] = [
    Rgb::new(0x00, 0x49, 0xff),
    Rgb::new(0x00, 0x49, 0xff),
    Rgb::new(0x00, 0xc8, 0x53),
    Rgb::new(0xff, 0x98, 0x00),
    Rgb::new(0xd3, 0x2f, 0x2f),
];

const POPULATION_RAMP: [Rgb; 2] = [Rgb::new(0x11, 0x18, 0x27), Rgb::new(0xf3, 0xf4, 0xf6)];

/// 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Linear blend; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Piecewise-linear, clamped mapping from a scalar to a color.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    domain: Vec<f64>,
    colors: Vec<Rgb>,
}

impl ColorScale {
    /// Scale over `domain` using `ramp`, resampled to `domain.len()` stops.
    pub fn new(domain: Vec<f64>, ramp: &[Rgb]) -> Self {
        let colors = resample(ramp, domain.len());
        Self { domain, colors }
    }

    /// Scale for a legend domain, using the ramp for its kind.
    pub fn for_legend(legend: &LegendDomain) -> Self {
        let ramp: &[Rgb] = match legend.kind {
            LegendKind::Absolute => &ABSOLUTE_RAMP,
            LegendKind::Delta => &DELTA_RAMP,
            LegendKind::Transmission => &TRANSMISSION_RAMP,
        };
        Self::new(legend.breakpoints.clone(), ramp)
    }

    /// Fixed scale for the single-configuration capacity-factor view.
    pub fn capacity_factor() -> Self {
        Self {
            domain: CAPACITY_FACTOR_DOMAIN.to_vec(),
            colors: CAPACITY_FACTOR_RAMP.to_vec(),
        }
    }

    /// Grey ramp for population density between `min` and `max`.
    pub fn population(min: f64, max: f64) -> Self {
        let max = if max > min { max } else { min + 1.0 };
        Self::new(vec![min, max], &POPULATION_RAMP)
    }

    pub fn domain(&self) -> &[f64] {
        &self.domain
    }

    /// Color for `value`; [`NO_DATA`] for non-finite input or an empty scale.
    pub fn color(&self, value: f64) -> Rgb {
        let (Some(&first), Some(&last)) = (self.domain.first(), self.domain.last()) else {
            return NO_DATA;
        };
        if !value.is_finite() {
            return NO_DATA;
        }
        if value <= first {
            return self.colors[0];
        }
        if value >= last {
            return self.colors[self.colors.len() - 1];
        }

        // First breakpoint strictly above `value`; 1 <= upper < len here.
        let upper = self.domain.partition_point(|&b| b <= value);
        let (lo, hi) = (self.domain[upper - 1], self.domain[upper]);
        let t = (value - lo) / (hi - lo);
        self.colors[upper - 1].lerp(self.colors[upper], t)
    }
}

fn resample(ramp: &[Rgb], stops: usize) -> Vec<Rgb> {
    match (ramp.len(), stops) {
        (_, 0) => Vec::new(),
        (0, n) => vec![NO_DATA; n],
        (m, n) if m == n => ramp.to_vec(),
        (_, 1) => vec![ramp[0]],
        (m, n) => (0..n)
            .map(|i| {
                let pos = i as f64 / (n - 1) as f64 * (m - 1) as f64;
                let lo = pos.floor() as usize;
                let hi = (lo + 1).min(m - 1);
                ramp[lo].lerp(ramp[hi], pos - lo as f64)
            })
            .collect(),
    }
}

/// The scalar a point is colored by under `kind`, if it has one.
pub fn display_value(point: &ComparedResult, kind: LegendKind) -> Option<f64> {
    if !point.result.meets_target {
        return None;
    }
    match kind {
        LegendKind::Absolute => Some(point.result.lcoe).filter(|v| v.is_finite()),
        LegendKind::Delta => point.delta().filter(|v| v.is_finite()),
        LegendKind::Transmission => point
            .tx_metrics()
            .map(|tx| tx.breakeven_per_gw_km)
            .filter(|v| v.is_finite() && *v > 0.0),
    }
}

/// Fill color for a point under the current legend.
pub fn fill_color(point: &ComparedResult, legend: &LegendDomain, scale: &ColorScale) -> Rgb {
    display_value(point, legend.kind).map_or(NO_DATA, |v| scale.color(v))
}
