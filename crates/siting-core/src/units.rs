//! Unit newtypes for siting quantities.
//!
//! The simulation dataset reports capacity in GW (solar) and GWh (storage),
//! cost inputs are quoted per kW / kWh, and delivered energy is accounted in
//! MWh. Keeping those as distinct types stops a GW figure from being
//! multiplied by a per-kWh price without the explicit conversion.
//!
//! ```
//! use siting_core::units::{Gigawatts, GigawattHours};
//!
//! let solar = Gigawatts(5.0);
//! assert_eq!(solar.to_kilowatts(), 5_000_000.0);
//!
//! let storage = GigawattHours(8.0);
//! assert_eq!(storage.to_kilowatt_hours(), 8_000_000.0);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Hours in a non-leap year, used for annual energy accounting.
pub const HOURS_PER_YEAR: f64 = 8760.0;

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Neg for $type {
            type Output = Self;
            fn neg(self) -> Self::Output {
                Self(-self.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.4} {}", self.0, $unit_name)
            }
        }

        impl $type {
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }
    };
}

/// Solar nameplate capacity in gigawatts (GW_DC).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Gigawatts(pub f64);

impl_unit_ops!(Gigawatts, "GW");

impl Gigawatts {
    /// 1 GW = 1,000,000 kW
    #[inline]
    pub fn to_kilowatts(self) -> f64 {
        self.0 * 1_000_000.0
    }
}

/// Battery energy capacity in gigawatt-hours.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct GigawattHours(pub f64);

impl_unit_ops!(GigawattHours, "GWh");

impl GigawattHours {
    /// 1 GWh = 1,000,000 kWh
    #[inline]
    pub fn to_kilowatt_hours(self) -> f64 {
        self.0 * 1_000_000.0
    }
}

/// Constant demand level in megawatts.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Megawatts(pub f64);

impl_unit_ops!(Megawatts, "MW");

impl Megawatts {
    /// The fixed 1 GW baseload every simulation row is evaluated against.
    pub const BASELOAD: Self = Self(1000.0);

    /// Energy delivered over a year when this demand is served for
    /// `capacity_factor` of the hours.
    #[inline]
    pub fn annual_energy(self, capacity_factor: f64) -> MegawattHours {
        MegawattHours(capacity_factor * HOURS_PER_YEAR * self.0)
    }
}

/// Energy in megawatt-hours.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct MegawattHours(pub f64);

impl_unit_ops!(MegawattHours, "MWh");

/// Great-circle distance in kilometres.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kilometers(pub f64);

impl_unit_ops!(Kilometers, "km");

/// Angle in radians.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Radians(pub f64);

impl_unit_ops!(Radians, "rad");

/// Angle in degrees (latitude / longitude).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Degrees(pub f64);

impl_unit_ops!(Degrees, "°");

impl Radians {
    #[inline]
    pub fn sin(self) -> f64 {
        self.0.sin()
    }

    #[inline]
    pub fn cos(self) -> f64 {
        self.0.cos()
    }
}

impl Degrees {
    #[inline]
    pub fn to_radians(self) -> Radians {
        Radians(self.0.to_radians())
    }
}

/// Haversine great-circle distance between two (lat, lon) pairs in degrees.
pub fn haversine(lat1: Degrees, lon1: Degrees, lat2: Degrees, lon2: Degrees) -> Kilometers {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    Kilometers(EARTH_RADIUS_KM * c)
}
