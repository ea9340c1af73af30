//! Cost assumptions used to levelize a solar + storage build.

use serde::{Deserialize, Serialize};

use crate::error::{SitingError, SitingResult};

/// Cost and financing assumptions plus the capacity-factor target.
///
/// Any change to any field invalidates every derived result, so the value is
/// compared wholesale (`PartialEq`) by the session layer to detect changes.
///
/// Field names also accept the camelCase spellings used by the dashboard
/// front-end (`solarCapexPerKw`, `targetCf`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LcoeParams {
    /// Solar capital cost in currency per kW_DC
    #[serde(alias = "solarCapexPerKw")]
    pub solar_capex_per_kw: f64,
    /// Battery capital cost in currency per kWh
    #[serde(alias = "batteryCapexPerKwh")]
    pub battery_capex_per_kwh: f64,
    /// Annual solar O&M as a fraction of solar capex
    #[serde(alias = "solarOpexFraction")]
    pub solar_opex_fraction: f64,
    /// Annual battery O&M as a fraction of battery capex
    #[serde(alias = "batteryOpexFraction")]
    pub battery_opex_fraction: f64,
    #[serde(alias = "solarLifeYears")]
    pub solar_life_years: u32,
    #[serde(alias = "batteryLifeYears")]
    pub battery_life_years: u32,
    /// Discount rate (WACC) as a fraction
    #[serde(alias = "discountRate")]
    pub discount_rate: f64,
    /// Minimum annual capacity factor a configuration must reach
    #[serde(alias = "targetCf")]
    pub target_cf: f64,
}

impl Default for LcoeParams {
    fn default() -> Self {
        Self {
            solar_capex_per_kw: 600.0,
            battery_capex_per_kwh: 120.0,
            solar_opex_fraction: 0.015,
            battery_opex_fraction: 0.02,
            solar_life_years: 30,
            battery_life_years: 20,
            discount_rate: 0.07,
            target_cf: 0.90,
        }
    }
}

impl LcoeParams {
    /// Check every field against its documented range.
    pub fn validate(&self) -> SitingResult<()> {
        let non_negative = [
            ("solar_capex_per_kw", self.solar_capex_per_kw),
            ("battery_capex_per_kwh", self.battery_capex_per_kwh),
            ("solar_opex_fraction", self.solar_opex_fraction),
            ("battery_opex_fraction", self.battery_opex_fraction),
            ("discount_rate", self.discount_rate),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(SitingError::Validation(format!(
                    "{name} must be a finite value >= 0 (got {value})"
                )));
            }
        }

        if self.solar_life_years < 1 || self.battery_life_years < 1 {
            return Err(SitingError::Validation(format!(
                "asset lives must be at least 1 year (solar {}, battery {})",
                self.solar_life_years, self.battery_life_years
            )));
        }

        if !(0.0..=1.0).contains(&self.target_cf) {
            return Err(SitingError::Validation(format!(
                "target_cf must be within [0, 1] (got {})",
                self.target_cf
            )));
        }

        Ok(())
    }

    pub fn with_target_cf(mut self, target_cf: f64) -> Self {
        self.target_cf = target_cf;
        self
    }
}
