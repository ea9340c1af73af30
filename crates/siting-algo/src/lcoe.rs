//! Levelized cost of energy for a solar + storage configuration.
//!
//! Capital is annualized with the capital recovery factor
//!
//! ```text
//! CRF(r, n) = r(1+r)^n / ((1+r)^n - 1)      (r > 0)
//!           = 1 / n                          (r = 0)
//!           = 0                              (n <= 0)
//! ```
//!
//! and fixed O&M is charged as a fraction of capex each year. Energy is the
//! share of a fixed 1 GW baseload served over 8760 hours, so
//!
//! ```text
//! LCOE = annual_cost / (annual_cf · 8760 · 1000 MWh)
//! ```
//!
//! A configuration that never serves the load has an infinite LCOE rather than
//! a division by zero.

use serde::Serialize;
use siting_core::{LcoeParams, SimulationRow};

/// Capital recovery factor for `rate` over `years`.
pub fn capital_recovery_factor(rate: f64, years: f64) -> f64 {
    if years <= 0.0 {
        return 0.0;
    }
    if rate == 0.0 {
        return 1.0 / years;
    }
    let growth = (1.0 + rate).powf(years);
    rate * growth / (growth - 1.0)
}

/// Annual cost components for one configuration, in currency per year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnnualCost {
    pub solar_capex: f64,
    pub battery_capex: f64,
    pub solar_capital: f64,
    pub battery_capital: f64,
    pub solar_opex: f64,
    pub battery_opex: f64,
}

impl AnnualCost {
    pub fn for_row(row: &SimulationRow, params: &LcoeParams) -> Self {
        let solar_capex = params.solar_capex_per_kw * row.solar_gw.to_kilowatts();
        let battery_capex = params.battery_capex_per_kwh * row.batt_gwh.to_kilowatt_hours();

        let solar_crf = capital_recovery_factor(params.discount_rate, params.solar_life_years as f64);
        let battery_crf =
            capital_recovery_factor(params.discount_rate, params.battery_life_years as f64);

        Self {
            solar_capex,
            battery_capex,
            solar_capital: solar_capex * solar_crf,
            battery_capital: battery_capex * battery_crf,
            solar_opex: solar_capex * params.solar_opex_fraction,
            battery_opex: battery_capex * params.battery_opex_fraction,
        }
    }

    pub fn total(&self) -> f64 {
        self.solar_capital + self.battery_capital + self.solar_opex + self.battery_opex
    }
}

/// LCOE of `row` in currency per MWh; `f64::INFINITY` when no energy is served.
pub fn config_lcoe(row: &SimulationRow, params: &LcoeParams) -> f64 {
    let energy = row.annual_energy().value();
    if energy == 0.0 {
        return f64::INFINITY;
    }
    AnnualCost::for_row(row, params).total() / energy
}
