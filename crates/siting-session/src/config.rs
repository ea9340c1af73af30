//! Configuration for siting sessions.
//!
//! [`SitingConfig`] collects every tunable the engine reads: cost assumptions,
//! transmission financing, legend percentiles, viewport padding and the
//! recompute quiet interval.
//!
//! Configuration is stored in `~/.siting/config.toml` and supports partial
//! configs where unspecified values use the defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use siting_algo::{LegendSettings, TransmissionAssumptions};
use siting_core::LcoeParams;

use crate::error::{Error, Result};

/// Main configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SitingConfig {
    /// Cost assumptions and CF target.
    pub lcoe: LcoeParams,

    /// Financing of the hypothetical transmission link.
    pub transmission: TransmissionAssumptions,

    /// Percentiles for the comparison legends.
    pub legend: LegendSettings,

    /// Tessellation viewport settings.
    pub viewport: ViewportConfig,

    /// Recompute scheduling.
    pub recompute: RecomputeConfig,
}

/// Viewport settings for tessellation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Padding on each side, as a multiple of `max(width, height)`.
    pub padding_factor: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self { padding_factor: 1.0 }
    }
}

/// Recompute scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecomputeConfig {
    /// Quiet interval before a parameter change triggers a recompute.
    pub debounce_ms: u64,
}

impl Default for RecomputeConfig {
    fn default() -> Self {
        Self { debounce_ms: 150 }
    }
}

impl RecomputeConfig {
    pub fn quiet_interval(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl SitingConfig {
    /// Get the default config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".siting"))
    }

    /// Get the default config file path.
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// Load configuration from the default location.
    ///
    /// Returns default config if file doesn't exist.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load and validate configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()
            .ok_or_else(|| Error::Config("could not determine config directory".to_string()))?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save configuration to a specific path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every section against its documented range.
    pub fn validate(&self) -> Result<()> {
        self.lcoe.validate()?;

        let tx = &self.transmission;
        if !tx.discount_rate.is_finite() || tx.discount_rate < 0.0 {
            return Err(Error::Config(format!(
                "transmission.discount_rate must be >= 0, got {}",
                tx.discount_rate
            )));
        }
        if tx.life_years < 1 {
            return Err(Error::Config("transmission.life_years must be >= 1".to_string()));
        }

        for (name, q) in [
            ("legend.delta_percentile", self.legend.delta_percentile),
            ("legend.transmission_percentile", self.legend.transmission_percentile),
        ] {
            if !(0.0..=1.0).contains(&q) {
                return Err(Error::Config(format!("{name} must be in [0, 1], got {q}")));
            }
        }

        let pad = self.viewport.padding_factor;
        if !pad.is_finite() || pad < 0.0 {
            return Err(Error::Config(format!(
                "viewport.padding_factor must be >= 0, got {pad}"
            )));
        }
        Ok(())
    }
}
