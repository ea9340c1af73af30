use clap::{Parser, Subcommand, ValueEnum, ValueHint};
use siting_algo::{ComparisonMetric, PopulationMetric};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Solar + storage siting economics", long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Select the cheapest target-meeting configuration per location
    Analyze {
        /// Simulation rows CSV (location_id,latitude,longitude,solar_gw,batt_gwh,annual_cf)
        #[arg(long, value_hint = ValueHint::FilePath)]
        rows: PathBuf,
        /// TOML configuration (defaults to ~/.siting/config.toml)
        #[arg(long, value_hint = ValueHint::FilePath)]
        config: Option<PathBuf>,
        /// Override the capacity-factor target (0-1)
        #[arg(long)]
        target_cf: Option<f64>,
        /// Compare every location against this location id
        #[arg(long)]
        reference: Option<u64>,
        /// Comparison metric when a reference is set
        #[arg(long, value_enum, default_value_t = MetricArg::Delta)]
        metric: MetricArg,
        /// Freeze the legend built from the configured params before applying --target-cf
        #[arg(long)]
        lock_legend: bool,
        /// Write JSON here instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
    },
    /// Build screen-space Voronoi cells for the selected results
    Tessellate {
        /// Simulation rows CSV
        #[arg(long, value_hint = ValueHint::FilePath)]
        rows: PathBuf,
        /// TOML configuration
        #[arg(long, value_hint = ValueHint::FilePath)]
        config: Option<PathBuf>,
        /// Viewport width in pixels
        #[arg(long, default_value_t = 1024.0)]
        width: f64,
        /// Viewport height in pixels
        #[arg(long, default_value_t = 768.0)]
        height: f64,
        /// Map center latitude
        #[arg(long, allow_hyphen_values = true)]
        center_lat: f64,
        /// Map center longitude
        #[arg(long, allow_hyphen_values = true)]
        center_lon: f64,
        /// Web Mercator zoom level
        #[arg(long, default_value_t = 4.0)]
        zoom: f64,
        /// Land mask JSON: list of polygons, each [exterior, holes...] of [lon, lat] rings
        #[arg(long, value_hint = ValueHint::FilePath)]
        land: Option<PathBuf>,
        /// Write JSON here instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
    },
    /// Capacity factor of one fixed build across all locations
    Capacity {
        /// Simulation rows CSV
        #[arg(long, value_hint = ValueHint::FilePath)]
        rows: PathBuf,
        /// Solar capacity (GW) of the build
        #[arg(long)]
        solar: f64,
        /// Battery capacity (GWh) of the build
        #[arg(long)]
        batt: f64,
        /// Write JSON here instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
    },
    /// Population-weighted summaries of LCOE or capacity factor
    Population {
        /// Simulation rows CSV
        #[arg(long, value_hint = ValueHint::FilePath)]
        rows: PathBuf,
        /// Population grid CSV (latitude,longitude,population)
        #[arg(long, value_hint = ValueHint::FilePath)]
        population: PathBuf,
        /// TOML configuration
        #[arg(long, value_hint = ValueHint::FilePath)]
        config: Option<PathBuf>,
        /// Metric to summarise
        #[arg(long, value_enum, default_value_t = PopulationMetricArg::Lcoe)]
        metric: PopulationMetricArg,
        /// Fixed build for capacity factor, as solar GW (requires --batt)
        #[arg(long, requires = "batt")]
        solar: Option<f64>,
        /// Fixed build for capacity factor, as battery GWh (requires --solar)
        #[arg(long, requires = "solar")]
        batt: Option<f64>,
        /// Percentile step in percent
        #[arg(long, default_value_t = 2)]
        step: u32,
        /// Number of latitude bands
        #[arg(long, default_value_t = 100)]
        buckets: usize,
        /// Write JSON here instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write the default configuration
    Init {
        /// Target path (defaults to ~/.siting/config.toml)
        #[arg(long, value_hint = ValueHint::FilePath)]
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration as TOML
    Show {
        /// Config file to read (defaults to ~/.siting/config.toml)
        #[arg(long, value_hint = ValueHint::FilePath)]
        path: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricArg {
    /// LCOE difference to the reference
    Delta,
    /// Breakeven transmission capital per GW·km
    Transmission,
}

impl From<MetricArg> for ComparisonMetric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Delta => ComparisonMetric::Delta,
            MetricArg::Transmission => ComparisonMetric::Transmission,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PopulationMetricArg {
    Lcoe,
    CapacityFactor,
}

impl From<PopulationMetricArg> for PopulationMetric {
    fn from(arg: PopulationMetricArg) -> Self {
        match arg {
            PopulationMetricArg::Lcoe => PopulationMetric::Lcoe,
            PopulationMetricArg::CapacityFactor => PopulationMetric::CapacityFactor,
        }
    }
}
