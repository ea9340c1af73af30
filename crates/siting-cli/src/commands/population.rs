//! `siting population`: population-weighted summaries.

use anyhow::Result;
use serde::Serialize;
use siting_algo::{
    configuration_slice, latitude_histogram, match_population, population_percentile_curve,
    ChartSeries, ColorScale, LcoeResult, PopulationMetric, PopulationSample, Rgb,
};
use siting_core::{Diagnostics, GigawattHours, Gigawatts};
use siting_session::Session;
use std::path::PathBuf;
use tracing::info;

use crate::commands::util::{
    load_config, load_population, load_rows, report_diagnostics, write_json,
};

pub struct PopulationArgs<'a> {
    pub rows: &'a PathBuf,
    pub population: &'a PathBuf,
    pub config: Option<&'a PathBuf>,
    pub metric: PopulationMetric,
    pub build: Option<(f64, f64)>,
    pub step: u32,
    pub buckets: usize,
    pub out: Option<&'a PathBuf>,
}

#[derive(Debug, Serialize)]
struct ShadedCell {
    #[serde(flatten)]
    sample: PopulationSample,
    fill: Rgb,
}

#[derive(Debug, Serialize)]
struct PopulationOutput {
    metric: PopulationMetric,
    matched_cells: usize,
    total_population: f64,
    percentile_curve: ChartSeries,
    latitude_histogram: ChartSeries,
    cells: Vec<ShadedCell>,
}

pub fn handle(args: PopulationArgs<'_>) -> Result<()> {
    let config = load_config(args.config)?;
    let rows = load_rows(args.rows)?;
    let cells = load_population(args.population)?;

    let mut diagnostics = Diagnostics::new();
    let session = Session::new(rows, config, &mut diagnostics);
    report_diagnostics(&diagnostics);

    let results: Vec<LcoeResult> = session.snapshot().results.iter().map(|p| p.result).collect();
    let cf_rows = match args.build {
        Some((solar, batt)) => configuration_slice(session.index(), Gigawatts(solar), GigawattHours(batt)),
        None => Vec::new(),
    };

    let samples = match_population(&cells, &results, &cf_rows, args.metric);
    let total_population: f64 = samples.iter().map(|s| s.population).sum();

    let (min, max) = samples
        .iter()
        .map(|s| s.population)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p), hi.max(p)));
    let scale = ColorScale::population(min, max);
    let shaded: Vec<ShadedCell> = samples
        .iter()
        .map(|&sample| ShadedCell {
            sample,
            fill: scale.color(sample.population),
        })
        .collect();

    info!(
        cells = cells.len(),
        matched = samples.len(),
        total_population,
        "population matched"
    );

    write_json(
        &PopulationOutput {
            metric: args.metric,
            matched_cells: samples.len(),
            total_population,
            percentile_curve: population_percentile_curve(&samples, args.metric, args.step),
            latitude_histogram: latitude_histogram(&samples, args.buckets),
            cells: shaded,
        },
        args.out,
    )
}
