//! Population-weighted summaries.
//!
//! Population grid points are joined to results through [`CoordKey`] (6
//! decimal places), then condensed into two chart series: the metric reached
//! at each cumulative-population percentile, and the population share per
//! latitude band.
//!
//! [`CoordKey`]: siting_core::CoordKey

use serde::{Deserialize, Serialize};
use siting_core::{CoordIndex, SimulationRow};

use crate::select::LcoeResult;

/// One population grid point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopulationCell {
    pub latitude: f64,
    pub longitude: f64,
    pub population: f64,
}

/// Which value population summaries are built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopulationMetric {
    #[default]
    Lcoe,
    CapacityFactor,
}

/// A population point with the metric at its location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PopulationSample {
    pub latitude: f64,
    pub longitude: f64,
    pub population: f64,
    pub metric: f64,
}

/// Labelled chart data; `None` marks a missing value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<Option<f64>>,
}

impl ChartSeries {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Join population cells to the metric at the same coordinates.
///
/// In LCOE mode the value comes from `results`. In capacity-factor mode it
/// comes from `cf_rows`, falling back to the selected result's CF. Cells
/// without a finite metric are dropped; non-finite or negative population
/// counts as zero.
pub fn match_population(
    cells: &[PopulationCell],
    results: &[LcoeResult],
    cf_rows: &[SimulationRow],
    metric: PopulationMetric,
) -> Vec<PopulationSample> {
    let by_result = CoordIndex::build(results.iter(), |r| (r.row.latitude, r.row.longitude));
    let by_row = CoordIndex::build(cf_rows.iter(), |r| (r.latitude, r.longitude));

    cells
        .iter()
        .filter_map(|cell| {
            let value = match metric {
                PopulationMetric::Lcoe => by_result.get(cell.latitude, cell.longitude).map(|r| r.lcoe),
                PopulationMetric::CapacityFactor => by_row
                    .get(cell.latitude, cell.longitude)
                    .map(|r| r.annual_cf)
                    .or_else(|| {
                        by_result
                            .get(cell.latitude, cell.longitude)
                            .map(|r| r.row.annual_cf)
                    }),
            }?;
            value.is_finite().then(|| PopulationSample {
                latitude: cell.latitude,
                longitude: cell.longitude,
                population: clean_population(cell.population),
                metric: value,
            })
        })
        .collect()
}

fn clean_population(p: f64) -> f64 {
    if p.is_finite() && p > 0.0 {
        p
    } else {
        0.0
    }
}

fn total_population(samples: &[PopulationSample]) -> f64 {
    samples.iter().map(|s| clean_population(s.population)).sum()
}

/// Metric value reached at every `step_pct`% of cumulative population.
///
/// Samples are ordered best-first: ascending LCOE, descending CF. Capacity
/// factors are reported in percent.
pub fn population_percentile_curve(
    samples: &[PopulationSample],
    metric: PopulationMetric,
    step_pct: u32,
) -> ChartSeries {
    let total = total_population(samples);
    if total <= 0.0 || samples.is_empty() {
        return ChartSeries::default();
    }

    let mut sorted = samples.to_vec();
    match metric {
        PopulationMetric::Lcoe => sorted.sort_by(|a, b| a.metric.total_cmp(&b.metric)),
        PopulationMetric::CapacityFactor => sorted.sort_by(|a, b| b.metric.total_cmp(&a.metric)),
    }

    let step = step_pct.max(1);
    let mut series = ChartSeries::default();
    let mut cumulative = 0.0;
    let mut idx = 0;
    for pct in (0..=100).step_by(step as usize) {
        let target = pct as f64 / 100.0 * total;
        while idx < sorted.len() && cumulative < target {
            cumulative += clean_population(sorted[idx].population);
            idx += 1;
        }
        let at = sorted[idx.min(sorted.len() - 1)].metric;
        let value = match metric {
            PopulationMetric::Lcoe => at,
            PopulationMetric::CapacityFactor => at * 100.0,
        };
        series.labels.push(format!("{pct}%"));
        series.values.push(value.is_finite().then_some(value));
    }
    series
}

/// Share of population (%) in `bucket_count` equal latitude bands, north first.
pub fn latitude_histogram(samples: &[PopulationSample], bucket_count: usize) -> ChartSeries {
    let total = total_population(samples);
    if total <= 0.0 || bucket_count == 0 {
        return ChartSeries::default();
    }

    let bucket_size = 180.0 / bucket_count as f64;
    let mut buckets = vec![0.0; bucket_count];
    for sample in samples.iter().filter(|s| s.latitude.is_finite()) {
        let raw = ((sample.latitude + 90.0) / bucket_size).floor();
        let idx = if raw < 0.0 {
            0
        } else {
            (raw as usize).min(bucket_count - 1)
        };
        buckets[idx] += clean_population(sample.population);
    }

    let mut series = ChartSeries::default();
    for (i, pop) in buckets.iter().enumerate().rev() {
        let center = -90.0 + (i as f64 + 0.5) * bucket_size;
        series.labels.push(format!("{center:.1}°"));
        series.values.push(Some(pop / total * 100.0));
    }
    series
}
