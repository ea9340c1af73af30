//! `siting analyze`: per-location selection, comparison and legend.

use anyhow::{Context, Result};
use serde::Serialize;
use siting_algo::{
    fill_color, ColorScale, ComparedResult, ComparisonMetric, LcoeResult, LegendDomain, Rgb,
};
use siting_core::{Diagnostics, LcoeParams, LocationId};
use siting_session::{AnalysisSnapshot, ComparisonMode, Session};
use std::path::PathBuf;
use tracing::info;

use crate::commands::util::{load_config, load_rows, report_diagnostics, write_json};
use siting_cli::MetricArg;

pub struct AnalyzeArgs<'a> {
    pub rows: &'a PathBuf,
    pub config: Option<&'a PathBuf>,
    pub target_cf: Option<f64>,
    pub reference: Option<u64>,
    pub metric: MetricArg,
    pub lock_legend: bool,
    pub out: Option<&'a PathBuf>,
}

#[derive(Debug, Serialize)]
struct RenderedResult<'a> {
    #[serde(flatten)]
    point: &'a ComparedResult,
    fill: Rgb,
}

#[derive(Debug, Serialize)]
struct AnalyzeOutput<'a> {
    mode: ComparisonMode,
    reference: Option<&'a LcoeResult>,
    legend: &'a LegendDomain,
    legend_locked: bool,
    params: &'a LcoeParams,
    results: Vec<RenderedResult<'a>>,
    dropped_rows: usize,
}

pub fn handle(args: AnalyzeArgs<'_>) -> Result<()> {
    let config = load_config(args.config)?;
    let rows = load_rows(args.rows)?;

    let mut diagnostics = Diagnostics::new();
    let mut session = Session::new(rows, config, &mut diagnostics);
    report_diagnostics(&diagnostics);

    if let Some(id) = args.reference {
        session
            .select_reference(LocationId::new(id))
            .with_context(|| format!("selecting reference location {id}"))?;
    }
    let metric = ComparisonMetric::from(args.metric);
    if metric != session.context().metric() {
        session.set_metric(metric);
    }
    if args.lock_legend {
        session.lock_legend();
    }

    if let Some(target_cf) = args.target_cf {
        let params = session.context().params().with_target_cf(target_cf);
        session
            .set_params(0, params)
            .context("applying --target-cf")?;
        // One-shot run: let the quiet interval elapse immediately.
        let due = session.config().recompute.debounce_ms;
        session.tick(due)?;
    }

    let snapshot = session.snapshot();
    info!(
        locations = snapshot.results.len(),
        meeting_target = snapshot.results.iter().filter(|r| r.result.meets_target).count(),
        legend = ?snapshot.legend.kind,
        "analysis complete"
    );

    write_json(&render(snapshot, diagnostics.warning_count()), args.out)
}

fn render(snapshot: &AnalysisSnapshot, dropped_rows: usize) -> AnalyzeOutput<'_> {
    let scale = ColorScale::for_legend(&snapshot.legend);
    AnalyzeOutput {
        mode: snapshot.mode,
        reference: snapshot.reference.as_ref(),
        legend: &snapshot.legend,
        legend_locked: snapshot.context.lock().is_engaged(),
        params: snapshot.context.params(),
        results: snapshot
            .results
            .iter()
            .map(|point| RenderedResult {
                point,
                fill: fill_color(point, &snapshot.legend, &scale),
            })
            .collect(),
        dropped_rows,
    }
}
