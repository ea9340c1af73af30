//! `siting tessellate`: Voronoi cells for the current results.

use anyhow::{Context, Result};
use serde::Serialize;
use siting_algo::{
    fill_color, CellOutline, ColorScale, LandMask, LegendDomain, Rgb, WebMercatorViewport,
};
use siting_core::Diagnostics;
use siting_session::{Session, SessionEvent};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::info;

use crate::commands::util::{load_config, load_rows, report_diagnostics, write_json};

pub struct TessellateArgs<'a> {
    pub rows: &'a PathBuf,
    pub config: Option<&'a PathBuf>,
    pub viewport: WebMercatorViewport,
    pub land: Option<&'a PathBuf>,
    pub out: Option<&'a PathBuf>,
}

#[derive(Debug, Serialize)]
struct FilledCell {
    #[serde(flatten)]
    outline: CellOutline,
    fill: Rgb,
}

#[derive(Debug, Serialize)]
struct TessellateOutput<'a> {
    viewport: WebMercatorViewport,
    legend: &'a LegendDomain,
    event: &'a SessionEvent,
    cells: Vec<FilledCell>,
}

/// Land polygons as GeoJSON-style coordinates: `[exterior, holes...]` per polygon.
fn load_land(path: &PathBuf) -> Result<Vec<Vec<Vec<[f64; 2]>>>> {
    let file = File::open(path)
        .with_context(|| format!("opening land mask: {}", path.display()))?;
    let polygons: Vec<Vec<Vec<[f64; 2]>>> =
        serde_json::from_reader(BufReader::new(file)).context("parsing land mask JSON")?;
    Ok(polygons)
}

pub fn handle(args: TessellateArgs<'_>) -> Result<()> {
    let config = load_config(args.config)?;
    let rows = load_rows(args.rows)?;

    let mut diagnostics = Diagnostics::new();
    let session = Session::new(rows, config, &mut diagnostics);
    report_diagnostics(&diagnostics);

    let land = args
        .land
        .map(|path| -> Result<LandMask> {
            let polygons = load_land(path)?;
            Ok(LandMask::project(&polygons, &args.viewport)?)
        })
        .transpose()?;

    let tessellation = session.tessellate(&args.viewport, land.as_ref());
    let snapshot = session.snapshot();
    let scale = ColorScale::for_legend(&snapshot.legend);

    let filled: Vec<FilledCell> = tessellation
        .cells
        .iter()
        .map(|cell| {
            let fill = snapshot
                .result(cell.location_id)
                .map_or(siting_algo::NO_DATA, |point| {
                    fill_color(point, &snapshot.legend, &scale)
                });
            FilledCell {
                outline: cell.outline(),
                fill,
            }
        })
        .collect();

    info!(
        cells = filled.len(),
        land_clipped = land.is_some(),
        "tessellation complete"
    );

    write_json(
        &TessellateOutput {
            viewport: args.viewport,
            legend: &snapshot.legend,
            event: &tessellation.event,
            cells: filled,
        },
        args.out,
    )
}
