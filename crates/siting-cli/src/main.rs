use clap::Parser;
use siting_algo::WebMercatorViewport;
use siting_cli::{Cli, Commands};
use tracing::error;
use tracing_subscriber::FmtSubscriber;

mod commands;

use crate::commands::{analyze, capacity, config, population, tessellate};

fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Analyze {
            rows,
            config,
            target_cf,
            reference,
            metric,
            lock_legend,
            out,
        } => analyze::handle(analyze::AnalyzeArgs {
            rows,
            config: config.as_ref(),
            target_cf: *target_cf,
            reference: *reference,
            metric: *metric,
            lock_legend: *lock_legend,
            out: out.as_ref(),
        }),
        Commands::Tessellate {
            rows,
            config,
            width,
            height,
            center_lat,
            center_lon,
            zoom,
            land,
            out,
        } => tessellate::handle(tessellate::TessellateArgs {
            rows,
            config: config.as_ref(),
            viewport: WebMercatorViewport::new(*center_lat, *center_lon, *zoom, *width, *height),
            land: land.as_ref(),
            out: out.as_ref(),
        }),
        Commands::Capacity {
            rows,
            solar,
            batt,
            out,
        } => capacity::handle(rows, *solar, *batt, out.as_ref()),
        Commands::Population {
            rows,
            population,
            config,
            metric,
            solar,
            batt,
            step,
            buckets,
            out,
        } => population::handle(population::PopulationArgs {
            rows,
            population,
            config: config.as_ref(),
            metric: (*metric).into(),
            build: solar.zip(*batt),
            step: *step,
            buckets: *buckets,
            out: out.as_ref(),
        }),
        Commands::Config { command } => config::handle(command),
    }
}

fn main() {
    let cli = Cli::parse();

    // JSON goes to stdout, so logs stay on stderr.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install log subscriber: {err}");
    }

    if let Err(err) = run(&cli) {
        error!("{err:#}");
        std::process::exit(1);
    }
}
