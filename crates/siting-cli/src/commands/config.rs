//! `siting config`: write or print the TOML configuration.

use anyhow::{anyhow, bail, Context, Result};
use siting_session::SitingConfig;
use std::path::PathBuf;
use tracing::info;

use siting_cli::ConfigCommands;

use crate::commands::util::load_config;

pub fn handle(command: &ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Init { path, force } => handle_init(path.as_ref(), *force),
        ConfigCommands::Show { path } => handle_show(path.as_ref()),
    }
}

fn handle_init(path: Option<&PathBuf>, force: bool) -> Result<()> {
    let target = match path {
        Some(path) => path.clone(),
        None => SitingConfig::config_path()
            .ok_or_else(|| anyhow!("could not determine config directory"))?,
    };
    if target.exists() && !force {
        bail!(
            "config already exists at {} (use --force to overwrite)",
            target.display()
        );
    }

    let config = SitingConfig::default();
    let written = match path {
        Some(path) => config.save_to(path).map(|()| path.clone()),
        None => config.save(),
    }
    .with_context(|| format!("writing config to {}", target.display()))?;
    info!(path = %written.display(), "wrote default config");
    println!("Wrote default configuration to {}", written.display());
    Ok(())
}

fn handle_show(path: Option<&PathBuf>) -> Result<()> {
    let config = load_config(path)?;
    print!("{}", config.to_toml().context("serializing config")?);
    Ok(())
}
