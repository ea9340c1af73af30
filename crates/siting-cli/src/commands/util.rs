//! Shared loading and output helpers for CLI commands.

use anyhow::{Context, Result};
use serde::Serialize;
use siting_algo::PopulationCell;
use siting_core::{Diagnostics, SimulationRow};
use siting_session::SitingConfig;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Read simulation rows from CSV.
///
/// Expected format:
/// ```csv
/// location_id,latitude,longitude,solar_gw,batt_gwh,annual_cf
/// 1,33.45,-112.07,5,8,0.92
/// ```
pub fn load_rows(path: &Path) -> Result<Vec<SimulationRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening rows CSV: {}", path.display()))?;

    let mut rows = Vec::new();
    for (i, record) in reader.deserialize::<SimulationRow>().enumerate() {
        // Line 1 is the header.
        let row = record.with_context(|| format!("reading rows CSV record at line {}", i + 2))?;
        rows.push(row);
    }
    info!(rows = rows.len(), path = %path.display(), "loaded simulation rows");
    Ok(rows)
}

/// Read population grid points from CSV (`latitude,longitude,population`).
pub fn load_population(path: &Path) -> Result<Vec<PopulationCell>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening population CSV: {}", path.display()))?;
    let cells = reader
        .deserialize::<PopulationCell>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("reading population CSV: {}", path.display()))?;
    info!(cells = cells.len(), "loaded population grid");
    Ok(cells)
}

/// Load `path`, or the default config location when `None`.
pub fn load_config(path: Option<&PathBuf>) -> Result<SitingConfig> {
    let config = match path {
        Some(path) => SitingConfig::load_from(path)
            .with_context(|| format!("loading config: {}", path.display()))?,
        None => SitingConfig::load().context("loading default config")?,
    };
    Ok(config)
}

/// Log every dropped row, then the summary.
pub fn report_diagnostics(diagnostics: &Diagnostics) {
    if !diagnostics.has_issues() {
        return;
    }
    for issue in &diagnostics.issues {
        warn!("{issue}");
    }
    warn!("input diagnostics: {}", diagnostics.summary());
}

/// Pretty JSON to `out`, or to stdout.
pub fn write_json<T: Serialize>(value: &T, out: Option<&PathBuf>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serializing output")?;
    match out {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("creating output file: {}", path.display()))?;
            file.write_all(json.as_bytes()).context("writing output")?;
            info!(path = %path.display(), "wrote output");
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{json}").context("writing output")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_rows() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "location_id,latitude,longitude,solar_gw,batt_gwh,annual_cf").unwrap();
        writeln!(file, "1,33.45,-112.07,5,8,0.92").unwrap();
        writeln!(file, "1,33.45,-112.07,3,4,0.71").unwrap();
        file.flush().unwrap();

        let rows = load_rows(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].solar_gw.value(), 5.0);
        assert_eq!(rows[1].annual_cf, 0.71);
    }

    #[test]
    fn test_load_rows_reports_bad_line() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "location_id,latitude,longitude,solar_gw,batt_gwh,annual_cf").unwrap();
        writeln!(file, "1,33.45,-112.07,5,8,0.92").unwrap();
        writeln!(file, "x,33.45,-112.07,5,8,0.92").unwrap();
        file.flush().unwrap();

        let err = load_rows(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("line 3"));
    }
}
