//! Read-only views over the stored data.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use tmi_store::views::expand_bands;
use tmi_store::{BandRow, StoredSpeedTest};

use crate::cli::RangeArgs;
use crate::config::Config;
use crate::format::{format_band_rows, format_stored_speed_test};
use crate::util::{open_store, range_query, write_output};

pub fn cmd_last(config: &Config, count: u32, json: bool) -> Result<()> {
    let store = open_store(config)?;
    let rows = store.get_last_stats(count)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else if rows.is_empty() {
        println!("No samples recorded yet. Run `tmi-stats watch` to start collecting.");
    } else {
        print!("{}", format_band_rows(&rows));
    }
    Ok(())
}

#[derive(Serialize)]
struct RangeReport {
    bands: Vec<BandRow>,
    speed_tests: Vec<StoredSpeedTest>,
}

pub fn cmd_range(config: &Config, range: &RangeArgs, json: bool) -> Result<()> {
    let query = range_query(range)?;
    let store = open_store(config)?;

    let samples = store.query_stats(&query)?;
    let report = RangeReport {
        bands: samples.iter().flat_map(expand_bands).collect(),
        speed_tests: store.query_speed_tests(&query)?,
    };
    info!(
        "{} samples and {} speed tests in range",
        samples.len(),
        report.speed_tests.len()
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let mut out = format_band_rows(&report.bands);
    if !report.speed_tests.is_empty() {
        out.push_str("\nSpeed tests:\n");
        for test in &report.speed_tests {
            out.push_str(&format_stored_speed_test(test));
        }
    }
    write_output(None, &out)
}

pub fn cmd_export(config: &Config, range: &RangeArgs, output: Option<&Path>) -> Result<()> {
    let query = range_query(range)?;
    let store = open_store(config)?;

    let written = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            let written = store.export_bands_csv(&mut writer, &query)?;
            writer.flush()?;
            written
        }
        None => store.export_bands_csv(io::stdout().lock(), &query)?,
    };

    if let Some(path) = output {
        eprintln!("Exported {written} rows to {}", path.display());
    }
    Ok(())
}
