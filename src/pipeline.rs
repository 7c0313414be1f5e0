use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::charts::{self, ChartManifest, Quantity};
use crate::config::ProcessingConfig;
use crate::error::{AccelError, Result};
use crate::insights::summarize;
use crate::output::{create_fresh_table, write_table, FreshTable};
use crate::recurrence::{derive, DerivedSeries};
use crate::source::{self, SourceTable};
use crate::types::{Insights, Reading};

/// Summary of one `process` run.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessReport {
    pub source: String,
    pub table: String,
    pub table_path: PathBuf,
    pub rows_written: usize,
    pub readings: usize,
    pub first_reading: Option<String>,
    pub last_reading: Option<String>,
    pub elapsed_seconds: f64,
    pub shift_value: f64,
    pub insights: Insights,
    pub charts: Vec<PathBuf>,
}

/// Fill the reserved table and render its charts.
fn write_outputs(
    out_dir: &Path,
    fresh: &FreshTable,
    file: std::fs::File,
    table: &SourceTable,
    series: &DerivedSeries,
    insights: &Insights,
) -> Result<(usize, ChartManifest)> {
    let rows_written = write_table(BufWriter::new(file), table, series, insights)?;
    info!("processed table written to {}", fresh.path.display());
    let manifest = charts::render_all(out_dir, &fresh.name, &series.rows)?;
    Ok((rows_written, manifest))
}

/// Remove whatever a failed run left under `fresh`'s name.
fn discard_outputs(out_dir: &Path, fresh: &FreshTable) {
    let leftovers = Quantity::ALL
        .iter()
        .map(|&q| charts::chart_file(out_dir, &fresh.name, q))
        .chain([charts::manifest_file(out_dir, &fresh.name), fresh.path.clone()]);
    for path in leftovers.filter(|p| p.is_file()) {
        if let Err(e) = std::fs::remove_file(&path) {
            warn!("could not remove {}: {e}", path.display());
        }
    }
}

fn utc(reading: Option<&Reading>) -> Option<String> {
    reading
        .and_then(|r| DateTime::<Utc>::from_timestamp(r.timestamp, 0))
        .map(|t| t.to_rfc3339())
}

/// Run the whole pipeline: read the configured columns, derive, summarise,
/// then write a new processed table and its charts under `out_dir`.
///
/// Everything that can fail on bad input happens before the first file is
/// created.
pub fn process(config: &ProcessingConfig, out_dir: &Path) -> Result<ProcessReport> {
    let table = source::load(&config.data_sheet, &config.columns)?;
    let series = derive(
        &table.readings,
        config.shift_sample_from,
        config.shift_sample_to,
    )?;
    let insights =
        summarize(&series.rows).ok_or_else(|| AccelError::EmptyDataSet(table.name.clone()))?;

    let first_reading = utc(table.readings.first());
    let last_reading = utc(table.readings.last());
    let elapsed_seconds = series.rows.last().map_or(0.0, |r| r.elapsed_time);
    info!(
        "{} readings from {} to {} ({elapsed_seconds} s), shift {:.4} m/s²",
        table.readings.len(),
        first_reading.as_deref().unwrap_or("?"),
        last_reading.as_deref().unwrap_or("?"),
        series.shift_value
    );

    std::fs::create_dir_all(out_dir)?;
    let (fresh, file) = create_fresh_table(out_dir)?;
    let (rows_written, manifest) =
        match write_outputs(out_dir, &fresh, file, &table, &series, &insights) {
            Ok(written) => written,
            Err(e) => {
                discard_outputs(out_dir, &fresh);
                return Err(e);
            }
        };

    Ok(ProcessReport {
        source: table.name,
        table: fresh.name,
        table_path: fresh.path,
        rows_written,
        readings: table.readings.len(),
        first_reading,
        last_reading,
        elapsed_seconds,
        shift_value: series.shift_value,
        insights,
        charts: manifest.charts.into_iter().map(|c| c.file).collect(),
    })
}
