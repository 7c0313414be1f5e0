use csv::WriterBuilder;
use log::{debug, info};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{AccelError, Result};
use crate::recurrence::DerivedSeries;
use crate::source::SourceTable;
use crate::types::{DerivedRow, Insights};

/// Base name of the processed table.
pub const OUTPUT_TABLE: &str = "acc-processed";

// Output column positions (1-based). A..E hold the copied source columns.
pub const RAW_COLUMNS: usize = 5;
pub const COL_ELAPSED_TIME: usize = 6;
pub const COL_SHIFT_VALUE: usize = 7;
pub const COL_G_COMPENSATED: usize = 8;
pub const COL_SHIFTED: usize = 9;
pub const COL_DELTA_T: usize = 10;
pub const COL_INT_V: usize = 11;
pub const COL_VELOCITY: usize = 12;
pub const COL_INT_D: usize = 13;
pub const COL_DISPLACEMENT: usize = 14;
pub const COL_INSIGHT_LABEL: usize = 16;
pub const COL_INSIGHT_VALUE: usize = 17;
pub const TABLE_WIDTH: usize = COL_INSIGHT_VALUE;

const DERIVED_HEADERS: [(usize, &str); 9] = [
    (COL_ELAPSED_TIME, "loggingElapsedTime"),
    (COL_SHIFT_VALUE, "shiftValue"),
    (COL_G_COMPENSATED, "accY-compensated-inverted"),
    (COL_SHIFTED, "accY-compensated-inverted-shifted"),
    (COL_DELTA_T, "deltaT"),
    (COL_INT_V, "int_v"),
    (COL_VELOCITY, "v(t)"),
    (COL_INT_D, "int_d"),
    (COL_DISPLACEMENT, "d(t)"),
];

/// A table name/path that does not exist yet in `dir`.
pub struct FreshTable {
    pub name: String,
    pub path: PathBuf,
}

/// Reserve `acc-processed.csv`, or `acc-processed-2.csv`, `-3`, ... when
/// earlier runs already created it. The file is created here so two runs
/// can never pick the same name.
pub fn create_fresh_table(dir: &Path) -> Result<(FreshTable, std::fs::File)> {
    let mut attempt = 1usize;
    loop {
        let name = if attempt == 1 {
            OUTPUT_TABLE.to_string()
        } else {
            format!("{OUTPUT_TABLE}-{attempt}")
        };
        let path = dir.join(format!("{name}.csv"));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => {
                debug!("reserved output table {}", path.display());
                return Ok((FreshTable { name, path }, file));
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(AccelError::Io(e)),
        }
    }
}

fn blank_row() -> Vec<String> {
    vec![String::new(); TABLE_WIDTH]
}

fn put(row: &mut [String], col: usize, value: impl ToString) {
    row[col - 1] = value.to_string();
}

fn put_derived(row: &mut [String], derived: &DerivedRow) {
    put(row, COL_ELAPSED_TIME, derived.elapsed_time);
    put(row, COL_G_COMPENSATED, derived.g_compensated_inverted);
    put(row, COL_SHIFTED, derived.shifted_accel);
    put(row, COL_DELTA_T, derived.delta_t);
    put(row, COL_INT_V, derived.velocity_increment);
    put(row, COL_VELOCITY, derived.velocity);
    put(row, COL_INT_D, derived.displacement_increment);
    put(row, COL_DISPLACEMENT, derived.displacement);
}

/// Write the processed table: copied source columns, derived columns, and
/// the insight block (labels in P, values in Q, from row 2).
///
/// Returns the number of rows written, header included.
pub fn write_table<W: Write>(
    writer: W,
    source: &SourceTable,
    series: &DerivedSeries,
    insights: &Insights,
) -> Result<usize> {
    let mut wtr = WriterBuilder::new().from_writer(writer);

    let mut header = blank_row();
    for (slot, cell) in source.headers.iter().enumerate() {
        put(&mut header, slot + 1, cell);
    }
    for (col, name) in DERIVED_HEADERS {
        put(&mut header, col, name);
    }
    put(&mut header, COL_INSIGHT_LABEL, "insight");
    put(&mut header, COL_INSIGHT_VALUE, "value");
    wtr.write_record(&header)?;

    let labelled = insights.labelled();
    let data_rows = series.rows.len().max(labelled.len());
    for i in 0..data_rows {
        let mut row = blank_row();
        if let (Some(cells), Some(derived)) = (source.cells.get(i), series.rows.get(i)) {
            for (slot, cell) in cells.iter().enumerate() {
                put(&mut row, slot + 1, cell);
            }
            put_derived(&mut row, derived);
        }
        if i == 0 {
            put(&mut row, COL_SHIFT_VALUE, series.shift_value);
        }
        if let Some((label, value)) = labelled.get(i) {
            put(&mut row, COL_INSIGHT_LABEL, label);
            put(&mut row, COL_INSIGHT_VALUE, value);
        }
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    info!("wrote {} rows x {} columns", data_rows + 1, TABLE_WIDTH);
    Ok(data_rows + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::derive;
    use crate::insights::summarize;
    use crate::types::Reading;

    fn source(n: usize) -> SourceTable {
        let readings: Vec<Reading> = (0..n)
            .map(|i| Reading::new(i as i64, i as i64 + 1, 0.0, -(i as f64) / 10.0, 1.0))
            .collect();
        let cells = readings
            .iter()
            .map(|r| {
                [
                    r.timestamp.to_string(),
                    r.sample_index.to_string(),
                    "0.0".to_string(),
                    r.acc_y.to_string(),
                    "1.0".to_string(),
                ]
            })
            .collect();
        SourceTable {
            name: "mem".to_string(),
            headers: ["unix", "n", "ax", "ay", "az"].map(String::from),
            cells,
            readings,
        }
    }

    fn render(n: usize) -> Vec<Vec<String>> {
        let table = source(n);
        let series = derive(&table.readings, 1, 1).unwrap();
        let insights = summarize(&series.rows).unwrap();
        let mut buf = Vec::new();
        write_table(&mut buf, &table, &series, &insights).unwrap();
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(buf.as_slice());
        rdr.records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect()
    }

    #[test]
    fn test_header_layout() {
        let rows = render(8);
        let header = &rows[0];
        assert_eq!(header.len(), TABLE_WIDTH);
        assert_eq!(header[0], "unix");
        assert_eq!(header[4], "az");
        assert_eq!(header[COL_ELAPSED_TIME - 1], "loggingElapsedTime");
        assert_eq!(header[COL_VELOCITY - 1], "v(t)");
        assert_eq!(header[COL_DISPLACEMENT - 1], "d(t)");
        assert_eq!(header[14], "");
    }

    #[test]
    fn test_one_row_per_reading() {
        let rows = render(8);
        assert_eq!(rows.len(), 9);
        assert_eq!(rows[1][COL_VELOCITY - 1], "0");
        assert_eq!(rows[1][COL_DISPLACEMENT - 1], "0");
        assert_eq!(rows[1][COL_SHIFT_VALUE - 1], "0");
        assert_eq!(rows[2][COL_SHIFT_VALUE - 1], "");
        assert_eq!(rows[8][0], "7");
    }

    #[test]
    fn test_insight_block() {
        let rows = render(8);
        assert_eq!(rows[1][COL_INSIGHT_LABEL - 1], "Total Distance Travelled");
        assert_eq!(rows[5][COL_INSIGHT_LABEL - 1], "Mean Acceleration");
        assert_eq!(rows[6][COL_INSIGHT_LABEL - 1], "");
        let max_v: f64 = rows[2][COL_INSIGHT_VALUE - 1].parse().unwrap();
        assert!(max_v > 0.0);
    }

    #[test]
    fn test_short_data_still_fits_insights() {
        let rows = render(2);
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[4][COL_INSIGHT_LABEL - 1], "Mean Velocity");
        assert_eq!(rows[4][0], "");
        assert_eq!(rows[4][COL_VELOCITY - 1], "");
    }

    #[test]
    fn test_fresh_table_never_clobbers() {
        let dir = std::env::temp_dir().join(format!("accel-output-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let (first, _f1) = create_fresh_table(&dir).unwrap();
        let (second, _f2) = create_fresh_table(&dir).unwrap();
        let (third, _f3) = create_fresh_table(&dir).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(first.name, "acc-processed");
        assert_eq!(second.name, "acc-processed-2");
        assert_eq!(third.name, "acc-processed-3");
    }
}
