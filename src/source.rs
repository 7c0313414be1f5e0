use csv::{ReaderBuilder, StringRecord};
use flate2::read::GzDecoder;
use log::{info, warn};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use crate::a1_notation::index_to_column;
use crate::config::ColumnMap;
use crate::error::{AccelError, Result};
use crate::types::Reading;

/// The five configured columns of a source table, as read.
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub name: String,
    /// Header cells of the five columns, in output order.
    pub headers: [String; 5],
    /// Verbatim cell text per data row, for copying.
    pub cells: Vec<[String; 5]>,
    pub readings: Vec<Reading>,
}

impl SourceTable {
    /// Rows in the table, header included.
    pub fn row_count(&self) -> usize {
        self.readings.len() + 1
    }
}

/// Open a data file, decompressing `.gz` transparently.
pub fn open(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path)?;
    if path.extension().map(|e| e == "gz").unwrap_or(false) {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Load the configured columns from the CSV at `path`.
pub fn load(path: &Path, columns: &ColumnMap) -> Result<SourceTable> {
    let name = path.display().to_string();
    let table = read_table(open(path)?, &name, columns)?;
    info!(
        "loaded {} readings from {} ({} rows)",
        table.readings.len(),
        name,
        table.row_count()
    );
    Ok(table)
}

fn parse_cell<T: FromStr>(cells: &[String; 5], slot: usize, row: usize, col: usize) -> Result<T> {
    cells[slot]
        .trim()
        .parse::<T>()
        .map_err(|_| AccelError::MalformedRecord {
            row,
            column: index_to_column(col),
            value: cells[slot].clone(),
        })
}

fn pick(record: &StringRecord, cols: [usize; 5]) -> [Option<String>; 5] {
    cols.map(|c| record.get(c - 1).map(str::to_string))
}

/// Read a CSV table whose first row is the header.
///
/// Rows are numbered as in a spreadsheet: the header is row 1, so the first
/// reading sits on row 2.
pub fn read_table<R: Read>(reader: R, name: &str, columns: &ColumnMap) -> Result<SourceTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let cols = columns.in_order();
    let header_record = rdr.headers()?.clone();
    let width = header_record.len();
    if let Some(&col) = cols.iter().find(|&&c| c > width) {
        return Err(AccelError::ColumnOutOfRange {
            letter: index_to_column(col),
            width,
        });
    }
    let headers = pick(&header_record, cols).map(Option::unwrap_or_default);

    let mut cells = Vec::new();
    let mut readings = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result?;
        let row = idx + 2;

        let picked = pick(&record, cols);
        if let Some(slot) = picked.iter().position(Option::is_none) {
            warn!("row {row} is shorter than the header ({} cells)", record.len());
            return Err(AccelError::MalformedRecord {
                row,
                column: index_to_column(cols[slot]),
                value: String::new(),
            });
        }
        let row_cells = picked.map(Option::unwrap_or_default);

        readings.push(Reading {
            timestamp: parse_cell(&row_cells, 0, row, cols[0])?,
            sample_index: parse_cell(&row_cells, 1, row, cols[1])?,
            acc_x: parse_cell(&row_cells, 2, row, cols[2])?,
            acc_y: parse_cell(&row_cells, 3, row, cols[3])?,
            acc_z: parse_cell(&row_cells, 4, row, cols[4])?,
        });
        cells.push(row_cells);
    }

    if readings.is_empty() {
        return Err(AccelError::EmptyDataSet(name.to_string()));
    }

    Ok(SourceTable {
        name: name.to_string(),
        headers,
        cells,
        readings,
    })
}
