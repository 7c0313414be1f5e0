//! Spreadsheet A1-notation helpers.
//!
//! Column identifiers in the variable store are spreadsheet letters
//! (`A`, `D`, `AB`), and chart ranges are expressed the same way so a
//! chart definition can be read against the output table directly.

use crate::error::{AccelError, Result};

const RADIX: usize = 26;

/// Convert column letters to a 1-based column index (`A` = 1, `AA` = 27).
pub fn column_to_index(letters: &str) -> Result<usize> {
    if letters.is_empty() || !letters.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(AccelError::InvalidColumnReference(letters.to_string()));
    }

    let mut sum: usize = 0;
    for b in letters.bytes() {
        let digit = (b - b'A') as usize + 1;
        sum = sum
            .checked_mul(RADIX)
            .and_then(|s| s.checked_add(digit))
            .ok_or_else(|| AccelError::InvalidColumnReference(letters.to_string()))?;
    }
    Ok(sum)
}

/// Convert a 1-based column index back to its letters. Index 0 yields "".
pub fn index_to_column(index: usize) -> String {
    let mut column = index;
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % RADIX;
        letters.push(b'A' + rem as u8);
        column = (column - rem - 1) / RADIX;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Parse a 1-based row number such as `12`.
pub fn row_to_index(row: &str) -> Result<usize> {
    row.trim()
        .parse::<usize>()
        .map_err(|_| AccelError::InvalidRowReference(row.to_string()))
}

/// Column range spanning `first_row..=last_row`, e.g. `F1:F101`.
pub fn column_range(col: usize, first_row: usize, last_row: usize) -> String {
    let letters = index_to_column(col);
    format!("{letters}{first_row}:{letters}{last_row}")
}
