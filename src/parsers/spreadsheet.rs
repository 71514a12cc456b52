//! Workbook row parsing via `calamine`.
//!
//! Only the first sheet is read. Its first non-empty row is the header; every
//! following row becomes one [`RawRow`] keyed by header text. Cell values are
//! rendered as text without further cleanup, and empty cells are left out of
//! the row entirely.

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{Data, DataType, Range, Reader, open_workbook_auto_from_rs};
use tracing::debug;

use crate::error::{ChatlensError, Result};
use crate::message::RawRow;

const FORMAT: &str = "spreadsheet";

/// Decodes workbook bytes into raw rows from the first sheet.
///
/// # Errors
///
/// Returns [`ChatlensError::Decode`] if the workbook cannot be opened or has
/// no sheets.
pub fn parse_workbook(bytes: &[u8]) -> Result<Vec<RawRow>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ChatlensError::decode(FORMAT, e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ChatlensError::decode(FORMAT, "workbook has no sheets".to_string()))?
        .map_err(|e| ChatlensError::decode(FORMAT, e))?;

    let rows = rows_from_range(&range);
    debug!(rows = rows.len(), "spreadsheet rows read");
    Ok(rows)
}

/// Converts a cell range into raw rows, using its first non-blank row as header.
pub fn rows_from_range(range: &Range<Data>) -> Vec<RawRow> {
    let mut iter = range.rows().skip_while(|row| is_blank(row));

    let Some(header_row) = iter.next() else {
        return Vec::new();
    };
    let headers = unique_headers(header_row);

    iter.filter(|row| !is_blank(row))
        .map(|row| {
            headers
                .iter()
                .zip(row)
                .filter_map(|(header, cell)| {
                    let header = header.as_ref()?;
                    let text = cell_text(cell)?;
                    Some((header.clone(), text))
                })
                .collect::<RawRow>()
        })
        .filter(|row| !row.is_empty())
        .collect()
}

fn is_blank(row: &[Data]) -> bool {
    row.iter().all(|cell| cell_text(cell).is_none())
}

/// Header texts; repeats get a `_1`, `_2`, ... suffix, blank cells are `None`.
fn unique_headers(row: &[Data]) -> Vec<Option<String>> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    row.iter()
        .map(|cell| {
            let name = cell_text(cell)?.trim().to_string();
            if name.is_empty() {
                return None;
            }
            let count = seen.entry(name.clone()).or_insert(0);
            let unique = if *count == 0 {
                name
            } else {
                format!("{}_{}", name, count)
            };
            *count += 1;
            Some(unique)
        })
        .collect()
}

/// Renders one cell as text; `None` for empty cells.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::DateTime(_) => cell
            .as_datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        other => Some(other.to_string()),
    }
}
