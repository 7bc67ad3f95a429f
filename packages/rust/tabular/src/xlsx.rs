//! Excel import (xlsx, xls, xlsb, ods) via calamine.
//!
//! One-way conversion: the first sheet's first row becomes the header row,
//! everything below becomes data rows. Cell values are stringified the way
//! they display; empty cells stay `None`.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use tracing::debug;

use enrichmail_shared::{EnrichmailError, Result};

use crate::dataset::Table;

/// Import the first worksheet of an Excel workbook.
pub fn import(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        EnrichmailError::input(format!("cannot open workbook {}: {e}", path.display()))
    })?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| EnrichmailError::input("workbook has no sheets"))?;

    let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
        EnrichmailError::input(format!("cannot read sheet '{sheet_name}': {e}"))
    })?;

    let mut rows_iter = range.rows();

    let headers: Vec<String> = match rows_iter.next() {
        Some(first) => first.iter().map(cell_to_string).collect(),
        None => {
            return Err(EnrichmailError::input(format!(
                "sheet '{sheet_name}' is empty — expected a header row"
            )));
        }
    };

    let rows: Vec<Vec<Option<String>>> = rows_iter
        .map(|row| row.iter().map(cell_to_opt_string).collect())
        .collect();

    debug!(
        sheet = %sheet_name,
        rows = rows.len(),
        columns = headers.len(),
        "workbook imported"
    );

    Ok(Table::new(headers, rows))
}

/// Stringify a cell the way it displays. Used for headers, where an empty
/// name is still a (nameless) column.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(n) => n.to_string(),
        Data::Float(f) => {
            // Integral floats print without the trailing ".0" Excel hides
            if f.fract() == 0.0 && f.is_finite() {
                format!("{}", *f as i64)
            } else {
                format!("{f}")
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => format!("#ERR({e:?})"),
        Data::DateTime(dt) => format!("{dt}"),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Stringify a data cell, mapping empty cells to `None`.
fn cell_to_opt_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        other => Some(cell_to_string(other)),
    }
}
