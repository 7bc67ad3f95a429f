//! Tabular input for enrichmail: the in-memory [`Table`] model plus loading
//! from delimited text (`csv` with delimiter sniffing) and Excel workbooks
//! (`calamine`).
//!
//! A malformed or unsupported input file is fatal here, before any
//! verification call is made.

pub mod csv;
pub mod dataset;
pub mod xlsx;

use std::path::Path;

use tracing::info;

use enrichmail_shared::{EnrichmailError, Result};

pub use dataset::Table;

/// Load a table from a file, dispatching on its extension.
///
/// `.csv` is delimiter-sniffed; `.tsv` is read tab-separated; `.xlsx`,
/// `.xls`, `.xlsb`, and `.ods` go through calamine. Anything else is an
/// input error.
pub fn load_table(path: &Path) -> Result<Table> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let table = match extension.as_str() {
        "csv" => csv::import(path)?,
        "tsv" => csv::import_tsv(path)?,
        "xlsx" | "xls" | "xlsb" | "ods" => xlsx::import(path)?,
        other => {
            return Err(EnrichmailError::input(format!(
                "unsupported input format '.{other}' for {} — expected csv, tsv, xlsx, or xls",
                path.display()
            )));
        }
    };

    info!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.column_count(),
        "input table loaded"
    );

    Ok(table)
}
