//! In-memory table model for uploaded contact data.
//!
//! The table is an opaque bag of column→value pairs: the pipeline reads it,
//! joins classification results against it by normalized address, and copies
//! it verbatim into the report. It is never mutated after loading.

/// One loaded tabular dataset: a header row plus data rows.
///
/// Cells are `Option<String>` so genuinely empty cells stay distinguishable
/// from cells holding an empty-looking string the source actually contained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Column names from the first row of the source file, in source order.
    pub headers: Vec<String>,
    /// Data rows. Rows may be ragged; out-of-range cells read as empty.
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Build a table from a header row and data rows.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { headers, rows }
    }

    /// Number of data rows (excluding the header row).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns, per the header row.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Cell value at `(row, col)`, or `None` for empty/out-of-range cells.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .and_then(|c| c.as_deref())
    }
}
