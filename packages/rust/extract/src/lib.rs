//! Candidate address extraction.
//!
//! Scans a loaded table for email-bearing columns (any header containing
//! "email", case-insensitively), flattens their cells row-major, normalizes
//! each value into the canonical join key, and deduplicates keeping
//! first-seen order.
//!
//! No syntax validation happens here. Malformed strings are passed through
//! to verification, which is authoritative on validity.

use std::collections::HashSet;

use tracing::{debug, instrument};

use enrichmail_shared::normalize_address;
use enrichmail_tabular::Table;

/// Header substring (matched case-insensitively) that flags a column as
/// email-bearing.
const EMAIL_COLUMN_MARKER: &str = "email";

/// Result of scanning one table for candidate addresses.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Deduplicated normalized addresses, in first-seen order.
    pub addresses: Vec<String>,
    /// Indexes of email-bearing columns, in source column order.
    pub email_columns: Vec<usize>,
}

/// Find the indexes of email-bearing columns. Computed once per dataset;
/// source column order is preserved.
pub fn email_columns(table: &Table) -> Vec<usize> {
    table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, name)| name.to_lowercase().contains(EMAIL_COLUMN_MARKER))
        .map(|(idx, _)| idx)
        .collect()
}

/// Extract the ordered, deduplicated candidate address set from a table.
///
/// A table with zero email-like columns yields an empty extraction; that is
/// a valid outcome, not an error.
#[instrument(skip_all, fields(rows = table.row_count(), columns = table.column_count()))]
pub fn extract(table: &Table) -> Extraction {
    let columns = email_columns(table);
    if columns.is_empty() {
        debug!("no email-like columns found");
        return Extraction::default();
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut addresses: Vec<String> = Vec::new();

    for row in 0..table.row_count() {
        for &col in &columns {
            let Some(raw) = table.cell(row, col) else {
                continue;
            };
            let normalized = normalize_address(raw);
            if normalized.is_empty() {
                continue;
            }
            if seen.insert(normalized.clone()) {
                addresses.push(normalized);
            }
        }
    }

    debug!(
        candidates = addresses.len(),
        email_columns = columns.len(),
        "extraction complete"
    );

    Extraction {
        addresses,
        email_columns: columns,
    }
}
