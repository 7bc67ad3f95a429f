//! Delimited-text import (CSV/TSV) with delimiter sniffing.

use std::path::Path;

use tracing::debug;

use enrichmail_shared::{EnrichmailError, Result};

use crate::dataset::Table;

/// Import a delimited text file, sniffing the delimiter from its content.
pub fn import(path: &Path) -> Result<Table> {
    let content =
        std::fs::read_to_string(path).map_err(|e| EnrichmailError::io(path, e))?;
    let delimiter = sniff_delimiter(&content);
    debug!(delimiter = %(delimiter as char), "delimiter sniffed");
    import_from_str(&content, delimiter)
}

/// Import a tab-separated file without sniffing.
pub fn import_tsv(path: &Path) -> Result<Table> {
    let content =
        std::fs::read_to_string(path).map_err(|e| EnrichmailError::io(path, e))?;
    import_from_str(&content, b'\t')
}

/// Parse delimited content with an explicit delimiter. The first record is
/// the header row; everything after is data.
pub fn import_from_str(content: &str, delimiter: u8) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();

    let headers: Vec<String> = match records.next() {
        Some(first) => first
            .map_err(|e| EnrichmailError::input(format!("malformed header row: {e}")))?
            .iter()
            .map(str::to_string)
            .collect(),
        None => {
            return Err(EnrichmailError::input(
                "input file is empty — expected a header row",
            ));
        }
    };

    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    for record in records {
        let record =
            record.map_err(|e| EnrichmailError::input(format!("malformed row: {e}")))?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        None
                    } else {
                        Some(field.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(Table::new(headers, rows))
}

/// Detect the most likely field delimiter by checking consistency across the
/// first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line.
/// The delimiter producing the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the header line to be viable
        let target = counts.first().copied().unwrap_or(0);
        if target <= 1 {
            continue;
        }

        // Consistency * field count; more columns breaks ties
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_separated_with_header() {
        let table = import_from_str("Name,Work Email\nAda,ada@x.com\nBob,\n", b',')
            .expect("parse csv");
        assert_eq!(table.headers, vec!["Name", "Work Email"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 1), Some("ada@x.com"));
        // Empty field becomes None
        assert_eq!(table.cell(1, 1), None);
    }

    #[test]
    fn sniffs_semicolon() {
        let content = "Name;Email;City\nAda;ada@x.com;Berlin\nBob;bob@y.com;Oslo\n";
        assert_eq!(sniff_delimiter(content), b';');
        let table = import_from_str(content, b';').expect("parse");
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.cell(1, 1), Some("bob@y.com"));
    }

    #[test]
    fn sniffs_tab_over_comma() {
        let content = "Name\tEmail\nAda, Jr.\tada@x.com\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn single_column_defaults_to_comma() {
        assert_eq!(sniff_delimiter("justoneword\nanother\n"), b',');
    }

    #[test]
    fn empty_input_is_an_input_error() {
        let err = import_from_str("", b',').unwrap_err();
        assert!(err.to_string().contains("header row"));
    }

    #[test]
    fn quoted_fields_keep_delimiters() {
        let table = import_from_str(
            "Name,Email\n\"Lovelace, Ada\",ada@x.com\n",
            b',',
        )
        .expect("parse");
        assert_eq!(table.cell(0, 0), Some("Lovelace, Ada"));
        assert_eq!(table.cell(0, 1), Some("ada@x.com"));
    }
}
