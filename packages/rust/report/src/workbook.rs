//! Workbook serialization: the annotated original sheet plus the enrichment
//! detail sheet, in a fixed order.

use rust_xlsxwriter::{Color, Format, Workbook, Worksheet, XlsxError};
use tracing::debug;

use enrichmail_shared::{EnrichmailError, EnrichmentRow, Result};
use enrichmail_tabular::Table;

use crate::marks::{CellMark, MarkPlan};

/// Sheet 1: the original table with risk/accept font marks on email cells.
pub const SHEET_ORIGINAL: &str = "Original Highlights";

/// Sheet 2: one row per unique verified address.
pub const SHEET_ENRICHED: &str = "Enriched Emails";

/// Column headers of the enrichment detail sheet, in output order.
pub const DETAIL_HEADERS: [&str; 15] = [
    "Email",
    "Valid Format",
    "Deliverable",
    "MX Found",
    "SMTP Check",
    "Is Free Email",
    "Is Disposable",
    "Domain",
    "Score",
    "Reason",
    "Status",
    "State",
    "Risk Level",
    "Action",
    "Error",
];

/// Risky cells: red font, matching the original report styling.
const RISKY_FONT: u32 = 0xFF0000;
/// Accepted cells: green font.
const ACCEPTED_FONT: u32 = 0x00AA00;

fn xe(e: XlsxError) -> EnrichmailError {
    EnrichmailError::Report(e.to_string())
}

/// Serialize the annotated report into workbook bytes.
///
/// Cell values are copied verbatim from the input table. Marking only ever
/// changes the font, never the data.
pub fn build_workbook(
    table: &Table,
    plan: &MarkPlan,
    rows: &[EnrichmentRow],
) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let original = workbook.add_worksheet();
    original.set_name(SHEET_ORIGINAL).map_err(xe)?;
    write_original_sheet(original, table, plan)?;

    let enriched = workbook.add_worksheet();
    enriched.set_name(SHEET_ENRICHED).map_err(xe)?;
    write_detail_sheet(enriched, rows)?;

    let bytes = workbook.save_to_buffer().map_err(xe)?;
    debug!(
        bytes = bytes.len(),
        marked_cells = plan.len(),
        detail_rows = rows.len(),
        "workbook serialized"
    );
    Ok(bytes)
}

fn write_original_sheet(sheet: &mut Worksheet, table: &Table, plan: &MarkPlan) -> Result<()> {
    let risky = Format::new().set_font_color(Color::RGB(RISKY_FONT));
    let accepted = Format::new().set_font_color(Color::RGB(ACCEPTED_FONT));

    for (col, name) in table.headers.iter().enumerate() {
        sheet
            .write_string(0, col as u16, name.as_str())
            .map_err(xe)?;
    }

    for row in 0..table.row_count() {
        // Header occupies sheet row 0
        let sheet_row = (row + 1) as u32;
        for col in 0..table.column_count() {
            let Some(value) = table.cell(row, col) else {
                continue;
            };
            match plan.mark_at(row, col) {
                Some(CellMark::Risky) => {
                    sheet
                        .write_string_with_format(sheet_row, col as u16, value, &risky)
                        .map_err(xe)?;
                }
                Some(CellMark::Accepted) => {
                    sheet
                        .write_string_with_format(sheet_row, col as u16, value, &accepted)
                        .map_err(xe)?;
                }
                None => {
                    sheet
                        .write_string(sheet_row, col as u16, value)
                        .map_err(xe)?;
                }
            }
        }
    }

    Ok(())
}

fn write_detail_sheet(sheet: &mut Worksheet, rows: &[EnrichmentRow]) -> Result<()> {
    let header_format = Format::new().set_bold();

    for (col, name) in DETAIL_HEADERS.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *name, &header_format)
            .map_err(xe)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_string(r, 0, row.address.as_str()).map_err(xe)?;

        let record = row.record.as_ref();
        write_opt_bool(sheet, r, 1, record.and_then(|x| x.format_valid))?;
        write_opt_bool(sheet, r, 2, record.and_then(|x| x.deliverable))?;
        write_opt_bool(sheet, r, 3, record.and_then(|x| x.mx_found))?;
        write_opt_bool(sheet, r, 4, record.and_then(|x| x.smtp_check))?;
        write_opt_bool(sheet, r, 5, record.and_then(|x| x.is_free))?;
        write_opt_bool(sheet, r, 6, record.and_then(|x| x.is_disposable))?;

        if let Some(domain) = record.and_then(|x| x.domain.as_deref()) {
            sheet.write_string(r, 7, domain).map_err(xe)?;
        }
        write_score(sheet, r, 8, record.and_then(|x| x.score.as_ref()))?;
        if let Some(reason) = record.and_then(|x| x.reason.as_deref()) {
            sheet.write_string(r, 9, reason).map_err(xe)?;
        }

        let status = row.classification.status;
        sheet.write_string(r, 10, status.label()).map_err(xe)?;
        sheet.write_string(r, 11, status.state_label()).map_err(xe)?;
        if let Some(tier) = row.classification.tier {
            sheet.write_string(r, 12, tier.label()).map_err(xe)?;
        }
        if let Some(action) = row.classification.action {
            sheet.write_string(r, 13, action.label()).map_err(xe)?;
        }
        if let Some(error) = row.error.as_deref() {
            sheet.write_string(r, 14, error).map_err(xe)?;
        }
    }

    Ok(())
}

fn write_opt_bool(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: Option<bool>,
) -> Result<()> {
    if let Some(b) = value {
        sheet.write_boolean(row, col, b).map_err(xe)?;
    }
    Ok(())
}

/// The raw wire score lands as a number when numeric, as text otherwise;
/// absent scores leave the cell blank.
fn write_score(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    score: Option<&serde_json::Value>,
) -> Result<()> {
    match score {
        Some(serde_json::Value::Number(n)) => {
            if let Some(f) = n.as_f64() {
                sheet.write_number(row, col, f).map_err(xe)?;
            }
        }
        Some(serde_json::Value::String(s)) => {
            sheet.write_string(row, col, s).map_err(xe)?;
        }
        Some(other) => {
            sheet.write_string(row, col, other.to_string()).map_err(xe)?;
        }
        None => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use calamine::{Data, Reader, Xlsx};
    use serde_json::json;

    use crate::marks::{HighlightRules, plan_marks};
    use enrichmail_shared::{
        DeliverabilityStatus, RecommendedAction, RiskClassification, RiskTier,
        VerificationRecord,
    };

    fn sample_rows() -> Vec<EnrichmentRow> {
        vec![
            EnrichmentRow {
                address: "ada@x.com".into(),
                record: Some(VerificationRecord {
                    address: "ada@x.com".into(),
                    format_valid: Some(true),
                    deliverable: Some(true),
                    mx_found: Some(true),
                    smtp_check: Some(true),
                    is_free: Some(false),
                    is_disposable: Some(false),
                    domain: Some("x.com".into()),
                    score: Some(json!(95)),
                    reason: Some("accepted_email".into()),
                }),
                error: None,
                classification: RiskClassification {
                    status: DeliverabilityStatus::Valid,
                    tier: Some(RiskTier::VeryLow),
                    action: Some(RecommendedAction::Send),
                },
            },
            EnrichmentRow {
                address: "bob@y.com".into(),
                record: None,
                error: Some("network error: bob@y.com: request timed out".into()),
                classification: RiskClassification {
                    status: DeliverabilityStatus::Error,
                    tier: None,
                    action: None,
                },
            },
        ]
    }

    fn sample_table() -> Table {
        Table::new(
            vec!["Name".into(), "Email".into()],
            vec![
                vec![Some("Ada".into()), Some("ada@x.com".into())],
                vec![Some("Bob".into()), Some("bob@y.com".into())],
            ],
        )
    }

    #[test]
    fn workbook_roundtrip_preserves_values_and_sheet_order() {
        let table = sample_table();
        let rows = sample_rows();
        let plan = plan_marks(&table, &[1], &rows, &HighlightRules::default());

        let bytes = build_workbook(&table, &plan, &rows).expect("build workbook");
        assert_eq!(&bytes[..2], b"PK");

        let mut reader = Xlsx::new(Cursor::new(bytes)).expect("open workbook");
        assert_eq!(
            reader.sheet_names(),
            vec![SHEET_ORIGINAL.to_string(), SHEET_ENRICHED.to_string()]
        );

        // Original sheet: headers and cell values are byte-identical
        let original = reader.worksheet_range(SHEET_ORIGINAL).expect("sheet");
        let cells: Vec<Vec<Data>> = original.rows().map(|r| r.to_vec()).collect();
        assert_eq!(cells[0][0], Data::String("Name".into()));
        assert_eq!(cells[0][1], Data::String("Email".into()));
        assert_eq!(cells[1][1], Data::String("ada@x.com".into()));
        assert_eq!(cells[2][1], Data::String("bob@y.com".into()));

        // Detail sheet: one row per enrichment row, status columns filled
        let enriched = reader.worksheet_range(SHEET_ENRICHED).expect("sheet");
        let cells: Vec<Vec<Data>> = enriched.rows().map(|r| r.to_vec()).collect();
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[0][0], Data::String("Email".into()));
        assert_eq!(cells[1][0], Data::String("ada@x.com".into()));
        assert_eq!(cells[1][8], Data::Float(95.0));
        assert_eq!(cells[1][10], Data::String("Valid".into()));
        assert_eq!(cells[1][11], Data::String("Deliverable".into()));
        assert_eq!(cells[1][12], Data::String("Very Low".into()));
        assert_eq!(cells[2][10], Data::String("Error".into()));
        // Failed call: tier/action cells stay blank
        assert_eq!(cells[2][12], Data::Empty);
        assert_eq!(cells[2][13], Data::Empty);
        assert!(matches!(&cells[2][14], Data::String(s) if s.contains("timed out")));
    }

    #[test]
    fn empty_candidate_set_still_produces_both_sheets() {
        let table = Table::new(vec!["Name".into()], vec![vec![Some("Ada".into())]]);
        let plan = MarkPlan::default();

        let bytes = build_workbook(&table, &plan, &[]).expect("build workbook");
        let mut reader = Xlsx::new(Cursor::new(bytes)).expect("open workbook");
        assert_eq!(reader.sheet_names().len(), 2);

        let enriched = reader.worksheet_range(SHEET_ENRICHED).expect("sheet");
        // Header row only
        assert_eq!(enriched.rows().count(), 1);
    }
}
