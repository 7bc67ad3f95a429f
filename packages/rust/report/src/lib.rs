//! Report assembly: reconcile enrichment results back onto the original
//! table and serialize the two-sheet output workbook.
//!
//! The pure marking plan ([`plan_marks`]) is kept separate from workbook
//! serialization ([`build_workbook`]) so the join/highlight logic is
//! testable without touching xlsx bytes.

pub mod marks;
pub mod workbook;

pub use marks::{CellMark, HighlightRules, MarkPlan, plan_marks};
pub use workbook::{DETAIL_HEADERS, SHEET_ENRICHED, SHEET_ORIGINAL, build_workbook};
