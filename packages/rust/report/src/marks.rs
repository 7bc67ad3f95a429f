//! Per-cell marking plan for the annotated original sheet.
//!
//! Marking decisions are made by a normalized-address join table built once
//! from the enrichment rows, never by row position. A cell whose address is
//! missing from the join table is treated as Unknown (risky), not a failure.

use std::collections::HashMap;

use tracing::debug;

use enrichmail_shared::{DeliverabilityStatus, EnrichmentRow, normalize_address};
use enrichmail_tabular::Table;

/// Visual marker applied to one email cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellMark {
    /// The address is risky (invalid, unknown, or failed verification).
    Risky,
    /// The provider's reason matched the configured accepted sentinel.
    Accepted,
}

/// Configurable highlighting rules.
#[derive(Debug, Clone)]
pub struct HighlightRules {
    /// Provider reason (case-insensitive) that earns a positive marker.
    /// `None` disables the overlay; risk marking is unaffected.
    pub accepted_reason: Option<String>,
}

impl Default for HighlightRules {
    fn default() -> Self {
        Self {
            accepted_reason: Some("accepted_email".into()),
        }
    }
}

/// The computed set of cell marks, keyed by `(row, column)` in the original
/// table's coordinates (data rows, zero-based, header excluded).
#[derive(Debug, Default)]
pub struct MarkPlan {
    marks: HashMap<(usize, usize), CellMark>,
}

impl MarkPlan {
    /// Mark for the given data cell, if any.
    pub fn mark_at(&self, row: usize, col: usize) -> Option<CellMark> {
        self.marks.get(&(row, col)).copied()
    }

    /// Number of marked cells.
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    /// Whether no cell is marked.
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}

/// Join one address's enrichment outcome for marking decisions.
#[derive(Debug, Clone, Copy)]
struct JoinEntry<'a> {
    status: DeliverabilityStatus,
    reason: Option<&'a str>,
}

/// Compute the marking plan for every email-column cell of the table.
///
/// Risk wins over the accepted overlay when both would apply.
pub fn plan_marks(
    table: &Table,
    email_columns: &[usize],
    rows: &[EnrichmentRow],
    rules: &HighlightRules,
) -> MarkPlan {
    // Normalized address → outcome, built once for O(1) joins per cell.
    let join: HashMap<&str, JoinEntry<'_>> = rows
        .iter()
        .map(|row| {
            (
                row.address.as_str(),
                JoinEntry {
                    status: row.classification.status,
                    reason: row.record.as_ref().and_then(|r| r.reason.as_deref()),
                },
            )
        })
        .collect();

    let accepted = rules
        .accepted_reason
        .as_deref()
        .filter(|r| !r.is_empty())
        .map(str::to_lowercase);

    let mut plan = MarkPlan::default();

    for row in 0..table.row_count() {
        for &col in email_columns {
            let Some(raw) = table.cell(row, col) else {
                continue;
            };
            let normalized = normalize_address(raw);
            if normalized.is_empty() {
                continue;
            }

            match join.get(normalized.as_str()) {
                Some(entry) => {
                    if entry.status.is_risky() {
                        plan.marks.insert((row, col), CellMark::Risky);
                    } else if let (Some(accepted), Some(reason)) =
                        (accepted.as_deref(), entry.reason)
                    {
                        if reason.to_lowercase() == accepted {
                            plan.marks.insert((row, col), CellMark::Accepted);
                        }
                    }
                }
                // Join miss: extraction/normalization mismatch. Unknown → risky.
                None => {
                    plan.marks.insert((row, col), CellMark::Risky);
                }
            }
        }
    }

    debug!(marked = plan.len(), "marking plan computed");
    plan
}
