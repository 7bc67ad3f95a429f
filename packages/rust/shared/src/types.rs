//! Core domain types for the email enrichment pipeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for enrichment run identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Join key normalization
// ---------------------------------------------------------------------------

/// Normalize a raw cell value into the canonical address form used as the
/// join key everywhere downstream: trimmed and lowercased.
///
/// Extraction and report marking must agree on this exact function: the
/// same address can appear in multiple columns and rows, so reconciliation
/// is always by normalized string, never by row position.
pub fn normalize_address(raw: &str) -> String {
    raw.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// Classification enums
// ---------------------------------------------------------------------------

/// Five-level risk bucket derived solely from the provider's numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
    /// Score absent or not integer-parseable.
    Unknown,
}

impl RiskTier {
    /// Human-readable label used in the report detail sheet.
    pub fn label(&self) -> &'static str {
        match self {
            Self::VeryLow => "Very Low",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::VeryHigh => "Very High",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Advisory action paired with a risk tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    Send,
    SafeToSend,
    Review,
    DoNotSend,
}

impl RecommendedAction {
    /// Human-readable label used in the report detail sheet.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Send => "Send",
            Self::SafeToSend => "Safe to Send",
            Self::Review => "Review",
            Self::DoNotSend => "Do Not Send",
        }
    }
}

impl std::fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Final coarse deliverability classification driving report highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliverabilityStatus {
    Valid,
    Invalid,
    /// Not produced by the current deliverability policy, but part of the
    /// status vocabulary and always treated as risky by the report.
    Risky,
    Unknown,
    /// The verification call itself failed for this address.
    Error,
}

impl DeliverabilityStatus {
    /// Human-readable label used in the report detail sheet.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Valid => "Valid",
            Self::Invalid => "Invalid",
            Self::Risky => "Risky",
            Self::Unknown => "Unknown",
            Self::Error => "Error",
        }
    }

    /// Whether cells holding an address with this status get a risk marker.
    pub fn is_risky(&self) -> bool {
        !matches!(self, Self::Valid)
    }

    /// Coarse sending state shown alongside the status in the detail sheet.
    pub fn state_label(&self) -> &'static str {
        match self {
            Self::Valid => "Deliverable",
            Self::Invalid => "Undeliverable",
            _ => "Risky",
        }
    }
}

impl std::fmt::Display for DeliverabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// VerificationRecord
// ---------------------------------------------------------------------------

/// Raw per-address verification result, mapped 1:1 from the provider
/// response. Fields the provider omitted stay `None` ("unknown"), never a
/// default `false` or `0`; the classifier depends on that distinction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRecord {
    /// The normalized address this record belongs to.
    pub address: String,
    /// Whether the address is syntactically valid per the provider.
    pub format_valid: Option<bool>,
    /// Provider's deliverability verdict.
    pub deliverable: Option<bool>,
    /// Whether an MX record was found for the domain.
    pub mx_found: Option<bool>,
    /// Whether the SMTP-level check passed.
    pub smtp_check: Option<bool>,
    /// Whether the address is on a free mail provider.
    pub is_free: Option<bool>,
    /// Whether the address is on a disposable mail provider.
    pub is_disposable: Option<bool>,
    /// Domain part as reported by the provider.
    pub domain: Option<String>,
    /// Raw quality score as received on the wire. Kept untyped so the
    /// classifier owns the integer-parseable-or-not decision.
    pub score: Option<serde_json::Value>,
    /// Machine-readable reason code from the provider.
    pub reason: Option<String>,
}

// ---------------------------------------------------------------------------
// RiskClassification
// ---------------------------------------------------------------------------

/// Derived classification for one verification outcome. Pure function of
/// the record; no independent identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskClassification {
    /// Coarse deliverability status.
    pub status: DeliverabilityStatus,
    /// Score-derived risk tier. `None` only when the verification call
    /// failed (status [`DeliverabilityStatus::Error`]).
    pub tier: Option<RiskTier>,
    /// Score-derived recommended action. `None` only on call failure.
    pub action: Option<RecommendedAction>,
}

// ---------------------------------------------------------------------------
// EnrichmentRow
// ---------------------------------------------------------------------------

/// One enrichment result per unique candidate address, in first-seen order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentRow {
    /// Normalized candidate address (the join key).
    pub address: String,
    /// Raw verification result; `None` when the call failed.
    pub record: Option<VerificationRecord>,
    /// Error description when the call failed.
    pub error: Option<String>,
    /// Derived classification.
    pub classification: RiskClassification,
}
