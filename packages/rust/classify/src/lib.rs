//! Risk classification: pure, deterministic mappings from a raw
//! verification result to a structured [`RiskClassification`].
//!
//! Two independent mappings, both required:
//! - quality score → (risk tier, recommended action)
//! - deliverable flag → deliverability status
//!
//! Deliverability policy: status is decided by the `deliverable` flag alone.
//! `true` maps to Valid, `false` to Invalid, absent to Unknown. The SMTP
//! check does not participate. See DESIGN.md for the policy decision record.

use serde_json::Value;

use enrichmail_shared::{
    DeliverabilityStatus, RecommendedAction, RiskClassification, RiskTier, VerificationRecord,
};

// ---------------------------------------------------------------------------
// Score parsing
// ---------------------------------------------------------------------------

/// A provider score after parsing. The unparseable case is its own branch so
/// callers (and tests) can tell "not an integer at all" apart from any
/// in-range integer; the tier table itself is exhaustive over integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreValue {
    /// An integer-parseable score.
    Integer(i64),
    /// Present on the wire, but not integer-parseable.
    Unparseable,
}

/// Parse the raw wire score. `None` means the provider omitted it.
pub fn parse_score(raw: Option<&Value>) -> Option<ScoreValue> {
    let value = raw?;
    let parsed = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                // Integral floats (e.g. 95.0) still count as integers
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.is_finite())
                    .map(|f| f as i64)
            })
            .map(ScoreValue::Integer)
            .unwrap_or(ScoreValue::Unparseable),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(ScoreValue::Integer)
            .unwrap_or(ScoreValue::Unparseable),
        _ => ScoreValue::Unparseable,
    };
    Some(parsed)
}

// ---------------------------------------------------------------------------
// Score → (tier, action)
// ---------------------------------------------------------------------------

/// Map a parsed score to a risk tier and recommended action.
///
/// Evaluated by inclusive lower bounds, highest first; every integer maps to
/// exactly one pair. Absent or unparseable scores degrade to
/// (Unknown, Review) rather than erroring.
pub fn classify_score(score: Option<ScoreValue>) -> (RiskTier, RecommendedAction) {
    match score {
        Some(ScoreValue::Integer(s)) if s >= 90 => (RiskTier::VeryLow, RecommendedAction::Send),
        Some(ScoreValue::Integer(s)) if s >= 70 => {
            (RiskTier::Low, RecommendedAction::SafeToSend)
        }
        Some(ScoreValue::Integer(s)) if s >= 50 => (RiskTier::Medium, RecommendedAction::Review),
        Some(ScoreValue::Integer(s)) if s >= 30 => {
            (RiskTier::High, RecommendedAction::DoNotSend)
        }
        Some(ScoreValue::Integer(_)) => (RiskTier::VeryHigh, RecommendedAction::DoNotSend),
        Some(ScoreValue::Unparseable) | None => (RiskTier::Unknown, RecommendedAction::Review),
    }
}

// ---------------------------------------------------------------------------
// Deliverable → status
// ---------------------------------------------------------------------------

/// Map the provider's deliverable flag to a coarse status.
pub fn classify_deliverability(deliverable: Option<bool>) -> DeliverabilityStatus {
    match deliverable {
        Some(true) => DeliverabilityStatus::Valid,
        Some(false) => DeliverabilityStatus::Invalid,
        None => DeliverabilityStatus::Unknown,
    }
}

// ---------------------------------------------------------------------------
// Full classification
// ---------------------------------------------------------------------------

/// Classify a successful verification result.
pub fn classify(record: &VerificationRecord) -> RiskClassification {
    let (tier, action) = classify_score(parse_score(record.score.as_ref()));
    RiskClassification {
        status: classify_deliverability(record.deliverable),
        tier: Some(tier),
        action: Some(action),
    }
}

/// Classification for an address whose verification call failed: status is
/// Error, and tier/action are not computed.
pub fn classify_failure() -> RiskClassification {
    RiskClassification {
        status: DeliverabilityStatus::Error,
        tier: None,
        action: None,
    }
}
