//! Sequential verification runner.
//!
//! Walks the unique address set strictly in order, one outbound call at a
//! time, with a pacing delay between consecutive calls to respect the
//! provider's rate limits. Per-address failures degrade into Error rows;
//! the run only fails outright when the endpoint was unreachable for every
//! address, or when cancellation is requested between calls.

use std::time::Duration;

use tracing::{instrument, warn};

use enrichmail_classify::{classify, classify_failure};
use enrichmail_shared::{CancelFlag, EnrichmailError, EnrichmentRow, Result};
use enrichmail_verify::AddressVerifier;

use crate::pipeline::ProgressReporter;

/// Verify and classify every address, in first-seen order.
///
/// Produces exactly one [`EnrichmentRow`] per input address. Progress is
/// reported as `(completed, total)` after each address.
#[instrument(skip_all, fields(total = addresses.len(), pacing_ms = pacing.as_millis()))]
pub async fn run_verification<V: AddressVerifier>(
    verifier: &V,
    addresses: &[String],
    pacing: Duration,
    progress: &dyn ProgressReporter,
    cancel: &CancelFlag,
) -> Result<Vec<EnrichmentRow>> {
    let total = addresses.len();
    let mut rows: Vec<EnrichmentRow> = Vec::with_capacity(total);
    let mut unreachable = 0usize;

    for (i, address) in addresses.iter().enumerate() {
        if cancel.is_cancelled() {
            warn!(completed = i, total, "run cancelled between calls");
            return Err(EnrichmailError::Cancelled);
        }

        let row = match verifier.verify(address).await {
            Ok(record) => {
                let classification = classify(&record);
                EnrichmentRow {
                    address: address.clone(),
                    record: Some(record),
                    error: None,
                    classification,
                }
            }
            Err(e) => {
                warn!(address, error = %e, "verification failed for address");
                if matches!(e, EnrichmailError::Network(_)) {
                    unreachable += 1;
                }
                EnrichmentRow {
                    address: address.clone(),
                    record: None,
                    error: Some(e.to_string()),
                    classification: classify_failure(),
                }
            }
        };

        rows.push(row);
        progress.address_verified(address, i + 1, total);

        // Pace before the next call; nothing to wait for after the last one
        if i + 1 < total && !pacing.is_zero() {
            tokio::time::sleep(pacing).await;
        }
    }

    if total > 0 && unreachable == total {
        return Err(EnrichmailError::Verification(format!(
            "verification endpoint unreachable for all {total} addresses"
        )));
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use serde_json::json;

    use crate::pipeline::SilentProgress;
    use enrichmail_shared::{DeliverabilityStatus, VerificationRecord};

    /// Canned verifier: scores above 0 succeed, "down:" addresses fail at
    /// the transport layer, "bad:" addresses fail at the protocol layer.
    struct CannedVerifier;

    impl AddressVerifier for CannedVerifier {
        async fn verify(&self, address: &str) -> enrichmail_shared::Result<VerificationRecord> {
            if let Some(rest) = address.strip_prefix("down:") {
                return Err(EnrichmailError::Network(format!("{rest}: connect refused")));
            }
            if let Some(rest) = address.strip_prefix("bad:") {
                return Err(EnrichmailError::Provider(format!("{rest}: not json")));
            }
            Ok(VerificationRecord {
                address: address.to_string(),
                format_valid: Some(true),
                deliverable: Some(true),
                mx_found: Some(true),
                smtp_check: Some(true),
                is_free: Some(false),
                is_disposable: Some(false),
                domain: address.split('@').nth(1).map(str::to_string),
                score: Some(json!(95)),
                reason: Some("accepted_email".into()),
            })
        }
    }

    /// Progress recorder capturing `(completed, total)` pairs.
    #[derive(Default)]
    struct RecordingProgress {
        seen: Mutex<Vec<(usize, usize)>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn phase(&self, _name: &str) {}
        fn extracted(&self, _unique_addresses: usize, _email_columns: usize) {}
        fn address_verified(&self, _address: &str, completed: usize, total: usize) {
            self.seen.lock().unwrap().push((completed, total));
        }
        fn done(&self, _outcome: &crate::pipeline::EnrichOutcome) {}
    }

    fn addresses(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn one_row_per_address_in_order() {
        let rows = run_verification(
            &CannedVerifier,
            &addresses(&["a@x.com", "b@y.com", "c@z.com"]),
            Duration::ZERO,
            &SilentProgress,
            &CancelFlag::new(),
        )
        .await
        .expect("run");

        let got: Vec<&str> = rows.iter().map(|r| r.address.as_str()).collect();
        assert_eq!(got, vec!["a@x.com", "b@y.com", "c@z.com"]);
        assert!(
            rows.iter()
                .all(|r| r.classification.status == DeliverabilityStatus::Valid)
        );
    }

    #[tokio::test]
    async fn per_address_failure_degrades_into_error_row() {
        let rows = run_verification(
            &CannedVerifier,
            &addresses(&["a@x.com", "down:b@y.com", "c@z.com"]),
            Duration::ZERO,
            &SilentProgress,
            &CancelFlag::new(),
        )
        .await
        .expect("run");

        assert_eq!(rows.len(), 3);
        let failed = &rows[1];
        assert_eq!(failed.classification.status, DeliverabilityStatus::Error);
        assert!(failed.record.is_none());
        assert!(failed.classification.tier.is_none());
        assert!(failed.error.as_deref().unwrap().contains("connect refused"));
        // The run continued past the failure
        assert_eq!(rows[2].classification.status, DeliverabilityStatus::Valid);
    }

    #[tokio::test]
    async fn all_transport_failures_are_run_fatal() {
        let err = run_verification(
            &CannedVerifier,
            &addresses(&["down:a@x.com", "down:b@y.com"]),
            Duration::ZERO,
            &SilentProgress,
            &CancelFlag::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, EnrichmailError::Verification(_)));
        assert!(err.to_string().contains("all 2 addresses"));
    }

    #[tokio::test]
    async fn protocol_failures_alone_do_not_abort_the_run() {
        let rows = run_verification(
            &CannedVerifier,
            &addresses(&["bad:a@x.com", "bad:b@y.com"]),
            Duration::ZERO,
            &SilentProgress,
            &CancelFlag::new(),
        )
        .await
        .expect("run");

        assert_eq!(rows.len(), 2);
        assert!(
            rows.iter()
                .all(|r| r.classification.status == DeliverabilityStatus::Error)
        );
    }

    #[tokio::test]
    async fn cancellation_aborts_before_the_next_call() {
        let cancel = CancelFlag::new();
        cancel.cancel();

        let err = run_verification(
            &CannedVerifier,
            &addresses(&["a@x.com"]),
            Duration::ZERO,
            &SilentProgress,
            &cancel,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, EnrichmailError::Cancelled));
    }

    #[tokio::test]
    async fn progress_is_monotonic_and_complete() {
        let progress = RecordingProgress::default();
        run_verification(
            &CannedVerifier,
            &addresses(&["a@x.com", "b@y.com"]),
            Duration::ZERO,
            &progress,
            &CancelFlag::new(),
        )
        .await
        .expect("run");

        let seen = progress.seen.lock().unwrap().clone();
        assert_eq!(seen, vec![(1, 2), (2, 2)]);
    }

    #[tokio::test]
    async fn empty_address_set_yields_no_rows() {
        let rows = run_verification(
            &CannedVerifier,
            &[],
            Duration::from_secs(1),
            &SilentProgress,
            &CancelFlag::new(),
        )
        .await
        .expect("run");
        assert!(rows.is_empty());
    }
}
