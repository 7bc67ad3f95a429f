//! End-to-end enrichment pipeline: input table → extraction → sequential
//! verification → classification → annotated workbook on disk.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use enrichmail_report::HighlightRules;
use enrichmail_shared::{
    CancelFlag, DeliverabilityStatus, EnrichmailError, EnrichmentRow, Result, RunId,
};
use enrichmail_verify::{VerificationClient, VerifyConfig};

use crate::runner;

/// Configuration for one enrichment run.
#[derive(Clone)]
pub struct EnrichConfig {
    /// Input table file (csv/tsv/xlsx/xls).
    pub input: PathBuf,
    /// Output workbook path.
    pub output: PathBuf,
    /// Verification endpoint base URL.
    pub base_url: String,
    /// Verification API credential. Never logged.
    pub api_key: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Pacing delay between consecutive verification calls.
    pub pacing: Duration,
    /// Report highlighting rules.
    pub highlight: HighlightRules,
}

impl std::fmt::Debug for EnrichConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrichConfig")
            .field("input", &self.input)
            .field("output", &self.output)
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .field("pacing", &self.pacing)
            .field("highlight", &self.highlight)
            .finish()
    }
}

/// Per-status row counts for the run summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub valid: usize,
    pub invalid: usize,
    pub risky: usize,
    pub unknown: usize,
    pub error: usize,
}

impl StatusCounts {
    fn tally(rows: &[EnrichmentRow]) -> Self {
        let mut counts = Self::default();
        for row in rows {
            match row.classification.status {
                DeliverabilityStatus::Valid => counts.valid += 1,
                DeliverabilityStatus::Invalid => counts.invalid += 1,
                DeliverabilityStatus::Risky => counts.risky += 1,
                DeliverabilityStatus::Unknown => counts.unknown += 1,
                DeliverabilityStatus::Error => counts.error += 1,
            }
        }
        counts
    }
}

/// Result of a completed enrichment run.
#[derive(Debug)]
pub struct EnrichOutcome {
    /// Run identifier.
    pub run_id: RunId,
    /// Where the workbook was written.
    pub output_path: PathBuf,
    /// Data rows in the input table.
    pub source_rows: usize,
    /// Names of the detected email columns, in source order.
    pub email_columns: Vec<String>,
    /// Unique candidate addresses verified.
    pub unique_addresses: usize,
    /// Row counts by deliverability status.
    pub counts: StatusCounts,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
///
/// This is an observation side channel, not part of the data contract; the
/// core never writes to a display surface directly.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once after extraction with the unique address and column counts.
    fn extracted(&self, unique_addresses: usize, email_columns: usize);
    /// Called after each verification call with `(completed, total)`.
    fn address_verified(&self, address: &str, completed: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, outcome: &EnrichOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn extracted(&self, _unique_addresses: usize, _email_columns: usize) {}
    fn address_verified(&self, _address: &str, _completed: usize, _total: usize) {}
    fn done(&self, _outcome: &EnrichOutcome) {}
}

/// Run the full enrichment pipeline.
///
/// 1. Load the input table (fatal on malformed input, before any network call)
/// 2. Extract the unique candidate address set
/// 3. Verify + classify sequentially with pacing
/// 4. Plan cell marks and serialize the two-sheet workbook
/// 5. Write the workbook to disk
#[instrument(skip_all, fields(input = %config.input.display()))]
pub async fn enrich_file(
    config: &EnrichConfig,
    progress: &dyn ProgressReporter,
    cancel: &CancelFlag,
) -> Result<EnrichOutcome> {
    let start = Instant::now();
    let started_at = Utc::now();
    let run_id = RunId::new();

    info!(%run_id, "starting enrichment run");

    // --- Phase 1: Input ---
    progress.phase("Reading input table");
    let table = enrichmail_tabular::load_table(&config.input)?;

    // --- Phase 2: Extraction ---
    progress.phase("Extracting candidate addresses");
    let extraction = enrichmail_extract::extract(&table);
    progress.extracted(extraction.addresses.len(), extraction.email_columns.len());

    if extraction.email_columns.is_empty() {
        warn!("no email-like columns found; the detail sheet will be empty");
    }

    // --- Phase 3: Verification ---
    progress.phase("Verifying addresses");
    let verify_config = VerifyConfig::new(&config.base_url, config.api_key.clone())?
        .with_timeout_secs(config.timeout_secs);
    let client = VerificationClient::new(verify_config)?;

    let rows = runner::run_verification(
        &client,
        &extraction.addresses,
        config.pacing,
        progress,
        cancel,
    )
    .await?;

    // --- Phase 4: Report ---
    progress.phase("Building report");
    let plan = enrichmail_report::plan_marks(
        &table,
        &extraction.email_columns,
        &rows,
        &config.highlight,
    );
    let bytes = enrichmail_report::build_workbook(&table, &plan, &rows)?;

    std::fs::write(&config.output, &bytes)
        .map_err(|e| EnrichmailError::io(&config.output, e))?;

    let email_columns = extraction
        .email_columns
        .iter()
        .filter_map(|&c| table.headers.get(c).cloned())
        .collect();

    let outcome = EnrichOutcome {
        run_id,
        output_path: config.output.clone(),
        source_rows: table.row_count(),
        email_columns,
        unique_addresses: rows.len(),
        counts: StatusCounts::tally(&rows),
        started_at,
        elapsed: start.elapsed(),
    };

    progress.done(&outcome);

    info!(
        run_id = %outcome.run_id,
        unique_addresses = outcome.unique_addresses,
        valid = outcome.counts.valid,
        invalid = outcome.counts.invalid,
        unknown = outcome.counts.unknown,
        errors = outcome.counts.error,
        output = %outcome.output_path.display(),
        elapsed_ms = outcome.elapsed.as_millis(),
        "enrichment run complete"
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use calamine::{Data, Reader, Xlsx};
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server_uri: &str, dir: &std::path::Path) -> EnrichConfig {
        EnrichConfig {
            input: dir.join("contacts.csv"),
            output: dir.join("out.xlsx"),
            base_url: server_uri.to_string(),
            api_key: "test-key".into(),
            timeout_secs: 5,
            pacing: Duration::ZERO,
            highlight: HighlightRules::default(),
        }
    }

    fn mock_response(deliverable: Option<bool>, score: i64, reason: &str) -> ResponseTemplate {
        let mut body = json!({
            "format": true,
            "mx": true,
            "smtp": true,
            "free": false,
            "disposable": false,
            "score": score,
            "reason": reason,
        });
        if let Some(d) = deliverable {
            body["deliverable"] = json!(d);
        }
        ResponseTemplate::new(200).set_body_json(body)
    }

    #[tokio::test]
    async fn end_to_end_csv_to_workbook() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("email", "a@x.com"))
            .respond_with(mock_response(Some(true), 95, "accepted_email"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("email", "b@y.com"))
            .respond_with(mock_response(Some(false), 40, "rejected_email"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let config = config_for(&server.uri(), dir.path());

        // Duplicate and differently-cased values collapse to two candidates
        std::fs::write(
            &config.input,
            "Name,Work Email\nAda,A@X.com\nAda2,a@x.com \nBob,b@y.com\n",
        )
        .expect("write input");

        let outcome = enrich_file(&config, &SilentProgress, &CancelFlag::new())
            .await
            .expect("enrich");

        assert_eq!(outcome.unique_addresses, 2);
        assert_eq!(outcome.source_rows, 3);
        assert_eq!(outcome.email_columns, vec!["Work Email".to_string()]);
        assert_eq!(outcome.counts.valid, 1);
        assert_eq!(outcome.counts.invalid, 1);
        assert_eq!(outcome.counts.error, 0);

        let bytes = std::fs::read(&config.output).expect("read workbook");
        let mut reader = Xlsx::new(Cursor::new(bytes)).expect("open workbook");
        assert_eq!(
            reader.sheet_names(),
            vec![
                "Original Highlights".to_string(),
                "Enriched Emails".to_string()
            ]
        );

        let enriched = reader.worksheet_range("Enriched Emails").expect("sheet");
        let cells: Vec<Vec<Data>> = enriched.rows().map(|r| r.to_vec()).collect();
        // Header + one row per unique address, first-seen order
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[1][0], Data::String("a@x.com".into()));
        assert_eq!(cells[2][0], Data::String("b@y.com".into()));
        assert_eq!(cells[1][10], Data::String("Valid".into()));
        assert_eq!(cells[2][10], Data::String("Invalid".into()));
        assert_eq!(cells[2][12], Data::String("High".into()));
        assert_eq!(cells[2][13], Data::String("Do Not Send".into()));
    }

    #[tokio::test]
    async fn provider_failure_becomes_error_row_not_run_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("email", "a@x.com"))
            .respond_with(mock_response(Some(true), 95, "accepted_email"))
            .mount(&server)
            .await;
        // b@y.com answers with garbage
        Mock::given(method("GET"))
            .and(query_param("email", "b@y.com"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let config = config_for(&server.uri(), dir.path());
        std::fs::write(&config.input, "Email\na@x.com\nb@y.com\n").expect("write input");

        let outcome = enrich_file(&config, &SilentProgress, &CancelFlag::new())
            .await
            .expect("enrich");

        assert_eq!(outcome.counts.valid, 1);
        assert_eq!(outcome.counts.error, 1);

        // The failed address surfaces as an Error row; the cell-marking rule
        // for Error status is covered in enrichmail-report tests.
        let bytes = std::fs::read(&config.output).expect("read workbook");
        let mut reader = Xlsx::new(Cursor::new(bytes)).expect("open workbook");
        let enriched = reader.worksheet_range("Enriched Emails").expect("sheet");
        let cells: Vec<Vec<Data>> = enriched.rows().map(|r| r.to_vec()).collect();
        assert_eq!(cells[2][10], Data::String("Error".into()));
    }

    #[tokio::test]
    async fn table_without_email_columns_still_produces_a_workbook() {
        let server = MockServer::start().await;

        let dir = tempfile::tempdir().expect("tempdir");
        let config = config_for(&server.uri(), dir.path());
        std::fs::write(&config.input, "Name,City\nAda,Berlin\n").expect("write input");

        let outcome = enrich_file(&config, &SilentProgress, &CancelFlag::new())
            .await
            .expect("enrich");

        assert_eq!(outcome.unique_addresses, 0);
        assert!(outcome.email_columns.is_empty());
        assert!(config.output.exists());
    }

    #[tokio::test]
    async fn malformed_input_fails_before_any_network_call() {
        let dir = tempfile::tempdir().expect("tempdir");
        // Unreachable URL: the run must fail on input, not on the network
        let mut config = config_for("http://127.0.0.1:1", dir.path());
        config.input = dir.path().join("contacts.xlsx");
        std::fs::write(&config.input, b"definitely not a workbook").expect("write input");

        let err = enrich_file(&config, &SilentProgress, &CancelFlag::new())
            .await
            .unwrap_err();

        assert!(matches!(err, EnrichmailError::Input { .. }));
    }
}
