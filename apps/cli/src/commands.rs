//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use enrichmail_core::pipeline::{EnrichConfig, EnrichOutcome, ProgressReporter};
use enrichmail_report::HighlightRules;
use enrichmail_shared::{AppConfig, CancelFlag, init_config, load_config, resolve_api_key};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// enrichmail — flag risky or invalid email addresses in a spreadsheet.
#[derive(Parser)]
#[command(
    name = "enrichmail",
    version,
    about = "Verify the email addresses in a spreadsheet and highlight which to fix.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Verify all email addresses in a table and write the annotated workbook.
    Enrich {
        /// Input file (csv, tsv, xlsx, or xls). The first row is headers.
        file: String,

        /// Output workbook path (defaults to the configured file name).
        #[arg(short, long)]
        out: Option<String>,

        /// Pacing delay in ms between verification calls.
        #[arg(long)]
        pacing_ms: Option<u64>,

        /// Per-request timeout in seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "enrichmail=info",
        1 => "enrichmail=debug",
        _ => "enrichmail=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Enrich {
            file,
            out,
            pacing_ms,
            timeout_secs,
        } => cmd_enrich(&file, out.as_deref(), pacing_ms, timeout_secs).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// enrich
// ---------------------------------------------------------------------------

async fn cmd_enrich(
    file: &str,
    out: Option<&str>,
    pacing_ms: Option<u64>,
    timeout_secs: Option<u64>,
) -> Result<()> {
    // Resolve the credential before doing anything
    let config = load_config()?;
    let api_key = resolve_api_key(&config)?;

    let output = out
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&config.defaults.output));

    let accepted_reason = match config.highlight.accepted_reason.as_str() {
        "" => None,
        reason => Some(reason.to_string()),
    };

    let enrich_config = EnrichConfig {
        input: PathBuf::from(file),
        output,
        base_url: config.provider.base_url.clone(),
        api_key,
        timeout_secs: timeout_secs.unwrap_or(config.provider.timeout_secs),
        pacing: Duration::from_millis(pacing_ms.unwrap_or(config.defaults.pacing_ms)),
        highlight: HighlightRules { accepted_reason },
    };

    info!(file, output = %enrich_config.output.display(), "starting enrichment");

    // ctrl-c cancels between verification calls
    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let reporter = CliProgress::new();
    let outcome =
        enrichmail_core::pipeline::enrich_file(&enrich_config, &reporter, &cancel).await?;

    // Print summary
    println!();
    println!("  Enrichment complete!");
    println!("  Run ID:     {}", outcome.run_id);
    println!("  Rows:       {}", outcome.source_rows);
    println!(
        "  Columns:    {}",
        if outcome.email_columns.is_empty() {
            "none matched".to_string()
        } else {
            outcome.email_columns.join(", ")
        }
    );
    println!("  Addresses:  {}", outcome.unique_addresses);
    println!(
        "  Valid:      {}  Invalid: {}  Unknown: {}  Errors: {}",
        outcome.counts.valid,
        outcome.counts.invalid,
        outcome.counts.unknown + outcome.counts.risky,
        outcome.counts.error,
    );
    println!("  Output:     {}", outcome.output_path.display());
    println!("  Time:       {:.1}s", outcome.elapsed.as_secs_f64());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner that becomes a bar once
/// the verification total is known.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { bar }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn extracted(&self, unique_addresses: usize, email_columns: usize) {
        self.bar.println(format!(
            "Found {unique_addresses} unique email addresses across {email_columns} email column(s)."
        ));
    }

    fn address_verified(&self, address: &str, completed: usize, total: usize) {
        if self.bar.length() != Some(total as u64) {
            self.bar.set_style(
                ProgressStyle::with_template(
                    "{bar:30.cyan/dim} {pos}/{len} {msg}",
                )
                .unwrap(),
            );
            self.bar.set_length(total as u64);
        }
        self.bar.set_position(completed as u64);
        self.bar.set_message(address.to_string());
    }

    fn done(&self, _outcome: &EnrichOutcome) {
        self.bar.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
