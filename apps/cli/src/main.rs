//! enrichmail CLI — email deliverability enrichment for spreadsheets.
//!
//! Verifies every unique email address in an uploaded table against an
//! external verification service and writes an annotated two-sheet workbook.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
