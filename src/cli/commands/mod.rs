//! Command implementations for the ISPD processor CLI
//!
//! Each subcommand lives in its own module and reports its own summary;
//! `run` only dispatches. Commands return `anyhow` errors so the binary can
//! print the full context chain.

pub mod count;
pub mod export;
pub mod ingest;
pub mod shared;

pub use shared::RunStats;

use crate::cli::args::{Args, Commands};
use anyhow::Result;

/// Main command runner
///
/// - `ingest`: decode input files into the store snapshot
/// - `export`: re-encode (and optionally trim) the records of a date
/// - `count`: per-section row counts of a date
pub async fn run(args: Args) -> Result<RunStats> {
    shared::setup_logging(&args)?;

    let Some(command) = args.command.clone() else {
        anyhow::bail!("No command given; see --help");
    };
    match command {
        Commands::Ingest(ingest_args) => ingest::run_ingest(&args, &ingest_args).await,
        Commands::Export(export_args) => export::run_export(&export_args).await,
        Commands::Count(count_args) => count::run_count(&count_args).await,
    }
}
