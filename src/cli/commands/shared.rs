//! Shared components for CLI commands

use crate::app::services::record_store::MemoryStore;
use crate::cli::args::Args;
use crate::models::SectionCounts;
use anyhow::{Context, Result};
use colored::*;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// What a command did, for the exit report
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub files_processed: usize,
    pub records: usize,
    pub lines_written: usize,
    pub processing_time: Duration,
}

/// Set up structured logging on stderr; stdout is reserved for exported lines
pub fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ispd_processor={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
            .context("Failed to initialise logging")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .context("Failed to initialise logging")?;
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load the store snapshot; a missing snapshot is an error unless `create` is set
pub fn open_store(path: &Path, create: bool) -> Result<MemoryStore> {
    if !create && !path.exists() {
        anyhow::bail!("Record store not found: {}", path.display());
    }
    MemoryStore::load(path).with_context(|| format!("Failed to load record store {}", path.display()))
}

pub fn save_store(store: &MemoryStore, path: &Path) -> Result<()> {
    store
        .save(path)
        .with_context(|| format!("Failed to save record store {}", path.display()))
}

/// Print per-section counts as an aligned table on stderr
pub fn print_section_counts(title: &str, counts: &SectionCounts) {
    eprintln!("  {}", title.bright_cyan());
    if counts.is_empty() {
        eprintln!("    {}", "none".bright_black());
        return;
    }
    for (kind, count) in counts {
        eprintln!(
            "    {:<14} {}",
            kind.table_name(),
            count.to_string().bright_white()
        );
    }
}

/// Format a duration for the summary lines
pub fn format_elapsed(elapsed: Duration) -> String {
    if elapsed.as_secs() >= 60 {
        indicatif::HumanDuration(elapsed).to_string()
    } else {
        format!("{:.2}s", elapsed.as_secs_f64())
    }
}
