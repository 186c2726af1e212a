//! Ingest command: decode input files into the record store snapshot

use super::shared::{RunStats, format_elapsed, open_store, print_section_counts, save_store};
use crate::cli::args::{Args, IngestArgs};
use crate::cli::input::expand_inputs;
use crate::processor::{IngestProcessor, IngestSummary};
use anyhow::{Context, Result};
use colored::*;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub async fn run_ingest(args: &Args, ingest: &IngestArgs) -> Result<RunStats> {
    let start_time = Instant::now();
    ingest.validate()?;

    let mut config = ingest.to_config()?;
    config.show_progress = config.show_progress && args.show_progress();
    debug!("Ingest configuration: {:?}", config);

    let files = expand_inputs(&ingest.files, &ingest.extension)?;
    info!("Ingesting {} files", files.len());

    let store_path = ingest.store.store_path();
    let mut store = open_store(store_path, true)?;

    let summary = {
        let mut processor = IngestProcessor::new(&mut store, config)?;
        processor
            .ingest_files(&files)
            .await
            .context("Ingestion stopped")?;
        processor.finish()?
    };
    save_store(&store, store_path)?;

    let elapsed = start_time.elapsed();
    if !args.quiet {
        print_summary(&summary, elapsed);
    }

    Ok(RunStats {
        files_processed: summary.files_processed,
        records: summary.stats.records_decoded,
        lines_written: 0,
        processing_time: elapsed,
    })
}

fn print_summary(summary: &IngestSummary, elapsed: Duration) {
    let stats = &summary.stats;
    eprintln!("\n{}", "Ingest Summary".bright_green().bold());
    eprintln!("  {} {}", "Time elapsed:".bright_cyan(), format_elapsed(elapsed).bright_white());
    eprintln!(
        "  {} {}",
        "Files processed:".bright_cyan(),
        summary.files_processed.to_string().bright_white()
    );
    eprintln!(
        "  {} {} records, {} attachment lines",
        "Decoded:".bright_cyan(),
        stats.records_decoded.to_string().bright_white(),
        stats.attachment_lines.to_string().bright_white()
    );
    eprintln!(
        "  {} {}",
        "Batches:".bright_cyan(),
        summary.batches.to_string().bright_white()
    );
    if stats.records_skipped > 0 {
        eprintln!(
            "  {} {} ({:.1}% decoded)",
            "Lines skipped:".bright_red(),
            stats.records_skipped.to_string().bright_red().bold(),
            stats.success_rate()
        );
    }
    if summary.existing_skipped > 0 {
        eprintln!(
            "  {} {}",
            "Already stored:".bright_yellow(),
            summary.existing_skipped.to_string().bright_white()
        );
    }
    print_section_counts("Rows written:", &summary.rows_written);
}
