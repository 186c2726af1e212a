//! Export command: write the records of one date

use super::shared::{RunStats, format_elapsed, open_store, print_section_counts};
use crate::app::services::quality_control::TrimmingEngine;
use crate::app::services::record_export::RecordExporter;
use crate::cli::args::ExportArgs;
use anyhow::{Context, Result};
use colored::*;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::time::Instant;
use tracing::{info, warn};

pub async fn run_export(args: &ExportArgs) -> Result<RunStats> {
    let start_time = Instant::now();
    let config = args.store.load_config()?;
    if args.has_stray_options() {
        warn!("Trimming options are ignored without --trim");
    }

    let mut exporter = RecordExporter::new(&config)?;
    if args.trim {
        let options = args.trim_options(config.trim)?;
        info!("Trimming with {:?}", options);
        exporter = exporter.with_trimming(TrimmingEngine::new(options)?);
    }

    let store = open_store(args.store.store_path(), false)?;

    let summary = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut out = BufWriter::new(file);
            let summary = exporter.write_records_for_date(&store, args.date, args.include_repeatable, &mut out)?;
            out.flush()?;
            summary
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            let summary = exporter.write_records_for_date(&store, args.date, args.include_repeatable, &mut out)?;
            out.flush()?;
            summary
        }
    };

    let elapsed = start_time.elapsed();
    eprintln!("\n{}", format!("Export {}", args.date).bright_green().bold());
    eprintln!("  {} {}", "Time elapsed:".bright_cyan(), format_elapsed(elapsed).bright_white());
    eprintln!(
        "  {} {} in {} lines",
        "Records:".bright_cyan(),
        summary.records.to_string().bright_white(),
        summary.lines.to_string().bright_white()
    );
    if summary.rejected > 0 {
        eprintln!(
            "  {} {}",
            "Rejected by trimming:".bright_red(),
            summary.rejected.to_string().bright_red().bold()
        );
    }
    print_section_counts("Sections written:", &summary.sections);

    Ok(RunStats {
        files_processed: 0,
        records: summary.records,
        lines_written: summary.lines,
        processing_time: elapsed,
    })
}
