//! Count command: stored rows per section for one date

use super::shared::{RunStats, open_store};
use crate::app::services::record_export::RecordExporter;
use crate::cli::args::CountArgs;
use anyhow::Result;
use colored::*;
use std::collections::BTreeMap;
use std::time::Instant;

pub async fn run_count(args: &CountArgs) -> Result<RunStats> {
    let start_time = Instant::now();
    let config = args.store.load_config()?;
    let exporter = RecordExporter::new(&config)?;
    let store = open_store(args.store.store_path(), false)?;

    let counts = exporter.count_records_for_date(&store, args.date, args.include_repeatable)?;
    let records = counts
        .get(&exporter.core_kind())
        .copied()
        .unwrap_or(0) as usize;

    if args.json {
        let by_table: BTreeMap<&str, u64> = counts
            .iter()
            .map(|(kind, count)| (kind.table_name(), *count))
            .collect();
        println!("{}", serde_json::to_string_pretty(&by_table)?);
    } else {
        println!("{}", format!("Counts for {}", args.date).bright_green().bold());
        if counts.is_empty() {
            println!("  {}", "no records".bright_black());
        }
        for (kind, count) in &counts {
            println!("  {:<14} {}", kind.table_name(), count.to_string().bright_white());
        }
    }

    Ok(RunStats {
        records,
        processing_time: start_time.elapsed(),
        ..Default::default()
    })
}
