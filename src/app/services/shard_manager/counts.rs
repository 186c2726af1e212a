//! Section row writes and running section counts
//!
//! Every section is stored in its own per-partition table
//! (`{section}_{tidx}`). Two aggregate tables track how many rows each
//! section holds: one row per (section, partition) and one per
//! (section, date).

use super::ShardManager;
use crate::app::services::record_store::{Predicate, RecordStore, Row};
use crate::constants::tables;
use crate::error::Result;
use crate::models::{SectionCounts, Value};
use crate::schema::SectionKind;
use chrono::NaiveDate;
use tracing::info;

fn count_row(section: SectionKind, partition: u32, count: u64, date: Option<NaiveDate>) -> Row {
    let mut row = Row::new();
    row.insert("attm".to_string(), Value::from(section.table_name()));
    row.insert("tidx".to_string(), Value::from(partition));
    row.insert("count".to_string(), Value::from(count));
    if let Some(date) = date {
        row.insert("date".to_string(), Value::from(date));
    }
    row
}

/// Add `count` to the matching aggregate row, creating it when absent
fn merge_count(
    store: &mut dyn RecordStore,
    table: &str,
    predicate: &Predicate,
    count: u64,
    fresh: Row,
) -> Result<()> {
    store.ensure_table(table)?;
    match store.select_one(table, predicate)? {
        Some(existing) => {
            let total = existing.get("count").and_then(Value::as_i64).unwrap_or(0) as u64 + count;
            let mut patch = Row::new();
            patch.insert("count".to_string(), Value::from(total));
            store.update(table, predicate, &patch)?;
        }
        None => {
            store.insert_many(table, vec![fresh])?;
        }
    }
    Ok(())
}

impl ShardManager {
    /// Write the rows of one section into its partition table, creating the table first
    pub fn write_section_rows(
        &self,
        store: &mut dyn RecordStore,
        section: SectionKind,
        partition: u32,
        date: NaiveDate,
        rows: Vec<Row>,
    ) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }
        let table = store.ensure_table_like(section.table_name(), &partition.to_string())?;
        let count = store.insert_many(&table, rows)?;
        info!("{}: {} records added to {}", date, count, table);
        Ok(count)
    }

    /// Merge the section counts of a batch into the running aggregates
    pub fn record_batch(
        &self,
        store: &mut dyn RecordStore,
        date: NaiveDate,
        partition: u32,
        counts: &SectionCounts,
    ) -> Result<SectionCounts> {
        let mut recorded = SectionCounts::new();
        for (&section, &count) in counts.iter().filter(|(_, count)| **count > 0) {
            let name = section.table_name();

            merge_count(
                store,
                tables::SECTION_COUNTS,
                &Predicate::all().eq("attm", name).eq("tidx", partition),
                count,
                count_row(section, partition, count, None),
            )?;
            merge_count(
                store,
                tables::DAILY_SECTION_COUNTS,
                &Predicate::all().eq("attm", name).eq("date", date),
                count,
                count_row(section, partition, count, Some(date)),
            )?;
            recorded.insert(section, count);
        }
        Ok(recorded)
    }

    /// Sections that hold rows in a partition, in canonical order
    pub fn partition_sections(&self, store: &dyn RecordStore, partition: u32) -> Result<Vec<SectionKind>> {
        if !store.table_exists(tables::SECTION_COUNTS) {
            return Ok(Vec::new());
        }
        let rows = store.select(tables::SECTION_COUNTS, &Predicate::all().eq("tidx", partition))?;
        Ok(SectionKind::ALL
            .iter()
            .copied()
            .filter(|kind| {
                rows.iter()
                    .any(|row| row.get("attm").and_then(Value::as_text) == Some(kind.table_name()))
            })
            .collect())
    }

    /// Running count of one section in a partition
    pub fn section_total(&self, store: &dyn RecordStore, section: SectionKind, partition: u32) -> Result<u64> {
        if !store.table_exists(tables::SECTION_COUNTS) {
            return Ok(0);
        }
        let predicate = Predicate::all().eq("attm", section.table_name()).eq("tidx", partition);
        Ok(store
            .select_one(tables::SECTION_COUNTS, &predicate)?
            .and_then(|row| row.get("count").and_then(Value::as_i64))
            .unwrap_or(0) as u64)
    }

    /// Count of one section on one date
    pub fn daily_total(&self, store: &dyn RecordStore, section: SectionKind, date: NaiveDate) -> Result<u64> {
        if !store.table_exists(tables::DAILY_SECTION_COUNTS) {
            return Ok(0);
        }
        let predicate = Predicate::all().eq("attm", section.table_name()).eq("date", date);
        Ok(store
            .select_one(tables::DAILY_SECTION_COUNTS, &predicate)?
            .and_then(|row| row.get("count").and_then(Value::as_i64))
            .unwrap_or(0) as u64)
    }
}
