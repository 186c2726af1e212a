//! Test utilities for the shard manager
//!
//! Runs batches of a given size through a fresh in-memory store the way an
//! ingestion run would: begin, assign sequential rows, close the batch.

use chrono::NaiveDate;

use super::{IngestionContext, RowKey, ShardManager};
use crate::app::services::record_store::memory::MemoryStore;
use crate::models::{InventoryRecord, ShardLocation};

mod assignment_tests;
mod counts_tests;

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(1950, 1, d).unwrap()
}

pub fn manager(capacity: u64) -> ShardManager {
    ShardManager::new(capacity).unwrap()
}

/// Ingest one batch of `size` primary records for a date
pub fn run_batch(
    manager: &ShardManager,
    store: &mut MemoryStore,
    ctx: &mut IngestionContext,
    date: NaiveDate,
    size: u64,
) -> (Vec<ShardLocation>, InventoryRecord) {
    manager.begin_batch(store, ctx, "batch.imma").unwrap();
    let locations = (0..size)
        .map(|_| manager.assign_next(store, ctx, RowKey::Sequential).unwrap())
        .collect();
    let inventory = manager.update_inventory(store, ctx, date, size).unwrap();
    (locations, inventory)
}
