//! Shard and inventory manager
//!
//! Assigns every ingested record a partition (tidx) and a row id (iidx),
//! keeps one inventory record per ingestion batch, rolls over to a new
//! partition when the running count of the current one would exceed its
//! capacity, and maintains the per-partition and per-date section counts
//! plus the per-prefix UID lookup tables.
//!
//! All state that changes during a run lives in an [`IngestionContext`]
//! owned by the caller; the manager itself only holds the capacity.
//!
//! ## Architecture
//!
//! - [`context`] - Explicit per-run ingestion state
//! - [`inventory`] - Batch inventory, rollover and partition resolution
//! - [`assignment`] - Sequential and UID-indexed row assignment
//! - [`counts`] - Section row writes and running section counts

pub mod assignment;
pub mod context;
pub mod counts;
pub mod inventory;

#[cfg(test)]
pub mod tests;

pub use assignment::{split_uid, RowKey};
pub use context::{Binding, IngestionContext};

use crate::error::{Error, Result};

/// Partition and row bookkeeping over a record store
#[derive(Debug, Clone, Copy)]
pub struct ShardManager {
    capacity: u64,
}

impl ShardManager {
    /// Create a manager; a zero capacity would roll over on every batch and is refused
    pub fn new(capacity: u64) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::configuration(
                "partition capacity must be greater than 0",
            ));
        }
        Ok(Self { capacity })
    }

    /// Rows a partition may hold before the next batch rolls over
    pub fn capacity(&self) -> u64 {
        self.capacity
    }
}
