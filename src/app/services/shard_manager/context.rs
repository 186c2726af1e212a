//! Explicit ingestion state
//!
//! Everything that changes while one run walks through its input lives
//! here and is passed by reference to the shard manager: the current
//! partition and row, the stored row the current attachment line is bound
//! to and the inventory record of the last closed batch.

use crate::models::{InventoryRecord, ShardLocation};
use chrono::NaiveDate;

/// A standalone attachment line resolved to its parent row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub uid: String,
    pub location: ShardLocation,
    /// Date of the parent row
    pub date: NaiveDate,
}

/// Mutable state of one ingestion run; one writer per store at a time.
#[derive(Debug, Clone, Default)]
pub struct IngestionContext {
    /// Partition (tidx) rows of the current batch are written to
    pub current_partition: u32,

    /// Last row id (iidx) handed out
    pub current_row: u64,

    /// Parent row of the attachment line being ingested
    pub binding: Option<Binding>,

    /// Inventory record of the last closed batch; `None` until the first batch starts
    pub inventory: Option<InventoryRecord>,

    /// Name of the input currently being ingested
    pub source_name: String,
}

impl IngestionContext {
    pub fn new() -> Self {
        Self {
            current_partition: crate::constants::BOOTSTRAP_PARTITION,
            ..Self::default()
        }
    }

    /// Location of the last row handed out
    pub fn location(&self) -> ShardLocation {
        ShardLocation::new(self.current_partition, self.current_row)
    }

    pub fn bind(&mut self, binding: Binding) {
        self.binding = Some(binding);
    }

    /// Forget the attachment binding
    pub fn unbind(&mut self) {
        self.binding = None;
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }
}
