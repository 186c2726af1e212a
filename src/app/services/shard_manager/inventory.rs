//! Batch inventory and partition rollover
//!
//! One inventory row per ingestion batch records the row-id range the batch
//! occupies, the partition it was written to and the running row count of
//! that partition. The latest row is where the next batch continues from.

use super::{IngestionContext, ShardManager};
use crate::app::services::record_store::{Predicate, RecordStore, Row};
use crate::constants::{tables, BOOTSTRAP_PARTITION};
use crate::error::{Error, Result};
use crate::models::{InventoryRecord, Value};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

impl InventoryRecord {
    /// Store row of this inventory record
    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("didx".to_string(), Value::from(self.didx));
        row.insert("date".to_string(), Value::from(self.date));
        row.insert("fname".to_string(), Value::from(self.source_name.as_str()));
        row.insert("miniidx".to_string(), Value::from(self.min_row_id));
        row.insert("maxiidx".to_string(), Value::from(self.max_row_id));
        row.insert("tidx".to_string(), Value::from(self.partition_id));
        row.insert("count".to_string(), Value::from(self.record_count));
        row.insert("tcount".to_string(), Value::from(self.cumulative_partition_count));
        row
    }

    /// Read an inventory record back from its store row
    pub fn from_row(row: &Row) -> Result<Self> {
        let int = |column: &str| -> Result<i64> {
            row.get(column)
                .and_then(Value::as_i64)
                .ok_or_else(|| Error::configuration(format!("inventory row without '{}'", column)))
        };
        let unsigned = |column: &str| -> Result<u64> {
            u64::try_from(int(column)?)
                .map_err(|_| Error::configuration(format!("negative inventory '{}'", column)))
        };
        let partition_id = u32::try_from(int("tidx")?)
            .map_err(|_| Error::configuration("inventory partition out of range"))?;

        Ok(Self {
            didx: unsigned("didx")?,
            date: row.get("date").and_then(Value::as_date),
            source_name: row
                .get("fname")
                .and_then(Value::as_text)
                .unwrap_or_default()
                .to_string(),
            min_row_id: unsigned("miniidx")?,
            max_row_id: unsigned("maxiidx")?,
            partition_id,
            record_count: unsigned("count")?,
            cumulative_partition_count: unsigned("tcount")?,
        })
    }
}

fn inventory_rows(store: &dyn RecordStore, predicate: &Predicate) -> Result<Vec<InventoryRecord>> {
    if !store.table_exists(tables::INVENTORY) {
        return Ok(Vec::new());
    }
    store
        .select(tables::INVENTORY, predicate)?
        .iter()
        .map(InventoryRecord::from_row)
        .collect()
}

impl ShardManager {
    /// The most recently added inventory record, or the bootstrap state of an empty store
    pub fn latest_inventory(&self, store: &dyn RecordStore) -> Result<InventoryRecord> {
        Ok(inventory_rows(store, &Predicate::all())?
            .into_iter()
            .max_by_key(|record| record.didx)
            .unwrap_or_else(InventoryRecord::bootstrap))
    }

    /// Inventory record covering a date, if any
    pub fn inventory_for_date(&self, store: &dyn RecordStore, date: NaiveDate) -> Result<Option<InventoryRecord>> {
        Ok(inventory_rows(store, &Predicate::all().eq("date", date))?
            .into_iter()
            .max_by_key(|record| record.didx))
    }

    /// Start a batch that appends after the latest inventory record
    pub fn begin_batch(&self, store: &dyn RecordStore, ctx: &mut IngestionContext, source_name: &str) -> Result<()> {
        if ctx.inventory.is_none() {
            ctx.inventory = Some(self.latest_inventory(store)?);
        }
        if let Some(inventory) = &ctx.inventory {
            ctx.current_row = inventory.max_row_id;
            ctx.current_partition = inventory.partition_id;
        }
        ctx.source_name = source_name.to_string();
        debug!(
            "Batch from {} starts after row {} in partition {}",
            source_name, ctx.current_row, ctx.current_partition
        );
        Ok(())
    }

    /// Resume numbering inside the range of a date that is already inventoried
    pub fn begin_batch_for_existing_date(
        &self,
        store: &dyn RecordStore,
        ctx: &mut IngestionContext,
        date: NaiveDate,
    ) -> Result<()> {
        let inventory = self.inventory_for_date(store, date)?.ok_or_else(|| {
            Error::configuration(format!("{}: date not in inventory yet", date))
        })?;

        if ctx.current_row < inventory.min_row_id {
            ctx.current_row = inventory.min_row_id - 1;
            ctx.current_partition = inventory.partition_id;
        }
        debug!(
            "{}: resuming in partition {} after row {}",
            date, ctx.current_partition, ctx.current_row
        );
        Ok(())
    }

    /// Add the inventory record of a closed batch, rolling over when the partition is full.
    ///
    /// A batch never straddles partitions: when it would push the running
    /// count past capacity the whole batch opens the next partition and the
    /// running count restarts at the batch size.
    pub fn update_inventory(
        &self,
        store: &mut dyn RecordStore,
        ctx: &mut IngestionContext,
        date: NaiveDate,
        record_count: u64,
    ) -> Result<InventoryRecord> {
        let previous = match &ctx.inventory {
            Some(inventory) => inventory.clone(),
            None => self.latest_inventory(&*store)?,
        };
        if record_count == 0 {
            debug!("{}: empty batch, inventory unchanged", date);
            return Ok(previous);
        }

        let mut record = InventoryRecord {
            didx: previous.didx + 1,
            date: Some(date),
            source_name: ctx.source_name.clone(),
            min_row_id: previous.max_row_id + 1,
            max_row_id: previous.max_row_id + record_count,
            partition_id: previous.partition_id,
            record_count,
            cumulative_partition_count: previous.cumulative_partition_count + record_count,
        };

        if record.cumulative_partition_count > self.capacity {
            record.partition_id += 1;
            record.cumulative_partition_count = record_count;
            info!(
                "{}: partition {} is full, rolling over to partition {}",
                date, previous.partition_id, record.partition_id
            );
            if record_count > self.capacity {
                warn!(
                    "{}: batch of {} rows exceeds partition capacity {}",
                    date, record_count, self.capacity
                );
            }
        }

        store.ensure_table(tables::INVENTORY)?;
        store.insert_many(tables::INVENTORY, vec![record.to_row()])?;

        ctx.current_partition = ctx.current_partition.max(record.partition_id);
        ctx.current_row = ctx.current_row.max(record.max_row_id);
        ctx.inventory = Some(record.clone());

        debug!(
            "Inventory {}: rows {}..={} in partition {} ({} total)",
            record.didx,
            record.min_row_id,
            record.max_row_id,
            record.partition_id,
            record.cumulative_partition_count
        );
        Ok(record)
    }

    /// Partition holding a date.
    ///
    /// Falls back to the partition of the latest inventoried date before it,
    /// and to the bootstrap partition when nothing precedes it.
    pub fn resolve_partition(&self, store: &dyn RecordStore, date: NaiveDate) -> Result<u32> {
        if let Some(inventory) = self.inventory_for_date(store, date)? {
            return Ok(inventory.partition_id);
        }

        let preceding = inventory_rows(store, &Predicate::all().lt("date", date))?
            .into_iter()
            .max_by_key(|record| (record.date, record.didx));

        Ok(preceding.map_or(BOOTSTRAP_PARTITION, |record| record.partition_id))
    }

    /// Date of the batch whose row range contains a row id
    pub fn date_for_row(&self, store: &dyn RecordStore, row_id: u64) -> Result<Option<NaiveDate>> {
        let predicate = Predicate::all()
            .le("miniidx", row_id)
            .ge("maxiidx", row_id);
        Ok(inventory_rows(store, &predicate)?
            .into_iter()
            .find_map(|record| record.date))
    }
}
