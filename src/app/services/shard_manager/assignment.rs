//! Row assignment
//!
//! Primary records get the next row id of the run. Standalone attachment
//! records name their parent row by UID instead; the UID's first two
//! characters select a lookup table (`itidx_{prefix}`) and the remaining
//! four are the key inside it.

use super::{Binding, IngestionContext, ShardManager};
use crate::app::services::record_store::{partition_table, Predicate, RecordStore, Row};
use crate::constants::{tables, UID_PREFIX_WIDTH, UID_WIDTH};
use crate::error::{Error, Result};
use crate::models::{FieldValues, ShardLocation, Value};
use crate::schema::{SectionSchema, Uniqueness};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// How the next record is bound to a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKey<'a> {
    /// Take the next row id
    Sequential,
    /// Resolve an existing row through the UID lookup tables
    Indexed(&'a str),
}

/// Lookup table suffix (lower-cased prefix) and key of a UID
pub fn split_uid(uid: &str) -> Result<(String, String)> {
    let (prefix, suid) = uid
        .get(..UID_WIDTH)
        .and_then(|u| Some((u.get(..UID_PREFIX_WIDTH)?, u.get(UID_PREFIX_WIDTH..)?)))
        .ok_or_else(|| Error::missing_uid(uid, format!("UID must be {} characters", UID_WIDTH)))?;
    Ok((prefix.to_lowercase(), suid.to_string()))
}

impl ShardManager {
    /// Assign the location of the next record.
    ///
    /// Sequential assignment always advances the row id. Indexed assignment
    /// returns the stored location of the UID and leaves the row counter
    /// alone, so repeating it for the same UID yields the same location.
    pub fn assign_next(
        &self,
        store: &dyn RecordStore,
        ctx: &mut IngestionContext,
        key: RowKey<'_>,
    ) -> Result<ShardLocation> {
        match key {
            RowKey::Sequential => {
                ctx.unbind();
                ctx.current_row += 1;
                Ok(ctx.location())
            }
            RowKey::Indexed(uid) => {
                let binding = self.lookup_uid(store, uid)?;
                let location = binding.location;
                ctx.bind(binding);
                Ok(location)
            }
        }
    }

    /// Stored location and date of a UID
    pub fn lookup_uid(&self, store: &dyn RecordStore, uid: &str) -> Result<Binding> {
        let (prefix, suid) = split_uid(uid)?;
        let table = partition_table(tables::UID_INDEX, &prefix);
        if !store.table_exists(&table) {
            return Err(Error::missing_uid(uid, format!("no lookup table {}", table)));
        }

        let row = store
            .select_one(&table, &Predicate::all().eq("suid", suid.as_str()))?
            .ok_or_else(|| Error::missing_uid(uid, format!("not in {}", table)))?;

        let int = |column: &str| row.get(column).and_then(Value::as_i64);
        let location = match (int("tidx"), int("iidx")) {
            (Some(tidx), Some(iidx)) => ShardLocation::new(
                u32::try_from(tidx).map_err(|_| Error::missing_uid(uid, "partition out of range"))?,
                u64::try_from(iidx).map_err(|_| Error::missing_uid(uid, "negative row id"))?,
            ),
            _ => return Err(Error::missing_uid(uid, format!("incomplete entry in {}", table))),
        };
        let date = row
            .get("date")
            .and_then(Value::as_date)
            .ok_or_else(|| Error::missing_uid(uid, format!("entry in {} has no date", table)))?;

        Ok(Binding {
            uid: uid.to_string(),
            location,
            date,
        })
    }

    /// Whether the parent row already holds this attachment.
    ///
    /// Sections with a uniqueness key only match an instance with the same
    /// key; other sections match any instance on the row.
    pub fn attachment_exists(
        &self,
        store: &dyn RecordStore,
        location: ShardLocation,
        schema: &SectionSchema,
        values: &FieldValues,
    ) -> Result<bool> {
        let table = partition_table(schema.kind.table_name(), location.partition_id);
        if !store.table_exists(&table) {
            return Ok(false);
        }

        let mut predicate = Predicate::all().eq("iidx", location.row_id);
        if let Uniqueness::KeyedBy(fields) = schema.uniqueness {
            for field in fields {
                let value = values.get(*field).cloned().unwrap_or_default();
                predicate = predicate.eq(field, value);
            }
        }
        Ok(store.count(&table, &predicate)? > 0)
    }

    /// Same check as [`Self::attachment_exists`] against rows not yet written
    pub fn attachment_pending(&self, rows: &[Row], row_id: u64, schema: &SectionSchema, values: &FieldValues) -> bool {
        rows.iter()
            .filter(|row| row.get("iidx").and_then(Value::as_i64) == i64::try_from(row_id).ok())
            .any(|row| match schema.uniqueness {
                Uniqueness::None => true,
                Uniqueness::KeyedBy(fields) => fields.iter().all(|field| {
                    let stored = row.get(*field).unwrap_or(&Value::Missing);
                    let incoming = values.get(*field).unwrap_or(&Value::Missing);
                    stored == incoming
                }),
            })
    }

    /// Register the UIDs of a batch in their prefix lookup tables
    pub fn register_uids(
        &self,
        store: &mut dyn RecordStore,
        date: NaiveDate,
        partition: u32,
        uids: &[(String, u64)],
    ) -> Result<usize> {
        let mut by_prefix: BTreeMap<String, Vec<Row>> = BTreeMap::new();
        for (uid, row_id) in uids {
            let (prefix, suid) = split_uid(uid)?;
            let mut row = Row::new();
            row.insert("suid".to_string(), Value::from(suid));
            row.insert("date".to_string(), Value::from(date));
            row.insert("tidx".to_string(), Value::from(partition));
            row.insert("iidx".to_string(), Value::from(*row_id));
            by_prefix.entry(prefix).or_default().push(row);
        }

        let mut registered = 0;
        for (prefix, rows) in by_prefix {
            let table = store.ensure_table_like(tables::UID_INDEX, &prefix)?;
            let count = store.insert_many(&table, rows)?;
            info!("{}: {} records added to {}", date, count, table);
            registered += count;
        }
        debug!("Registered {} UIDs for partition {}", registered, partition);
        Ok(registered)
    }
}
