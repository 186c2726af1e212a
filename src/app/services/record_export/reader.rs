//! Stored rows of a date or UID and record rebuilding

use super::RecordExporter;
use crate::app::services::record_store::rows::{instance, row_id, row_uid, row_values};
use crate::app::services::record_store::{partition_table, Predicate, RecordStore, Row};
use crate::error::Result;
use crate::models::CompositeRecord;
use crate::schema::SectionKind;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

fn sort_rows(rows: &mut [Row]) {
    rows.sort_by_key(|row| (row_id(row), instance(row)));
}

impl RecordExporter {
    /// Core rows of a date in row-id order
    pub fn read_core_for_date(&self, store: &dyn RecordStore, date: NaiveDate) -> Result<Vec<Row>> {
        let partition = self.shards().resolve_partition(store, date)?;
        self.core_rows(store, partition, date)
    }

    /// Rows of one section belonging to the records of a date
    pub fn read_section_for_date(
        &self,
        store: &dyn RecordStore,
        section: SectionKind,
        date: NaiveDate,
    ) -> Result<Vec<Row>> {
        let partition = self.shards().resolve_partition(store, date)?;
        let core = self.core_rows(store, partition, date)?;
        if section == self.core_kind() {
            return Ok(core);
        }
        let ids: BTreeSet<u64> = core.iter().filter_map(row_id).collect();
        self.section_rows(store, section, partition, &ids)
    }

    /// Rows of one section carrying a UID
    pub fn read_section_for_uid(
        &self,
        store: &dyn RecordStore,
        section: SectionKind,
        uid: &str,
        partition: u32,
    ) -> Result<Vec<Row>> {
        let table = partition_table(section.table_name(), partition);
        if !store.table_exists(&table) {
            return Ok(Vec::new());
        }
        let mut rows = store.select(&table, &Predicate::all().eq("uid", uid))?;
        sort_rows(&mut rows);
        Ok(rows)
    }

    /// Rebuild the composite records of a date, in row-id order
    pub fn records_for_date(&self, store: &dyn RecordStore, date: NaiveDate) -> Result<Vec<CompositeRecord>> {
        let registry = self.codec.registry();
        let partition = self.shards().resolve_partition(store, date)?;
        let core_kind = self.core_kind();
        let core = self.core_rows(store, partition, date)?;

        let mut records: BTreeMap<u64, CompositeRecord> = BTreeMap::new();
        for row in &core {
            let Some(id) = row_id(row) else { continue };
            let mut record = CompositeRecord::new(date);
            record.uid = row_uid(row).map(str::to_string);
            record.set_section(core_kind, row_values(registry.schema(core_kind), row));
            records.insert(id, record);
        }
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let ids: BTreeSet<u64> = records.keys().copied().collect();
        for section in self.shards().partition_sections(store, partition)? {
            if section == core_kind || section.family() != self.format {
                continue;
            }
            let schema = registry.schema(section);
            for row in self.section_rows(store, section, partition, &ids)? {
                if let Some(record) = row_id(&row).and_then(|id| records.get_mut(&id)) {
                    record.push_instance(section, row_values(schema, &row));
                }
            }
        }

        debug!("{}: rebuilt {} records from partition {}", date, records.len(), partition);
        Ok(records.into_values().collect())
    }

    fn core_rows(&self, store: &dyn RecordStore, partition: u32, date: NaiveDate) -> Result<Vec<Row>> {
        let table = partition_table(self.core_kind().table_name(), partition);
        if !store.table_exists(&table) {
            return Ok(Vec::new());
        }
        let mut rows = store.select(&table, &Predicate::all().eq("date", date))?;
        sort_rows(&mut rows);
        Ok(rows)
    }

    /// Rows of a section table whose row id is in `ids`
    pub(crate) fn section_rows(
        &self,
        store: &dyn RecordStore,
        section: SectionKind,
        partition: u32,
        ids: &BTreeSet<u64>,
    ) -> Result<Vec<Row>> {
        let (Some(&first), Some(&last)) = (ids.first(), ids.last()) else {
            return Ok(Vec::new());
        };
        let table = partition_table(section.table_name(), partition);
        if !store.table_exists(&table) {
            return Ok(Vec::new());
        }

        let predicate = Predicate::all().ge("iidx", first).le("iidx", last);
        let mut rows: Vec<Row> = store
            .select(&table, &predicate)?
            .into_iter()
            .filter(|row| row_id(row).is_some_and(|id| ids.contains(&id)))
            .collect();
        sort_rows(&mut rows);
        Ok(rows)
    }
}
