use super::{partition_table, Predicate, RecordStore, Row, StoreError};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Table-per-map store kept entirely in memory.
///
/// Tables are schema-less: a template only names the family a partition
/// table belongs to. The whole store can be written to and restored from a
/// JSON snapshot so consecutive CLI runs see the same partitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    tables: BTreeMap<String, Vec<Row>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a snapshot, or start empty when the file does not exist yet
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No snapshot at {}, starting with an empty store", path.display());
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)?;
        let store: MemoryStore = serde_json::from_str(&content)?;
        info!(
            "Loaded store snapshot {} ({} tables)",
            path.display(),
            store.tables.len()
        );
        Ok(store)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string(self)?;
        fs::write(path, content)?;
        debug!("Saved store snapshot to {}", path.display());
        Ok(())
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, Vec::len)
    }

    fn table_mut(&mut self, table: &str) -> std::result::Result<&mut Vec<Row>, StoreError> {
        self.tables
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))
    }
}

impl RecordStore for MemoryStore {
    fn table_exists(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    fn create_table(&mut self, name: &str) -> std::result::Result<(), StoreError> {
        if self.tables.contains_key(name) {
            return Err(StoreError::TableExists(name.to_string()));
        }
        self.tables.insert(name.to_string(), Vec::new());
        debug!("Created table {}", name);
        Ok(())
    }

    fn create_table_like(
        &mut self,
        template: &str,
        suffix: &str,
    ) -> std::result::Result<String, StoreError> {
        let name = partition_table(template, suffix);
        self.create_table(&name)?;
        Ok(name)
    }

    fn select(&self, table: &str, predicate: &Predicate) -> std::result::Result<Vec<Row>, StoreError> {
        let rows = self
            .tables
            .get(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        Ok(rows.iter().filter(|row| predicate.matches(row)).cloned().collect())
    }

    fn insert_many(&mut self, table: &str, rows: Vec<Row>) -> std::result::Result<usize, StoreError> {
        let target = self.table_mut(table)?;
        let count = rows.len();
        target.extend(rows);
        Ok(count)
    }

    fn update(
        &mut self,
        table: &str,
        predicate: &Predicate,
        patch: &Row,
    ) -> std::result::Result<usize, StoreError> {
        let target = self.table_mut(table)?;
        let mut touched = 0;
        for row in target.iter_mut().filter(|row| predicate.matches(row)) {
            for (column, value) in patch {
                row.insert(column.clone(), value.clone());
            }
            touched += 1;
        }
        Ok(touched)
    }
}
