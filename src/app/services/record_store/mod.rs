//! Record store interface
//!
//! The shard manager, the ingestion pipeline and the export path talk to the
//! relational storage engine only through [`RecordStore`]: existence checks,
//! template-based table creation, predicate selects, bulk inserts and
//! predicate updates. Rows are flat column → [`Value`] maps.
//!
//! - [`memory`] - In-memory implementation with JSON snapshots
//! - [`rows`] - Stored row layout of section instances

pub mod memory;
pub mod rows;

pub use memory::MemoryStore;

use crate::models::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use thiserror::Error;

/// One stored row
pub type Row = BTreeMap<String, Value>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Table already exists: {0}")]
    TableExists(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Synchronous access to the relational storage collaborator.
pub trait RecordStore {
    fn table_exists(&self, name: &str) -> bool;

    /// Create an empty base table
    fn create_table(&mut self, name: &str) -> Result<(), StoreError>;

    /// Create `{template}_{suffix}` from a template and return its name
    fn create_table_like(&mut self, template: &str, suffix: &str) -> Result<String, StoreError>;

    /// Matching rows in insertion order
    fn select(&self, table: &str, predicate: &Predicate) -> Result<Vec<Row>, StoreError>;

    fn insert_many(&mut self, table: &str, rows: Vec<Row>) -> Result<usize, StoreError>;

    /// Merge `patch` into every matching row; returns the number of rows touched
    fn update(&mut self, table: &str, predicate: &Predicate, patch: &Row) -> Result<usize, StoreError>;

    /// Create `{template}_{suffix}` unless it already exists
    fn ensure_table_like(&mut self, template: &str, suffix: &str) -> Result<String, StoreError> {
        let name = partition_table(template, suffix);
        if self.table_exists(&name) {
            Ok(name)
        } else {
            self.create_table_like(template, suffix)
        }
    }

    fn ensure_table(&mut self, name: &str) -> Result<(), StoreError> {
        if self.table_exists(name) {
            Ok(())
        } else {
            self.create_table(name)
        }
    }

    /// First matching row
    fn select_one(&self, table: &str, predicate: &Predicate) -> Result<Option<Row>, StoreError> {
        Ok(self.select(table, predicate)?.into_iter().next())
    }

    fn count(&self, table: &str, predicate: &Predicate) -> Result<usize, StoreError> {
        Ok(self.select(table, predicate)?.len())
    }
}

/// Name of a partition or prefix table derived from a template
pub fn partition_table(template: &str, suffix: impl std::fmt::Display) -> String {
    format!("{}_{}", template, suffix)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub column: String,
    pub op: Comparison,
    pub value: Value,
}

impl Clause {
    fn matches(&self, row: &Row) -> bool {
        let actual = row.get(&self.column).unwrap_or(&Value::Missing);
        match self.op {
            Comparison::Eq => values_equal(actual, &self.value),
            op => match compare_values(actual, &self.value) {
                Some(ordering) => match op {
                    Comparison::Lt => ordering == Ordering::Less,
                    Comparison::Le => ordering != Ordering::Greater,
                    Comparison::Gt => ordering == Ordering::Greater,
                    Comparison::Ge => ordering != Ordering::Less,
                    Comparison::Eq => ordering == Ordering::Equal,
                },
                None => false,
            },
        }
    }
}

/// Conjunction of column comparisons; the empty predicate matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    pub fn all() -> Self {
        Self::default()
    }

    fn with(mut self, column: &str, op: Comparison, value: impl Into<Value>) -> Self {
        self.clauses.push(Clause {
            column: column.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.with(column, Comparison::Eq, value)
    }

    pub fn lt(self, column: &str, value: impl Into<Value>) -> Self {
        self.with(column, Comparison::Lt, value)
    }

    pub fn le(self, column: &str, value: impl Into<Value>) -> Self {
        self.with(column, Comparison::Le, value)
    }

    pub fn gt(self, column: &str, value: impl Into<Value>) -> Self {
        self.with(column, Comparison::Gt, value)
    }

    pub fn ge(self, column: &str, value: impl Into<Value>) -> Self {
        self.with(column, Comparison::Ge, value)
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.clauses.iter().all(|clause| clause.matches(row))
    }
}

/// Equality with numeric widening; missing only equals missing
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Integer(_), Value::Decimal(_)) | (Value::Decimal(_), Value::Integer(_)) => {
            compare_values(a, b) == Some(Ordering::Equal)
        }
        _ => a == b,
    }
}

/// Ordering between comparable values; `None` for missing or mixed kinds
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => Some(x.cmp(y)),
        (Value::Text(x), Value::Text(y)) => Some(x.cmp(y)),
        (Value::Date(x), Value::Date(y)) => Some(x.cmp(y)),
        (Value::Integer(_) | Value::Decimal(_), Value::Integer(_) | Value::Decimal(_)) => {
            a.as_f64()?.partial_cmp(&b.as_f64()?)
        }
        _ => None,
    }
}
