//! Core data structures for decoded observation records.
//!
//! Defines field values, composite multi-section records, shard locations
//! and inventory records shared by the codec, the shard manager and the
//! quality-control engine.

use crate::schema::SectionKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single decoded field value.
///
/// `Missing` is explicit and distinct from zero: blank columns, sentinel
/// values and unparseable `nan` text all decode to it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Missing,
    Text(String),
    Integer(i64),
    Decimal(f64),
    Date(NaiveDate),
}

static MISSING: Value = Value::Missing;

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(v) => Some(*v as f64),
            Value::Decimal(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Raw fixed-point integer for a field with the given divisor.
    ///
    /// Integers are taken as already scaled; decimals are multiplied back
    /// and rounded half away from zero.
    pub fn scaled_integer(&self, divisor: u32) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            Value::Decimal(v) => Some(round_half_away(*v * divisor as f64)),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Decimal(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or_default()
    }
}

/// Round half away from zero
pub fn round_half_away(value: f64) -> i64 {
    if value >= 0.0 {
        (value + 0.5).trunc() as i64
    } else {
        (value - 0.5).trunc() as i64
    }
}

/// Field name to value mapping for one section instance
pub type FieldValues = BTreeMap<String, Value>;

/// Section instances keyed by section kind, iterated in canonical order
pub type SectionMap = BTreeMap<SectionKind, Vec<FieldValues>>;

/// Rows contributed per section by one line or one batch
pub type SectionCounts = BTreeMap<SectionKind, u64>;

/// One logical observation: a date plus one or more decoded sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeRecord {
    /// Opaque identifier linking the core to its attachments
    pub uid: Option<String>,
    /// Calendar date derived from the core section
    pub date: NaiveDate,
    /// Decoded section instances; singular sections hold exactly one
    pub sections: SectionMap,
}

impl CompositeRecord {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            uid: None,
            date,
            sections: SectionMap::new(),
        }
    }

    /// First (or only) instance of a section
    pub fn section(&self, kind: SectionKind) -> Option<&FieldValues> {
        self.sections.get(&kind).and_then(|v| v.first())
    }

    pub fn section_mut(&mut self, kind: SectionKind) -> Option<&mut FieldValues> {
        self.sections.get_mut(&kind).and_then(|v| v.first_mut())
    }

    /// All instances of a section, empty when absent
    pub fn instances(&self, kind: SectionKind) -> &[FieldValues] {
        self.sections.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Value of a field, `Missing` when the section or field is absent
    pub fn value(&self, kind: SectionKind, field: &str) -> &Value {
        self.section(kind)
            .and_then(|values| values.get(field))
            .unwrap_or(&MISSING)
    }

    /// Replace the single instance of a singular section
    pub fn set_section(&mut self, kind: SectionKind, values: FieldValues) {
        self.sections.insert(kind, vec![values]);
    }

    /// Append an instance of a repeatable section
    pub fn push_instance(&mut self, kind: SectionKind, values: FieldValues) {
        self.sections.entry(kind).or_default().push(values);
    }

    pub fn has_section(&self, kind: SectionKind) -> bool {
        !self.instances(kind).is_empty()
    }

    /// Number of instances per section present in this record
    pub fn section_counts(&self) -> SectionCounts {
        self.sections
            .iter()
            .filter(|(_, instances)| !instances.is_empty())
            .map(|(kind, instances)| (*kind, instances.len() as u64))
            .collect()
    }
}

/// Sections read from a standalone attachment line, bound to a parent row by UID.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentLine {
    pub uid: String,
    pub sections: SectionMap,
}

impl AttachmentLine {
    pub fn section_counts(&self) -> SectionCounts {
        self.sections
            .iter()
            .map(|(kind, instances)| (*kind, instances.len() as u64))
            .collect()
    }
}

/// Output of decoding one physical line
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedLine {
    /// A line carrying the core sections
    Primary(CompositeRecord),
    /// A continuation or standalone attachment line
    Attachment(AttachmentLine),
}

impl DecodedLine {
    pub fn section_counts(&self) -> SectionCounts {
        match self {
            DecodedLine::Primary(record) => record.section_counts(),
            DecodedLine::Attachment(line) => line.section_counts(),
        }
    }
}

/// Partition (tidx) and row (iidx) identity of a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShardLocation {
    pub partition_id: u32,
    pub row_id: u64,
}

impl ShardLocation {
    pub fn new(partition_id: u32, row_id: u64) -> Self {
        Self {
            partition_id,
            row_id,
        }
    }
}

/// Row-id range and partition bookkeeping for one ingestion batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    /// Store-assigned identity; 0 for a record not yet persisted
    pub didx: u64,
    pub date: Option<NaiveDate>,
    pub source_name: String,
    pub min_row_id: u64,
    pub max_row_id: u64,
    pub partition_id: u32,
    pub record_count: u64,
    pub cumulative_partition_count: u64,
}

impl InventoryRecord {
    /// Inventory state of an empty store
    pub fn bootstrap() -> Self {
        Self {
            didx: 0,
            date: None,
            source_name: String::new(),
            min_row_id: 0,
            max_row_id: 0,
            partition_id: crate::constants::BOOTSTRAP_PARTITION,
            record_count: 0,
            cumulative_partition_count: 0,
        }
    }

    pub fn contains_row(&self, row_id: u64) -> bool {
        self.min_row_id <= row_id && row_id <= self.max_row_id
    }
}
