//! Stored row layout of section instances
//!
//! Every section row carries the decoded fields plus the row id (`iidx`)
//! and UID of the record it belongs to. Core rows also carry the record
//! date; repeatable section rows carry their position on the record
//! (`lidx`, starting at 1).

use super::Row;
use crate::models::{FieldValues, Value};
use crate::schema::SectionSchema;
use chrono::NaiveDate;

/// Bookkeeping columns added to the decoded fields
pub mod columns {
    pub const ROW_ID: &str = "iidx";
    pub const INSTANCE: &str = "lidx";
    pub const DATE: &str = "date";
    pub const UID: &str = "uid";
}

/// Row of one section instance
pub fn section_row(values: &FieldValues, row_id: u64, uid: Option<&str>, instance: Option<u64>) -> Row {
    let mut row: Row = values.clone();
    row.insert(columns::ROW_ID.to_string(), Value::from(row_id));
    row.insert(columns::UID.to_string(), Value::from(uid));
    if let Some(instance) = instance {
        row.insert(columns::INSTANCE.to_string(), Value::from(instance));
    }
    row
}

/// Row of a core section, which also carries the record date
pub fn core_row(values: &FieldValues, row_id: u64, uid: Option<&str>, date: NaiveDate) -> Row {
    let mut row = section_row(values, row_id, uid, None);
    row.insert(columns::DATE.to_string(), Value::from(date));
    row
}

pub fn row_id(row: &Row) -> Option<u64> {
    row.get(columns::ROW_ID)
        .and_then(Value::as_i64)
        .and_then(|id| u64::try_from(id).ok())
}

pub fn instance(row: &Row) -> u64 {
    row.get(columns::INSTANCE)
        .and_then(Value::as_i64)
        .and_then(|id| u64::try_from(id).ok())
        .unwrap_or(0)
}

pub fn row_uid(row: &Row) -> Option<&str> {
    row.get(columns::UID).and_then(Value::as_text)
}

pub fn row_date(row: &Row) -> Option<NaiveDate> {
    row.get(columns::DATE).and_then(Value::as_date)
}

/// Decoded fields of a stored row; fields the row lacks read as missing
pub fn row_values(schema: &SectionSchema, row: &Row) -> FieldValues {
    schema
        .fields()
        .iter()
        .map(|field| {
            let value = row.get(field.name).cloned().unwrap_or_default();
            (field.name.to_string(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SchemaRegistry, SectionKind};

    #[test]
    fn test_core_row_round_trip() {
        let schema = SchemaRegistry::global().schema(SectionKind::CoreLocation);
        let date = NaiveDate::from_ymd_opt(1950, 1, 2).unwrap();
        let mut values = FieldValues::new();
        values.insert("yr".to_string(), Value::Integer(1950));
        values.insert("id".to_string(), Value::from("SHIP"));

        let row = core_row(&values, 12, Some("AB1234"), date);
        assert_eq!(row_id(&row), Some(12));
        assert_eq!(row_uid(&row), Some("AB1234"));
        assert_eq!(row_date(&row), Some(date));
        assert_eq!(instance(&row), 0);

        let back = row_values(schema, &row);
        assert_eq!(back.get("yr"), Some(&Value::Integer(1950)));
        assert!(back.get("mo").is_some_and(Value::is_missing));
        assert!(!back.contains_key("iidx"));
    }

    #[test]
    fn test_repeatable_row_keeps_instance() {
        let row = section_row(&FieldValues::new(), 3, None, Some(2));
        assert_eq!(instance(&row), 2);
        assert_eq!(row_uid(&row), None);
        assert!(row.get("uid").is_some_and(Value::is_missing));
    }
}
