//! Comma-delimited variant
//!
//! Each line holds 41 columns. Column 0 is the composite UID: a 12-digit
//! timestamp followed by a 7-character observation number. Every field of
//! the four delimited sections is read from its source column, optionally
//! from a byte range within it.

use super::field_parsers::{format_delimited_value, parse_delimited_value, record_date};
use crate::constants::{DELIMITED_FIELD_COUNT, DELIMITER};
use crate::error::{Error, Result};
use crate::models::{CompositeRecord, FieldValues, SectionMap};
use crate::schema::{RecordFormat, SchemaRegistry, SectionKind};
use tracing::{debug, warn};

/// Decode one delimited line into a record holding the four delimited sections
pub fn decode_delimited(registry: &SchemaRegistry, line: &str, float_values: bool) -> Result<CompositeRecord> {
    let line = line.trim_end_matches(['\n', '\r']);
    let columns: Vec<&str> = line.split(DELIMITER).collect();

    if columns.len() < DELIMITED_FIELD_COUNT {
        return Err(Error::malformed_record(format!(
            "expected {} delimited fields, found {}",
            DELIMITED_FIELD_COUNT,
            columns.len()
        )));
    }
    if columns.len() > DELIMITED_FIELD_COUNT {
        debug!(
            "Ignoring {} trailing columns",
            columns.len() - DELIMITED_FIELD_COUNT
        );
    }

    let mut sections = SectionMap::new();
    for schema in registry.sections_in(RecordFormat::Delimited) {
        let mut values = FieldValues::new();
        for field in schema.fields() {
            let column = field
                .source_column
                .and_then(|index| columns.get(index))
                .ok_or_else(|| {
                    Error::schema_lookup(format!(
                        "{}.{} has no source column",
                        schema.name(),
                        field.name
                    ))
                })?;
            let value = parse_delimited_value(schema, field, column, float_values)?;
            values.insert(field.name.to_string(), value);
        }
        sections.insert(schema.kind, vec![values]);
    }

    let meta = sections
        .get(&SectionKind::IspdMeta)
        .and_then(|instances| instances.first())
        .ok_or_else(|| Error::malformed_record("missing delimited meta section"))?;

    let int = |name: &str| meta.get(name).and_then(|v| v.as_i64());
    let date = record_date(int("year"), int("month"), int("day"))?;

    let uid = meta.get("uid").and_then(|v| v.as_text()).map(str::to_string);
    if uid.is_none() {
        warn!("{}: record without UID, assigning sequentially", date);
    }

    Ok(CompositeRecord { uid, date, sections })
}

/// Rebuild the 41 columns of a record holding the delimited sections.
///
/// Columns are filled from whole-column fields only; fields that address a
/// byte range inside a column are derived from it and not written again.
pub fn encode_delimited(registry: &SchemaRegistry, record: &CompositeRecord) -> Result<String> {
    let mut columns = vec![String::new(); DELIMITED_FIELD_COUNT];

    for schema in registry.sections_in(RecordFormat::Delimited) {
        let values = record.section(schema.kind);
        for field in schema.fields().iter().filter(|f| f.offset.is_none()) {
            let Some(index) = field.source_column else {
                continue;
            };
            let value = values
                .and_then(|v| v.get(field.name))
                .cloned()
                .unwrap_or_default();
            if let Some(column) = columns.get_mut(index) {
                *column = format_delimited_value(field, &value);
            }
        }
    }

    Ok(columns.join(&DELIMITER.to_string()))
}
