//! Fixed-width line encoding
//!
//! Writes a composite record as one primary line holding every singular
//! section in canonical order, followed by one continuation line per
//! repeatable section. Continuation lines start with the record's UID
//! attachment so they can be bound back to the primary line.

use super::field_parsers::format_positional_value;
use crate::constants::{ATTC_POSITION, CORE_LOCATION_WIDTH};
use crate::derived::{base36_decode, base36_encode};
use crate::error::{Error, Result};
use crate::models::{CompositeRecord, FieldValues, Value};
use crate::schema::{RecordFormat, SchemaRegistry, SectionKind, SectionSchema};
use tracing::debug;

/// Attribute count stored in the record's core location section
pub fn attc_baseline(record: &CompositeRecord) -> Option<u64> {
    record
        .value(SectionKind::CoreLocation, "attc")
        .as_text()
        .and_then(|text| base36_decode(text).ok())
}

/// Encode a record against the attribute count it was read with
pub fn encode_record(
    registry: &SchemaRegistry,
    record: &CompositeRecord,
    baseline: Option<u64>,
) -> Result<Vec<String>> {
    if !record.has_section(SectionKind::CoreLocation) {
        return Err(Error::malformed_record(format!(
            "{}: record has no core location section",
            record.date
        )));
    }

    let mut primary = String::new();
    let mut continuation_sections = Vec::new();
    let mut attc: u64 = 0;
    let has_attachments = record.sections.iter().any(|(kind, instances)| {
        kind.family() == RecordFormat::Positional
            && !matches!(kind, SectionKind::CoreLocation | SectionKind::CoreRegular)
            && !instances.is_empty()
    });

    for schema in registry.sections_in(RecordFormat::Positional) {
        let instances = record.instances(schema.kind);

        if schema.kind == SectionKind::CoreRegular && instances.is_empty() && has_attachments {
            // Attachments are only found after a complete core regular section
            primary.push_str(&encode_section(schema, &FieldValues::new())?);
            continue;
        }
        if instances.is_empty() {
            continue;
        }

        attc += u64::from(schema.attc_contribution) * instances.len() as u64;
        if schema.repeatable {
            continuation_sections.push(schema);
            continue;
        }
        primary.push_str(&encode_section(schema, &instances[0])?);
    }

    if baseline != Some(attc) {
        rewrite_attc(&mut primary, attc)?;
    }

    let mut lines = vec![primary];
    if !continuation_sections.is_empty() {
        let uida = record.section(SectionKind::Uida).ok_or_else(|| {
            Error::malformed_record(format!(
                "{}: repeatable sections need a UID attachment",
                record.date
            ))
        })?;
        let prefix = encode_section(registry.schema(SectionKind::Uida), uida)?;

        for schema in continuation_sections {
            let mut line = prefix.clone();
            for instance in record.instances(schema.kind) {
                line.push_str(&encode_section(schema, instance)?);
            }
            lines.push(line);
        }
    }

    debug!("Encoded {} line(s) for {} with ATTC {}", lines.len(), record.date, attc);
    Ok(lines)
}

/// Encode one section instance including its code and length header
pub fn encode_section(schema: &SectionSchema, values: &FieldValues) -> Result<String> {
    let mut out = String::new();
    if let Some(code) = schema.code {
        out.push_str(code);
        out.push_str(&schema.length_code());
    }
    for field in schema.fields() {
        let value = values.get(field.name).unwrap_or(&Value::Missing);
        out.push_str(&format_positional_value(schema, field, value)?);
    }
    Ok(out)
}

/// Overwrite the single-character attribute count of a primary line
pub fn rewrite_attc(line: &mut String, attc: u64) -> Result<()> {
    let digit = base36_encode(attc);
    if digit.len() != 1 {
        return Err(Error::field_overflow(
            SectionKind::CoreLocation.table_name(),
            "attc",
            digit,
            1,
        ));
    }
    if line.len() < CORE_LOCATION_WIDTH || !line.is_char_boundary(ATTC_POSITION) {
        return Err(Error::malformed_record("primary line shorter than the core location section"));
    }
    line.replace_range(ATTC_POSITION..ATTC_POSITION + 1, &digit);
    Ok(())
}
