//! Fixed-width line decoding
//!
//! A primary line starts with the core location section followed by the
//! core regular section; attachments follow, each introduced by its
//! two-character code and two-character length. Standalone attachment
//! lines carry only attachments after their UID prefix.

use super::field_parsers::{parse_positional_value, record_date, slice_field};
use crate::constants::MIN_SECTION_REMAINDER;
use crate::error::{Error, Result};
use crate::header::{AttachmentHeader, LineHeader};
use crate::models::{AttachmentLine, CompositeRecord, DecodedLine, FieldValues, SectionMap};
use crate::schema::{SchemaRegistry, SectionKind, SectionSchema};
use tracing::debug;

/// Decode one positional line of either kind
pub fn decode_line(
    registry: &SchemaRegistry,
    line: &str,
    lead_uid: bool,
    float_values: bool,
) -> Result<DecodedLine> {
    match LineHeader::detect(line, lead_uid)? {
        LineHeader::Primary => decode_primary(registry, line, float_values).map(DecodedLine::Primary),
        LineHeader::Attachment(header) => {
            decode_attachment(registry, line, &header, float_values).map(DecodedLine::Attachment)
        }
    }
}

/// Decode a line carrying the core sections
pub fn decode_primary(registry: &SchemaRegistry, line: &str, float_values: bool) -> Result<CompositeRecord> {
    let line = line.trim_end_matches(['\n', '\r']);
    if line.len() < MIN_SECTION_REMAINDER {
        return Err(Error::malformed_record(format!("line too short: '{}'", line)));
    }

    let mut sections = SectionMap::new();
    let mut offset = 0;

    for kind in [SectionKind::CoreLocation, SectionKind::CoreRegular] {
        if line.len().saturating_sub(offset) < MIN_SECTION_REMAINDER {
            break;
        }
        let schema = registry.schema(kind);
        let values = decode_section(schema, line, offset, float_values)?;
        sections.insert(kind, vec![values]);
        offset += schema.width();
    }

    decode_attachments(registry, line, offset, float_values, &mut sections)?;

    let core = sections
        .get(&SectionKind::CoreLocation)
        .and_then(|instances| instances.first())
        .ok_or_else(|| Error::malformed_record("missing core location section"))?;
    let date = record_date(
        field_int(core, "yr"),
        field_int(core, "mo"),
        field_int(core, "dy"),
    )?;

    let uid = sections
        .get(&SectionKind::Uida)
        .and_then(|instances| instances.first())
        .and_then(|uida| uida.get("uid"))
        .and_then(|v| v.as_text())
        .map(str::to_string);

    debug!(
        "Decoded primary line for {} with {} sections",
        date,
        sections.len()
    );

    Ok(CompositeRecord { uid, date, sections })
}

/// Decode the attachments of a standalone attachment line
pub fn decode_attachment(
    registry: &SchemaRegistry,
    line: &str,
    header: &AttachmentHeader,
    float_values: bool,
) -> Result<AttachmentLine> {
    let line = line.trim_end_matches(['\n', '\r']);
    let mut sections = SectionMap::new();
    decode_attachments(registry, line, header.payload_offset, float_values, &mut sections)?;

    if sections.is_empty() {
        return Err(Error::malformed_record(format!(
            "attachment line for UID {} carries no attachments",
            header.uid
        )));
    }

    Ok(AttachmentLine {
        uid: header.uid.clone(),
        sections,
    })
}

/// Consume attachments from `offset` while at least four bytes remain
fn decode_attachments(
    registry: &SchemaRegistry,
    line: &str,
    mut offset: usize,
    float_values: bool,
    sections: &mut SectionMap,
) -> Result<()> {
    while line.len().saturating_sub(offset) >= MIN_SECTION_REMAINDER {
        let code = slice_field(line, offset, 2)?;
        let kind = registry
            .kind_for_code(code)
            .ok_or_else(|| Error::malformed_record(format!("unknown section code '{}' at {}", code, offset)))?;
        let schema = registry.schema(kind);

        if !schema.repeatable && sections.contains_key(&kind) {
            return Err(Error::malformed_record(format!(
                "section '{}' repeated on one line",
                schema.name()
            )));
        }

        let values = decode_section(schema, line, offset, float_values)?;
        sections.entry(kind).or_default().push(values);

        if schema.is_variable_width() {
            break;
        }
        offset += schema.width();
    }
    Ok(())
}

/// Extract every field of one section instance starting at `start`
fn decode_section(
    schema: &SectionSchema,
    line: &str,
    start: usize,
    float_values: bool,
) -> Result<FieldValues> {
    schema
        .fields()
        .iter()
        .map(|field| {
            let offset = start + field.offset.unwrap_or(0);
            let raw = slice_field(line, offset, field.width)?;
            let value = parse_positional_value(schema, field, raw, float_values)?;
            Ok((field.name.to_string(), value))
        })
        .collect()
}

fn field_int(values: &FieldValues, name: &str) -> Option<i64> {
    values.get(name).and_then(|v| v.as_i64())
}
