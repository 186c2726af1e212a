//! Record codec for the fixed-width composite format and its delimited variant
//!
//! Translates between physical lines and [`CompositeRecord`]s using the
//! field schema registry. Decoding never guesses: an unknown section code,
//! a non-numeric numeric field or a short delimited line is a
//! `MalformedRecord` error for that one line. Encoding pads every field to
//! its exact width and refuses values that do not fit.
//!
//! ## Architecture
//!
//! - [`positional`] - Primary and standalone attachment line decoding
//! - [`delimited`] - 41-column delimited variant
//! - [`encoder`] - Primary and continuation line encoding with ATTC rewrite
//! - [`field_parsers`] - Per-field parse/format helpers and record dates
//! - [`conversion`] - Raw integer / real value conversion of whole records
//! - [`stats`] - Decoding statistics
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ispd_processor::app::services::record_codec::RecordCodec;
//! use ispd_processor::models::DecodedLine;
//!
//! # fn example(line: &str) -> ispd_processor::error::Result<()> {
//! let codec = RecordCodec::new();
//! if let DecodedLine::Primary(record) = codec.decode_positional(line)? {
//!     let lines = codec.encode(&record)?;
//!     assert_eq!(lines[0], line);
//! }
//! # Ok(())
//! # }
//! ```

pub mod conversion;
pub mod delimited;
pub mod encoder;
pub mod field_parsers;
pub mod positional;
pub mod stats;

#[cfg(test)]
pub mod tests;

pub use field_parsers::record_date;
pub use stats::DecodeStats;

use crate::error::{Error, Result};
use crate::header::LineHeader;
use crate::models::{AttachmentLine, CompositeRecord, DecodedLine};
use crate::schema::{RecordFormat, SchemaRegistry};

/// Line codec bound to a schema registry and decoding options.
#[derive(Debug, Clone, Copy)]
pub struct RecordCodec<'a> {
    registry: &'a SchemaRegistry,
    float_values: bool,
    lead_uid: bool,
}

impl Default for RecordCodec<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordCodec<'static> {
    /// Codec over the process-wide registry
    pub fn new() -> Self {
        Self::with_registry(SchemaRegistry::global())
    }
}

impl<'a> RecordCodec<'a> {
    pub fn with_registry(registry: &'a SchemaRegistry) -> Self {
        Self {
            registry,
            float_values: false,
            lead_uid: false,
        }
    }

    /// Decode scaled fields to real values
    pub fn with_float_values(mut self, float_values: bool) -> Self {
        self.float_values = float_values;
        self
    }

    /// Treat standalone attachment lines as prefixed by a bare UID
    pub fn with_lead_uid(mut self, lead_uid: bool) -> Self {
        self.lead_uid = lead_uid;
        self
    }

    pub fn registry(&self) -> &'a SchemaRegistry {
        self.registry
    }

    /// Decode one line of the given layout
    pub fn decode(&self, line: &str, format: RecordFormat) -> Result<DecodedLine> {
        match format {
            RecordFormat::Positional => self.decode_positional(line),
            RecordFormat::Delimited => self.decode_delimited(line).map(DecodedLine::Primary),
        }
    }

    pub fn decode_positional(&self, line: &str) -> Result<DecodedLine> {
        positional::decode_line(self.registry, line, self.lead_uid, self.float_values)
    }

    pub fn decode_delimited(&self, line: &str) -> Result<CompositeRecord> {
        delimited::decode_delimited(self.registry, line, self.float_values)
    }

    /// Decode a primary line followed by its continuation lines into one record
    pub fn decode_lines<S: AsRef<str>>(&self, lines: &[S]) -> Result<CompositeRecord> {
        let (first, rest) = lines
            .split_first()
            .ok_or_else(|| Error::malformed_record("no lines to decode"))?;

        let mut record = match self.decode_positional(first.as_ref())? {
            DecodedLine::Primary(record) => record,
            DecodedLine::Attachment(line) => {
                return Err(Error::malformed_record(format!(
                    "record starts with an attachment line for UID {}",
                    line.uid
                )));
            }
        };

        for line in rest {
            let header = LineHeader::detect(line.as_ref(), false)?;
            let LineHeader::Attachment(header) = header else {
                return Err(Error::malformed_record("continuation line without UID attachment"));
            };
            let attachment =
                positional::decode_attachment(self.registry, line.as_ref(), &header, self.float_values)?;
            merge_attachment(&mut record, attachment)?;
        }

        Ok(record)
    }

    /// Encode a record; the ATTC baseline is the count stored in the record itself
    pub fn encode(&self, record: &CompositeRecord) -> Result<Vec<String>> {
        encoder::encode_record(self.registry, record, encoder::attc_baseline(record))
    }

    /// Encode a record against an explicit ATTC baseline
    pub fn encode_with_baseline(&self, record: &CompositeRecord, baseline: Option<u64>) -> Result<Vec<String>> {
        encoder::encode_record(self.registry, record, baseline)
    }

    pub fn encode_delimited(&self, record: &CompositeRecord) -> Result<String> {
        delimited::encode_delimited(self.registry, record)
    }

    pub fn float_record(&self, record: &mut CompositeRecord) {
        conversion::float_record(self.registry, record);
    }

    pub fn integer_record(&self, record: &mut CompositeRecord) {
        conversion::integer_record(self.registry, record);
    }
}

/// Append the sections of an attachment line to the record it names
pub fn merge_attachment(record: &mut CompositeRecord, attachment: AttachmentLine) -> Result<()> {
    if let Some(uid) = &record.uid {
        if *uid != attachment.uid {
            return Err(Error::missing_uid(
                attachment.uid,
                format!("continuation line does not belong to record {}", uid),
            ));
        }
    }
    for (kind, instances) in attachment.sections {
        for values in instances {
            record.push_instance(kind, values);
        }
    }
    Ok(())
}
