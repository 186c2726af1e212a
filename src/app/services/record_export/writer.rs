//! Re-encoding and counting the records of a date

use super::RecordExporter;
use crate::app::services::record_store::rows::row_id;
use crate::app::services::record_store::RecordStore;
use crate::error::{Error, Result};
use crate::models::{CompositeRecord, SectionCounts};
use crate::schema::RecordFormat;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::Write;
use tracing::{debug, info};

/// What one export wrote
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub records: usize,
    /// Reports dropped by trimming
    pub rejected: usize,
    pub lines: usize,
    /// Section instances written
    pub sections: SectionCounts,
}

impl RecordExporter {
    /// Encode the records of a date.
    ///
    /// Repeatable sections are only written when `include_repeatable` is
    /// set; the attribute count of each primary line always matches the
    /// attachments actually written.
    pub fn encode_records_for_date(
        &self,
        store: &dyn RecordStore,
        date: NaiveDate,
        include_repeatable: bool,
    ) -> Result<(Vec<String>, ExportSummary)> {
        if self.trimming.is_some() && self.format == RecordFormat::Delimited {
            return Err(Error::configuration(
                "trimming needs the ICOADS flags of the positional format",
            ));
        }

        let registry = self.codec.registry();
        let mut summary = ExportSummary::default();
        let mut lines = Vec::new();

        for mut record in self.records_for_date(store, date)? {
            if let Some(engine) = &self.trimming {
                if !engine.apply(&mut record)? {
                    summary.rejected += 1;
                    continue;
                }
            }
            if !include_repeatable {
                record
                    .sections
                    .retain(|kind, _| !registry.schema(*kind).repeatable);
            }

            let encoded = self.encode_one(&record)?;
            for (kind, count) in record.section_counts() {
                *summary.sections.entry(kind).or_insert(0) += count;
            }
            summary.records += 1;
            summary.lines += encoded.len();
            lines.extend(encoded);
        }

        debug!(
            "{}: encoded {} records into {} lines ({} rejected)",
            date, summary.records, summary.lines, summary.rejected
        );
        Ok((lines, summary))
    }

    fn encode_one(&self, record: &CompositeRecord) -> Result<Vec<String>> {
        match self.format {
            RecordFormat::Positional => self.codec.encode(record),
            RecordFormat::Delimited => Ok(vec![self.codec.encode_delimited(record)?]),
        }
    }

    /// Write the records of a date, one line per row plus continuation lines
    pub fn write_records_for_date<W: Write>(
        &self,
        store: &dyn RecordStore,
        date: NaiveDate,
        include_repeatable: bool,
        out: &mut W,
    ) -> Result<ExportSummary> {
        let (lines, summary) = self.encode_records_for_date(store, date, include_repeatable)?;
        for line in &lines {
            writeln!(out, "{}", line)?;
        }
        info!("{}: {} records written", date, summary.records);
        Ok(summary)
    }

    /// Rows per section stored for the records of a date; empty when the date holds none
    pub fn count_records_for_date(
        &self,
        store: &dyn RecordStore,
        date: NaiveDate,
        include_repeatable: bool,
    ) -> Result<SectionCounts> {
        let registry = self.codec.registry();
        let partition = self.shards().resolve_partition(store, date)?;
        let core = self.read_core_for_date(store, date)?;

        let mut counts = SectionCounts::new();
        if core.is_empty() {
            return Ok(counts);
        }
        counts.insert(self.core_kind(), core.len() as u64);

        let ids: BTreeSet<u64> = core.iter().filter_map(row_id).collect();
        for section in self.shards().partition_sections(store, partition)? {
            if section == self.core_kind() || section.family() != self.format {
                continue;
            }
            if !include_repeatable && registry.schema(section).repeatable {
                continue;
            }
            let rows = self.section_rows(store, section, partition, &ids)?;
            if !rows.is_empty() {
                counts.insert(section, rows.len() as u64);
            }
        }
        Ok(counts)
    }
}
