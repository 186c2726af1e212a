//! Read and export path
//!
//! Rebuilds composite records of a date from the partition tables the
//! ingestion pipeline wrote, optionally trims them, and re-encodes them as
//! fixed-width lines (ATTC rewritten to the attachments actually written,
//! repeatable sections on continuation lines) or as delimited lines. Also
//! counts, matches, finds and patches stored rows.
//!
//! ## Architecture
//!
//! - [`reader`] - Core and section rows of a date or UID, record rebuilding
//! - [`writer`] - Re-encoding and per-section counts of a date
//! - [`lookup`] - Field patches, time/space matching and duplicate lookup

pub mod lookup;
pub mod reader;
pub mod writer;

#[cfg(test)]
pub mod tests;

pub use lookup::MatchWindow;

use crate::app::services::quality_control::TrimmingEngine;
use crate::app::services::record_codec::RecordCodec;
use crate::app::services::shard_manager::ShardManager;
use crate::config::ProcessorConfig;
use crate::error::Result;
use crate::schema::{RecordFormat, SectionKind};

/// Reader and writer of stored records for one layout family
#[derive(Debug, Clone, Copy)]
pub struct RecordExporter {
    codec: RecordCodec<'static>,
    shards: ShardManager,
    format: RecordFormat,
    trimming: Option<TrimmingEngine>,
}

impl RecordExporter {
    pub fn new(config: &ProcessorConfig) -> Result<Self> {
        Ok(Self {
            codec: RecordCodec::new()
                .with_float_values(config.float_values)
                .with_lead_uid(config.lead_uid),
            shards: ShardManager::new(config.partition_capacity)?,
            format: config.input_format,
            trimming: None,
        })
    }

    /// Trim every exported record with the given engine
    pub fn with_trimming(mut self, engine: TrimmingEngine) -> Self {
        self.trimming = Some(engine);
        self
    }

    pub fn format(&self) -> RecordFormat {
        self.format
    }

    /// Section holding the date and position of a record
    pub fn core_kind(&self) -> SectionKind {
        match self.format {
            RecordFormat::Positional => SectionKind::CoreLocation,
            RecordFormat::Delimited => SectionKind::IspdMeta,
        }
    }

    pub(crate) fn shards(&self) -> &ShardManager {
        &self.shards
    }
}
