//! Ingestion pipeline.
//!
//! Reads input lines one at a time, decodes them, assigns every primary
//! record its row id and binds standalone attachment lines to the row their
//! UID names. Rows are buffered per record date; a batch is flushed into
//! the `{section}_{tidx}` partition tables whenever the date changes and at
//! the end of every input file, together with the inventory record, the
//! section counts and the UID lookup entries of the batch.

use crate::app::services::record_codec::{DecodeStats, RecordCodec};
use crate::app::services::record_store::rows::{core_row, row_id as stored_row_id, section_row};
use crate::app::services::record_store::{partition_table, Predicate, RecordStore, Row};
use crate::app::services::shard_manager::{IngestionContext, RowKey, ShardManager};
use crate::config::ProcessorConfig;
use crate::error::{Error, Result};
use crate::models::{AttachmentLine, CompositeRecord, DecodedLine, SectionCounts, SectionMap};
use crate::schema::{SchemaRegistry, SectionKind};

use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs;
use tracing::{debug, error, info, warn};

/// Outcome of an ingestion run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestSummary {
    pub stats: DecodeStats,
    pub files_processed: usize,
    /// Batches flushed to the store
    pub batches: usize,
    /// Rows written per section
    pub rows_written: SectionCounts,
    /// Attachment rows skipped because their parent row already held them
    pub existing_skipped: usize,
    pub processing_time_ms: u128,
}

type SectionRows = BTreeMap<SectionKind, Vec<Row>>;

/// Rows of one record date waiting for the batch flush
#[derive(Debug)]
struct PendingBatch {
    date: NaiveDate,
    records: u64,
    rows: SectionRows,
    uids: Vec<(String, u64)>,
    /// UIDs of this batch, so continuation lines bind before the flush registers them
    row_by_uid: HashMap<String, u64>,
}

impl PendingBatch {
    fn new(date: NaiveDate) -> Self {
        Self {
            date,
            records: 0,
            rows: SectionRows::new(),
            uids: Vec::new(),
            row_by_uid: HashMap::new(),
        }
    }

    fn push_record(&mut self, registry: &SchemaRegistry, record: &CompositeRecord, row_id: u64) {
        let uid = record.uid.as_deref();
        for (kind, instances) in &record.sections {
            let schema = registry.schema(*kind);
            let rows = self.rows.entry(*kind).or_default();
            for (i, values) in instances.iter().enumerate() {
                let row = if kind.is_core() {
                    core_row(values, row_id, uid, record.date)
                } else if schema.repeatable {
                    section_row(values, row_id, uid, Some(i as u64 + 1))
                } else {
                    section_row(values, row_id, uid, None)
                };
                rows.push(row);
            }
        }

        if let (Some(uid), true) = (uid, record.has_section(SectionKind::Uida)) {
            self.uids.push((uid.to_string(), row_id));
            self.row_by_uid.insert(uid.to_string(), row_id);
        }
        self.records += 1;
    }

    /// Attach the sections of a continuation line to a record of this batch
    fn push_sections(&mut self, registry: &SchemaRegistry, uid: &str, sections: &SectionMap, row_id: u64) {
        for (kind, instances) in sections {
            let schema = registry.schema(*kind);
            let rows = self.rows.entry(*kind).or_default();
            let mut instance = rows
                .iter()
                .filter(|row| stored_row_id(row) == Some(row_id))
                .count() as u64;
            for values in instances {
                instance += 1;
                rows.push(section_row(values, row_id, Some(uid), schema.repeatable.then_some(instance)));
            }
        }
    }

    fn counts(rows: &SectionRows) -> SectionCounts {
        rows.iter()
            .map(|(kind, rows)| (*kind, rows.len() as u64))
            .collect()
    }
}

/// Line-at-a-time ingestion into a record store
pub struct IngestProcessor<'s> {
    config: ProcessorConfig,
    codec: RecordCodec<'static>,
    shards: ShardManager,
    store: &'s mut dyn RecordStore,
    ctx: IngestionContext,
    batch: Option<PendingBatch>,
    /// Rows bound to stored records, keyed by their partition and date
    attachments: BTreeMap<(u32, NaiveDate), SectionRows>,
    summary: IngestSummary,
}

impl<'s> IngestProcessor<'s> {
    /// Create a processor over a store; the configuration is validated first
    pub fn new(store: &'s mut dyn RecordStore, config: ProcessorConfig) -> Result<Self> {
        config.validate()?;
        let codec = RecordCodec::new()
            .with_float_values(config.float_values)
            .with_lead_uid(config.lead_uid);
        let shards = ShardManager::new(config.partition_capacity)?;

        Ok(Self {
            config,
            codec,
            shards,
            store,
            ctx: IngestionContext::new(),
            batch: None,
            attachments: BTreeMap::new(),
            summary: IngestSummary::default(),
        })
    }

    pub fn context(&self) -> &IngestionContext {
        &self.ctx
    }

    pub fn summary(&self) -> &IngestSummary {
        &self.summary
    }

    /// Close the open batch and name the input the following lines come from
    pub fn start_source(&mut self, source_name: &str) -> Result<()> {
        self.flush()?;
        self.ctx.source_name = source_name.to_string();
        debug!("Reading {}", source_name);
        Ok(())
    }

    /// Decode and ingest one line.
    ///
    /// Recoverable errors skip the line and are counted; fatal errors abort
    /// the run.
    pub fn process_line(&mut self, line: &str) -> Result<()> {
        let line = line.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            return Ok(());
        }

        let outcome = self
            .codec
            .decode(line, self.config.input_format)
            .and_then(|decoded| {
                match &decoded {
                    DecodedLine::Primary(record) => self.ingest_record(record)?,
                    DecodedLine::Attachment(attachment) => self.ingest_attachment(attachment)?,
                }
                Ok(decoded)
            });

        match outcome {
            Ok(decoded) => {
                self.summary.stats.record(&decoded);
                Ok(())
            }
            Err(e) if !e.is_fatal() => {
                warn!("Skipping line: {}", e);
                self.summary.stats.skip(&e);
                Ok(())
            }
            Err(e) => {
                error!("Aborting ingestion: {}", e);
                Err(e)
            }
        }
    }

    /// Ingest every line of a text
    pub fn process_text(&mut self, text: &str) -> Result<()> {
        for line in text.lines() {
            self.process_line(line)?;
        }
        Ok(())
    }

    /// Ingest every line of raw file content.
    ///
    /// Lines are decoded as UTF-8 one at a time; a line that is not valid
    /// UTF-8 is a malformed record and is skipped like any other.
    pub fn process_bytes(&mut self, content: &[u8]) -> Result<()> {
        for (index, raw) in content.split(|&b| b == b'\n').enumerate() {
            match std::str::from_utf8(raw) {
                Ok(line) => self.process_line(line)?,
                Err(e) => {
                    let err = Error::malformed_record(format!(
                        "{} line {}: invalid UTF-8: {}",
                        self.ctx.source_name,
                        index + 1,
                        e
                    ));
                    warn!("Skipping line: {}", err);
                    self.summary.stats.skip(&err);
                }
            }
        }
        Ok(())
    }

    fn ingest_record(&mut self, record: &CompositeRecord) -> Result<()> {
        self.open_batch(record.date)?;
        let location = self
            .shards
            .assign_next(&*self.store, &mut self.ctx, RowKey::Sequential)?;

        let registry = self.codec.registry();
        let batch = self
            .batch
            .as_mut()
            .ok_or_else(|| Error::configuration("no open batch"))?;
        batch.push_record(registry, record, location.row_id);
        Ok(())
    }

    fn ingest_attachment(&mut self, attachment: &AttachmentLine) -> Result<()> {
        let registry = self.codec.registry();

        if let Some(batch) = self.batch.as_mut() {
            if let Some(&row_id) = batch.row_by_uid.get(&attachment.uid) {
                batch.push_sections(registry, &attachment.uid, &attachment.sections, row_id);
                return Ok(());
            }
        }

        let location = self
            .shards
            .assign_next(&*self.store, &mut self.ctx, RowKey::Indexed(&attachment.uid))?;
        let date = self
            .ctx
            .binding
            .as_ref()
            .map(|binding| binding.date)
            .ok_or_else(|| Error::missing_uid(attachment.uid.as_str(), "lookup did not bind a row"))?;

        let mut bound = SectionRows::new();
        for (kind, instances) in &attachment.sections {
            let schema = registry.schema(*kind);
            let table = partition_table(kind.table_name(), location.partition_id);
            let pending_rows: &[Row] = self
                .attachments
                .get(&(location.partition_id, date))
                .and_then(|rows| rows.get(kind))
                .map_or(&[], Vec::as_slice);
            let pending = pending_rows
                .iter()
                .filter(|row| stored_row_id(row) == Some(location.row_id))
                .count();
            let stored = if self.store.table_exists(&table) {
                self.store
                    .count(&table, &Predicate::all().eq("iidx", location.row_id))?
            } else {
                0
            };
            let mut instance = (stored + pending) as u64;

            for values in instances {
                if self.config.check_existing
                    && (self
                        .shards
                        .attachment_pending(pending_rows, location.row_id, schema, values)
                        || self
                            .shards
                            .attachment_exists(&*self.store, location, schema, values)?)
                {
                    debug!(
                        "{}: {} already on row {}",
                        attachment.uid,
                        kind,
                        location.row_id
                    );
                    self.summary.existing_skipped += 1;
                    continue;
                }
                instance += 1;
                bound.entry(*kind).or_default().push(section_row(
                    values,
                    location.row_id,
                    Some(&attachment.uid),
                    schema.repeatable.then_some(instance),
                ));
            }
        }

        let target = self
            .attachments
            .entry((location.partition_id, date))
            .or_default();
        for (kind, rows) in bound {
            target.entry(kind).or_default().extend(rows);
        }
        Ok(())
    }

    /// Make sure the open batch is the one of `date`
    fn open_batch(&mut self, date: NaiveDate) -> Result<()> {
        if self.batch.as_ref().is_some_and(|batch| batch.date == date) {
            return Ok(());
        }
        self.flush()?;

        if self.config.add_inventory {
            let source = self.ctx.source_name.clone();
            self.shards.begin_batch(&*self.store, &mut self.ctx, &source)?;
        } else {
            self.shards
                .begin_batch_for_existing_date(&*self.store, &mut self.ctx, date)?;
        }
        self.batch = Some(PendingBatch::new(date));
        Ok(())
    }

    /// Write the open batch and the bound attachment rows to the store
    pub fn flush(&mut self) -> Result<()> {
        if let Some(batch) = self.batch.take() {
            self.flush_batch(batch)?;
        }

        let attachments = std::mem::take(&mut self.attachments);
        for ((partition, date), rows) in attachments {
            self.write_rows(partition, date, rows)?;
        }
        Ok(())
    }

    fn flush_batch(&mut self, batch: PendingBatch) -> Result<()> {
        let partition = if self.config.add_inventory {
            self.shards
                .update_inventory(&mut *self.store, &mut self.ctx, batch.date, batch.records)?
                .partition_id
        } else {
            self.shards.resolve_partition(&*self.store, batch.date)?
        };

        self.write_rows(partition, batch.date, batch.rows)?;
        self.shards
            .register_uids(&mut *self.store, batch.date, partition, &batch.uids)?;
        self.summary.batches += 1;
        info!(
            "{}: {} records flushed to partition {}",
            batch.date, batch.records, partition
        );
        Ok(())
    }

    fn write_rows(&mut self, partition: u32, date: NaiveDate, rows: SectionRows) -> Result<()> {
        let counts = PendingBatch::counts(&rows);
        for (kind, rows) in rows {
            self.shards
                .write_section_rows(&mut *self.store, kind, partition, date, rows)?;
        }
        let recorded = self
            .shards
            .record_batch(&mut *self.store, date, partition, &counts)?;
        for (kind, count) in recorded {
            *self.summary.rows_written.entry(kind).or_insert(0) += count;
        }
        Ok(())
    }

    /// Ingest input files in order, one batch run per file
    pub async fn ingest_files(&mut self, files: &[PathBuf]) -> Result<()> {
        let start_time = Instant::now();
        let pb = if self.config.show_progress {
            let pb = ProgressBar::new(files.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        for file in files {
            pb.set_message(format!("Ingesting: {}", source_name(file)));
            let content = fs::read(file).await?;
            self.start_source(&source_name(file))?;
            self.process_bytes(&content)?;
            self.flush()?;
            self.summary.files_processed += 1;
            pb.inc(1);
        }

        pb.finish_with_message("All input files ingested");
        self.summary.processing_time_ms += start_time.elapsed().as_millis();
        Ok(())
    }

    /// Flush what is still pending and return the run summary
    pub fn finish(mut self) -> Result<IngestSummary> {
        self.flush()?;
        Ok(self.summary)
    }
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
