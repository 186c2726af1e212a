//! Test utilities for the export path
//!
//! Ingests a small two-day store through the ingestion pipeline so every
//! read goes through the same partition tables a real run writes.

use chrono::NaiveDate;

use crate::app::services::record_codec::tests::{core_location, core_regular, icoads, reanalysis, section_text, uida};
use crate::app::services::record_export::RecordExporter;
use crate::app::services::record_store::MemoryStore;
use crate::config::ProcessorConfig;
use crate::models::{FieldValues, Value};
use crate::processor::IngestProcessor;
use crate::schema::SectionKind;

mod reader_tests;

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(1950, 1, d).unwrap()
}

pub fn config() -> ProcessorConfig {
    ProcessorConfig::default()
        .with_add_inventory(true)
        .with_progress(false)
}

pub fn exporter() -> RecordExporter {
    RecordExporter::new(&config()).unwrap()
}

/// Core location of a report at a given day, hour and position
pub fn location(dy: i64, hr: i64, lat: i64, lon: i64) -> FieldValues {
    let mut values = core_location("2");
    values.insert("dy".to_string(), Value::Integer(dy));
    values.insert("hr".to_string(), Value::Integer(hr));
    values.insert("lat".to_string(), Value::Integer(lat));
    values.insert("lon".to_string(), Value::Integer(lon));
    values
}

/// Primary line with the ICOADS and UID attachments
pub fn primary_line(uid: &str, location: &FieldValues) -> String {
    [
        section_text(SectionKind::CoreLocation, location),
        section_text(SectionKind::CoreRegular, &core_regular()),
        section_text(SectionKind::Icoads, &icoads()),
        section_text(SectionKind::Uida, &uida(uid)),
    ]
    .concat()
}

/// Continuation line with two reanalysis feedback instances
pub fn continuation_line(uid: &str) -> String {
    [
        section_text(SectionKind::Uida, &uida(uid)),
        section_text(SectionKind::ReanalysisFeedback, &reanalysis(1, 1)),
        section_text(SectionKind::ReanalysisFeedback, &reanalysis(1, 2)),
    ]
    .concat()
}

pub fn input_lines() -> Vec<String> {
    vec![
        primary_line("AB0001", &location(15, 1200, 4512, 12050)),
        continuation_line("AB0001"),
        primary_line("AB0002", &location(15, 600, -3000, 35000)),
        primary_line("AB0003", &location(16, 1800, 1000, 500)),
    ]
}

/// Store holding two reports on 1950-01-15 and one on 1950-01-16
pub fn populated_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    let mut processor = IngestProcessor::new(&mut store, config()).unwrap();
    processor.start_source("fixture.imma").unwrap();
    for line in input_lines() {
        processor.process_line(&line).unwrap();
    }
    processor.finish().unwrap();
    store
}
