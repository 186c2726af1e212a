//! Integration tests for the ingest and export workflow
//!
//! Writes fixed-width input files to a temporary directory, ingests them
//! through the public processor API, saves and reloads the store snapshot
//! and checks that the export path gives the same lines back.

use chrono::NaiveDate;
use ispd_processor::app::services::record_store::MemoryStore;
use ispd_processor::{
    CompositeRecord, FieldValues, IngestProcessor, ProcessorConfig, RecordCodec, RecordExporter,
    SectionKind, Value,
};
use std::path::PathBuf;
use tempfile::TempDir;

fn values(pairs: &[(&str, Value)]) -> FieldValues {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(1950, 1, day).unwrap()
}

/// Report with ICOADS flags, a UID and `feedback` reanalysis instances
fn report(uid: &str, day: u32, hour: i64, lat: i64, lon: i64, feedback: i64) -> CompositeRecord {
    let mut record = CompositeRecord::new(date(day));
    record.uid = Some(uid.to_string());
    record.set_section(
        SectionKind::CoreLocation,
        values(&[
            ("yr", Value::Integer(1950)),
            ("mo", Value::Integer(1)),
            ("dy", Value::Integer(i64::from(day))),
            ("hr", Value::Integer(hour)),
            ("lat", Value::Integer(lat)),
            ("lon", Value::Integer(lon)),
            ("im", Value::Integer(1)),
            ("ii", Value::Integer(10)),
            ("id", Value::from("SHIPNAME")),
        ]),
    );
    record.set_section(
        SectionKind::CoreRegular,
        values(&[
            ("slp", Value::Integer(10128)),
            ("at", Value::Integer(125)),
            ("sst", Value::Integer(140)),
        ]),
    );
    record.set_section(
        SectionKind::Icoads,
        values(&[
            ("b10", Value::Integer(283)),
            ("dck", Value::Integer(927)),
            ("sid", Value::Integer(25)),
            ("pt", Value::Integer(5)),
            ("dups", Value::Integer(0)),
            ("nd", Value::Integer(2)),
            ("trms", Value::from("253121")),
            ("nqcs", Value::from("11111111111111")),
        ]),
    );
    record.set_section(
        SectionKind::Uida,
        values(&[("uid", Value::from(uid)), ("rn1", Value::from("0")), ("irf", Value::Integer(1))]),
    );
    for fnr in 1..=feedback {
        record.push_instance(
            SectionKind::ReanalysisFeedback,
            values(&[
                ("icnr", Value::Integer(1)),
                ("fnr", Value::Integer(fnr)),
                ("dpro", Value::Integer(1)),
                ("mfgr", Value::Integer(101250)),
            ]),
        );
    }
    record
}

struct Fixture {
    _temp: TempDir,
    primaries: PathBuf,
    feedback: PathBuf,
    store_path: PathBuf,
    /// Every line of the day-15 reports as an export with repeatables writes them
    day15_lines: Vec<String>,
}

fn fixture() -> Fixture {
    let temp = TempDir::new().unwrap();
    let codec = RecordCodec::new();

    let first = codec.encode(&report("AB0001", 15, 1200, 4512, 12050, 2)).unwrap();
    let second = codec.encode(&report("AB0002", 15, 600, -3000, 35000, 0)).unwrap();
    let third = codec.encode(&report("CD0001", 16, 1800, 1000, 500, 0)).unwrap();
    assert_eq!(first.len(), 2);

    let primaries = temp.path().join("1950-01.imma");
    std::fs::write(&primaries, format!("{}\n{}\n{}\n", first[0], second[0], third[0])).unwrap();
    let feedback = temp.path().join("1950-01-feedback.imma");
    std::fs::write(&feedback, format!("{}\n", first[1])).unwrap();

    Fixture {
        store_path: temp.path().join("store").join("snapshot.json"),
        primaries,
        feedback,
        day15_lines: vec![first[0].clone(), first[1].clone(), second[0].clone()],
        _temp: temp,
    }
}

fn config() -> ProcessorConfig {
    ProcessorConfig::default()
        .with_add_inventory(true)
        .with_check_existing(true)
        .with_progress(false)
}

#[tokio::test]
async fn test_ingest_save_reload_and_export() {
    let fixture = fixture();

    let mut store = MemoryStore::load(&fixture.store_path).unwrap();
    let summary = {
        let mut processor = IngestProcessor::new(&mut store, config()).unwrap();
        processor
            .ingest_files(&[fixture.primaries.clone(), fixture.feedback.clone()])
            .await
            .unwrap();
        processor.finish().unwrap()
    };
    assert_eq!(summary.files_processed, 2);
    assert_eq!(summary.stats.records_decoded, 3);
    assert_eq!(summary.stats.attachment_lines, 1);
    assert_eq!(summary.stats.records_skipped, 0);
    assert_eq!(summary.rows_written.get(&SectionKind::ReanalysisFeedback), Some(&2));
    store.save(&fixture.store_path).unwrap();

    let store = MemoryStore::load(&fixture.store_path).unwrap();
    let exporter = RecordExporter::new(&config()).unwrap();

    let (lines, export) = exporter.encode_records_for_date(&store, date(15), true).unwrap();
    assert_eq!(lines, fixture.day15_lines);
    assert_eq!(export.records, 2);
    assert_eq!(export.rejected, 0);

    let counts = exporter.count_records_for_date(&store, date(16), true).unwrap();
    assert_eq!(counts.get(&SectionKind::CoreLocation), Some(&1));
    assert_eq!(counts.get(&SectionKind::Uida), Some(&1));
}

#[tokio::test]
async fn test_reingesting_feedback_skips_existing_rows() {
    let fixture = fixture();
    let mut store = MemoryStore::new();

    {
        let mut processor = IngestProcessor::new(&mut store, config()).unwrap();
        processor
            .ingest_files(&[fixture.primaries.clone(), fixture.feedback.clone()])
            .await
            .unwrap();
        processor.finish().unwrap();
    }

    let again = {
        let mut processor = IngestProcessor::new(&mut store, config()).unwrap();
        processor.ingest_files(&[fixture.feedback.clone()]).await.unwrap();
        processor.finish().unwrap()
    };
    assert_eq!(again.existing_skipped, 2);
    assert_eq!(again.rows_written.get(&SectionKind::ReanalysisFeedback), None);

    let exporter = RecordExporter::new(&config()).unwrap();
    let rows = exporter
        .read_section_for_date(&store, SectionKind::ReanalysisFeedback, date(15))
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn test_feedback_for_unknown_uid_is_skipped() {
    let fixture = fixture();
    let mut store = MemoryStore::new();

    let summary = {
        let mut processor = IngestProcessor::new(&mut store, config()).unwrap();
        processor.ingest_files(&[fixture.feedback.clone()]).await.unwrap();
        processor.finish().unwrap()
    };
    assert_eq!(summary.stats.records_skipped, 1);
    assert!(summary.rows_written.is_empty());
}

#[tokio::test]
async fn test_missing_input_file_fails() {
    let temp = TempDir::new().unwrap();
    let mut store = MemoryStore::new();
    let mut processor = IngestProcessor::new(&mut store, config()).unwrap();

    let result = processor.ingest_files(&[temp.path().join("absent.imma")]).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_invalid_utf8_line_is_skipped() {
    let fixture = fixture();
    let mut content = Vec::new();
    content.extend_from_slice(fixture.day15_lines[0].as_bytes());
    content.extend_from_slice(b"\n\xff\xfe garbage\n");
    content.extend_from_slice(fixture.day15_lines[2].as_bytes());
    content.push(b'\n');
    let mixed = fixture.primaries.with_file_name("1950-01-mixed.imma");
    std::fs::write(&mixed, content).unwrap();

    let mut store = MemoryStore::new();
    let summary = {
        let mut processor = IngestProcessor::new(&mut store, config()).unwrap();
        processor.ingest_files(&[mixed]).await.unwrap();
        processor.finish().unwrap()
    };
    assert_eq!(summary.files_processed, 1);
    assert_eq!(summary.stats.records_decoded, 2);
    assert_eq!(summary.stats.records_skipped, 1);
    assert!(summary.stats.errors[0].contains("invalid UTF-8"));

    let exporter = RecordExporter::new(&config()).unwrap();
    let counts = exporter.count_records_for_date(&store, date(15), false).unwrap();
    assert_eq!(counts.get(&SectionKind::CoreLocation), Some(&2));
}
