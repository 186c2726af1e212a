//! Tests for fixed-width encoding and the ATTC rewrite

use super::*;
use crate::app::services::record_codec::{merge_attachment, RecordCodec};
use crate::constants::ATTC_POSITION;
use crate::error::Error;
use crate::models::{AttachmentLine, DecodedLine, SectionMap};

fn attc_char(line: &str) -> char {
    line.as_bytes()[ATTC_POSITION] as char
}

#[test]
fn test_encode_sample_record() {
    let lines = RecordCodec::new().encode(&sample_record()).unwrap();
    assert_eq!(lines, vec![sample_primary_line()]);
}

#[test]
fn test_decode_then_encode_is_identity() {
    let codec = RecordCodec::new();
    let line = sample_primary_line();
    let DecodedLine::Primary(record) = codec.decode_positional(&line).unwrap() else {
        panic!("expected primary line");
    };

    assert_eq!(codec.encode(&record).unwrap(), vec![line]);
}

#[test]
fn test_decode_then_encode_keeps_multibyte_text_width() {
    let codec = RecordCodec::new();
    let line = sample_primary_line().replacen("SHIPNAME ", "SHIPNAM\u{e9}", 1);
    let DecodedLine::Primary(record) = codec.decode_positional(&line).unwrap() else {
        panic!("expected primary line");
    };
    assert_eq!(
        record.section(SectionKind::CoreLocation).unwrap().get("id"),
        Some(&Value::from("SHIPNAM\u{e9}"))
    );

    let lines = codec.encode(&record).unwrap();
    assert_eq!(lines[0].len(), line.len());
    assert_eq!(lines, vec![line]);
}

#[test]
fn test_attc_rewritten_when_sections_change() {
    let mut record = sample_record();
    record.sections.remove(&SectionKind::Immt);

    let lines = RecordCodec::new().encode(&record).unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(attc_char(&lines[0]), '2');
}

#[test]
fn test_attc_not_touched_when_baseline_matches() {
    let mut record = sample_record();
    // A stale stored count is only rewritten when it disagrees with the baseline
    record
        .section_mut(SectionKind::CoreLocation)
        .unwrap()
        .insert("attc".to_string(), text("7"));

    let codec = RecordCodec::new();
    let kept = codec.encode_with_baseline(&record, Some(3)).unwrap();
    assert_eq!(attc_char(&kept[0]), '7');

    let rewritten = codec.encode_with_baseline(&record, None).unwrap();
    assert_eq!(attc_char(&rewritten[0]), '3');
}

#[test]
fn test_repeatable_sections_go_to_continuation_lines() {
    let codec = RecordCodec::new();
    let mut record = sample_record();
    record.push_instance(SectionKind::ReanalysisFeedback, reanalysis(1, 1));
    record.push_instance(SectionKind::ReanalysisFeedback, reanalysis(1, 2));

    let lines = codec.encode(&record).unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(attc_char(&lines[0]), '5');
    assert!(lines[1].starts_with(&section_text(SectionKind::Uida, &uida("AB1234"))));

    let decoded = codec.decode_lines(&lines).unwrap();
    assert_eq!(decoded.uid.as_deref(), Some("AB1234"));
    assert_eq!(decoded.instances(SectionKind::ReanalysisFeedback).len(), 2);
    assert_eq!(decoded.value(SectionKind::CoreLocation, "attc"), &text("5"));
    assert_eq!(decoded.section_counts().get(&SectionKind::Uida), Some(&1));
}

#[test]
fn test_repeatable_without_uid_is_malformed() {
    let mut record = sample_record();
    record.sections.remove(&SectionKind::Uida);
    record.push_instance(SectionKind::ReanalysisFeedback, reanalysis(1, 1));

    assert!(matches!(
        RecordCodec::new().encode(&record),
        Err(Error::MalformedRecord { .. })
    ));
}

#[test]
fn test_blank_core_regular_written_before_attachments() {
    let mut record = sample_record();
    record.sections.remove(&SectionKind::CoreRegular);

    let lines = RecordCodec::new().encode(&record).unwrap();
    let regular = &lines[0][45..45 + 63];
    assert!(regular.trim().is_empty());
}

#[test]
fn test_value_too_wide_overflows() {
    let mut record = sample_record();
    record
        .section_mut(SectionKind::CoreRegular)
        .unwrap()
        .insert("slp".to_string(), int(123456));

    let err = RecordCodec::new().encode(&record).unwrap_err();
    match err {
        Error::FieldOverflow { field, width, .. } => {
            assert_eq!(field, "slp");
            assert_eq!(width, 5);
        }
        other => panic!("expected overflow, got {:?}", other),
    }
}

#[test]
fn test_attc_overflow_past_one_base36_digit() {
    let mut record = sample_record();
    for fnr in 0..36 {
        record.push_instance(SectionKind::ReanalysisFeedback, reanalysis(1, fnr));
    }

    match RecordCodec::new().encode(&record) {
        Err(Error::FieldOverflow { field, .. }) => assert_eq!(field, "attc"),
        other => panic!("expected attc overflow, got {:?}", other),
    }
}

#[test]
fn test_float_and_integer_record_round_trip() {
    let codec = RecordCodec::new();
    let mut record = sample_record();

    codec.float_record(&mut record);
    assert_eq!(record.value(SectionKind::CoreLocation, "lat"), &Value::Decimal(45.12));
    assert_eq!(record.value(SectionKind::CoreRegular, "w"), &Value::Decimal(10.5));
    assert_eq!(record.value(SectionKind::CoreRegular, "d"), &int(270));
    assert_eq!(codec.encode(&record).unwrap(), vec![sample_primary_line()]);

    codec.integer_record(&mut record);
    assert_eq!(record, sample_record());
}

#[test]
fn test_merge_attachment_rejects_foreign_uid() {
    let mut record = sample_record();
    let mut sections = SectionMap::new();
    sections.insert(SectionKind::ReanalysisFeedback, vec![reanalysis(1, 1)]);
    let attachment = AttachmentLine {
        uid: "ZZ9999".to_string(),
        sections,
    };

    let err = merge_attachment(&mut record, attachment).unwrap_err();
    assert!(matches!(err, Error::MissingUid { .. }));
    assert!(!record.has_section(SectionKind::ReanalysisFeedback));
}
