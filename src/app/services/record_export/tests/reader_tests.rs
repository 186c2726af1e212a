use super::{day, exporter, populated_store};
use crate::app::services::record_store::rows::{instance, row_id, row_uid};
use crate::app::services::record_store::MemoryStore;
use crate::models::Value;
use crate::schema::SectionKind;

#[test]
fn test_read_core_for_date_in_row_order() {
    let store = populated_store();
    let core = exporter().read_core_for_date(&store, day(15)).unwrap();

    let ids: Vec<_> = core.iter().filter_map(row_id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(row_uid(&core[1]), Some("AB0002"));

    assert_eq!(exporter().read_core_for_date(&store, day(16)).unwrap().len(), 1);
    assert!(exporter().read_core_for_date(&store, day(17)).unwrap().is_empty());
}

#[test]
fn test_read_section_for_date() {
    let store = populated_store();
    let exporter = exporter();

    let icoads = exporter
        .read_section_for_date(&store, SectionKind::Icoads, day(15))
        .unwrap();
    assert_eq!(icoads.len(), 2);

    let feedback = exporter
        .read_section_for_date(&store, SectionKind::ReanalysisFeedback, day(15))
        .unwrap();
    let placed: Vec<_> = feedback.iter().map(|row| (row_id(row), instance(row))).collect();
    assert_eq!(placed, vec![(Some(1), 1), (Some(1), 2)]);

    let none = exporter
        .read_section_for_date(&store, SectionKind::ReanalysisFeedback, day(16))
        .unwrap();
    assert!(none.is_empty());

    let core = exporter
        .read_section_for_date(&store, SectionKind::CoreLocation, day(16))
        .unwrap();
    assert_eq!(core.len(), 1);
}

#[test]
fn test_read_section_for_uid() {
    let store = populated_store();
    let rows = exporter()
        .read_section_for_uid(&store, SectionKind::ReanalysisFeedback, "AB0001", 1)
        .unwrap();
    assert_eq!(rows.len(), 2);

    let missing = exporter()
        .read_section_for_uid(&store, SectionKind::Immt, "AB0001", 1)
        .unwrap();
    assert!(missing.is_empty());
}

#[test]
fn test_records_for_date_rebuilds_every_section() {
    let store = populated_store();
    let records = exporter().records_for_date(&store, day(15)).unwrap();
    assert_eq!(records.len(), 2);

    let first = &records[0];
    assert_eq!(first.uid.as_deref(), Some("AB0001"));
    assert_eq!(first.date, day(15));
    assert_eq!(first.value(SectionKind::CoreLocation, "lat"), &Value::Integer(4512));
    assert_eq!(first.value(SectionKind::Icoads, "dck"), &Value::Integer(927));
    assert_eq!(first.instances(SectionKind::ReanalysisFeedback).len(), 2);
    assert!(!records[1].has_section(SectionKind::ReanalysisFeedback));
    assert!(!first.section(SectionKind::CoreLocation).unwrap().contains_key("iidx"));
}

#[test]
fn test_empty_store_has_no_records() {
    let store = MemoryStore::new();
    assert!(exporter().records_for_date(&store, day(15)).unwrap().is_empty());
}
