use super::{day, manager};
use crate::app::services::record_store::memory::MemoryStore;
use crate::app::services::record_store::Row;
use crate::models::{SectionCounts, Value};
use crate::schema::SectionKind;

fn rows(n: u64) -> Vec<Row> {
    (1..=n)
        .map(|iidx| {
            let mut row = Row::new();
            row.insert("iidx".to_string(), Value::from(iidx));
            row
        })
        .collect()
}

#[test]
fn test_write_section_rows_creates_partition_table() {
    let manager = manager(10);
    let mut store = MemoryStore::new();

    let written = manager
        .write_section_rows(&mut store, SectionKind::Icoads, 3, day(1), rows(2))
        .unwrap();
    assert_eq!(written, 2);
    assert_eq!(store.row_count("iicoads_3"), 2);

    let none = manager
        .write_section_rows(&mut store, SectionKind::Immt, 3, day(1), Vec::new())
        .unwrap();
    assert_eq!(none, 0);
    assert_eq!(store.table_names().filter(|name| name.starts_with("iimmt5")).count(), 0);
}

#[test]
fn test_record_batch_accumulates() {
    let manager = manager(10);
    let mut store = MemoryStore::new();

    let mut counts = SectionCounts::new();
    counts.insert(SectionKind::CoreLocation, 3);
    counts.insert(SectionKind::ReanalysisFeedback, 5);
    counts.insert(SectionKind::Immt, 0);

    let recorded = manager.record_batch(&mut store, day(1), 1, &counts).unwrap();
    assert_eq!(recorded.len(), 2);
    manager.record_batch(&mut store, day(2), 1, &counts).unwrap();

    assert_eq!(manager.section_total(&store, SectionKind::CoreLocation, 1).unwrap(), 6);
    assert_eq!(manager.section_total(&store, SectionKind::ReanalysisFeedback, 1).unwrap(), 10);
    assert_eq!(manager.section_total(&store, SectionKind::Immt, 1).unwrap(), 0);
    assert_eq!(manager.daily_total(&store, SectionKind::CoreLocation, day(1)).unwrap(), 3);
    assert_eq!(manager.daily_total(&store, SectionKind::CoreLocation, day(2)).unwrap(), 3);
}

#[test]
fn test_partition_sections_in_canonical_order() {
    let manager = manager(10);
    let mut store = MemoryStore::new();
    assert!(manager.partition_sections(&store, 1).unwrap().is_empty());

    let mut counts = SectionCounts::new();
    counts.insert(SectionKind::Uida, 1);
    counts.insert(SectionKind::CoreLocation, 1);
    manager.record_batch(&mut store, day(1), 1, &counts).unwrap();

    let mut later = SectionCounts::new();
    later.insert(SectionKind::Icoads, 1);
    manager.record_batch(&mut store, day(2), 2, &later).unwrap();

    assert_eq!(
        manager.partition_sections(&store, 1).unwrap(),
        vec![SectionKind::CoreLocation, SectionKind::Uida]
    );
    assert_eq!(manager.partition_sections(&store, 2).unwrap(), vec![SectionKind::Icoads]);
}
