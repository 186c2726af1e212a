use super::{day, manager};
use crate::app::services::record_store::memory::MemoryStore;
use crate::app::services::record_store::RecordStore;
use crate::app::services::shard_manager::{split_uid, IngestionContext, RowKey};
use crate::error::Error;
use crate::models::{FieldValues, ShardLocation, Value};
use crate::schema::{SchemaRegistry, SectionKind};

fn registered_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    manager(10)
        .register_uids(
            &mut store,
            day(4),
            2,
            &[("AB1234".to_string(), 17), ("AB1235".to_string(), 18), ("cd0001".to_string(), 19)],
        )
        .unwrap();
    store
}

#[test]
fn test_split_uid() {
    assert_eq!(split_uid("AB1234").unwrap(), ("ab".to_string(), "1234".to_string()));
    assert!(matches!(split_uid("AB12"), Err(Error::MissingUid { .. })));
}

#[test]
fn test_register_uids_groups_by_prefix() {
    let store = registered_store();
    assert_eq!(store.row_count("itidx_ab"), 2);
    assert_eq!(store.row_count("itidx_cd"), 1);
}

#[test]
fn test_sequential_assignment_advances() {
    let store = MemoryStore::new();
    let manager = manager(10);
    let mut ctx = IngestionContext::new();

    let first = manager.assign_next(&store, &mut ctx, RowKey::Sequential).unwrap();
    let second = manager.assign_next(&store, &mut ctx, RowKey::Sequential).unwrap();
    assert_eq!(first, ShardLocation::new(1, 1));
    assert_eq!(second, ShardLocation::new(1, 2));
    assert!(!ctx.is_bound());
}

#[test]
fn test_indexed_assignment_is_idempotent() {
    let store = registered_store();
    let manager = manager(10);
    let mut ctx = IngestionContext::new();
    ctx.current_row = 40;

    let first = manager.assign_next(&store, &mut ctx, RowKey::Indexed("AB1235")).unwrap();
    let again = manager.assign_next(&store, &mut ctx, RowKey::Indexed("AB1235")).unwrap();

    assert_eq!(first, ShardLocation::new(2, 18));
    assert_eq!(first, again);
    assert_eq!(ctx.current_row, 40);
    assert_eq!(ctx.binding.as_ref().unwrap().date, day(4));

    let next = manager.assign_next(&store, &mut ctx, RowKey::Sequential).unwrap();
    assert_eq!(next.row_id, 41);
    assert!(!ctx.is_bound());
}

#[test]
fn test_lookup_is_case_insensitive_on_prefix() {
    let store = registered_store();
    let binding = manager(10).lookup_uid(&store, "CD0001").unwrap();
    assert_eq!(binding.location, ShardLocation::new(2, 19));
}

#[test]
fn test_unknown_uid_is_missing() {
    let store = registered_store();
    let manager = manager(10);
    let mut ctx = IngestionContext::new();

    for uid in ["AB9999", "ZZ0001"] {
        let err = manager
            .assign_next(&store, &mut ctx, RowKey::Indexed(uid))
            .unwrap_err();
        assert!(matches!(err, Error::MissingUid { .. }), "{uid}");
        assert!(!err.is_fatal());
    }
    assert!(!ctx.is_bound());
}

#[test]
fn test_attachment_exists_uses_uniqueness_key() {
    let registry = SchemaRegistry::global();
    let manager = manager(10);
    let mut store = MemoryStore::new();
    let location = ShardLocation::new(1, 5);

    let rean = registry.schema(SectionKind::ReanalysisFeedback);
    let mut values = FieldValues::new();
    values.insert("icnr".to_string(), Value::from(1i64));
    values.insert("fnr".to_string(), Value::from(3i64));
    assert!(!manager.attachment_exists(&store, location, rean, &values).unwrap());

    let mut row = values.clone();
    row.insert("iidx".to_string(), Value::from(5u64));
    let table = store.ensure_table_like(rean.kind.table_name(), "1").unwrap();
    store.insert_many(&table, vec![row]).unwrap();
    assert!(manager.attachment_exists(&store, location, rean, &values).unwrap());

    let mut other_field = values.clone();
    other_field.insert("fnr".to_string(), Value::from(4i64));
    assert!(!manager.attachment_exists(&store, location, rean, &other_field).unwrap());
    assert!(!manager
        .attachment_exists(&store, ShardLocation::new(1, 6), rean, &values)
        .unwrap());
}
