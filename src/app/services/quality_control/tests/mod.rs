//! Test utilities for the trimming engine
//!
//! Builds decoded records with the core, ICOADS and IMMT fields the flag
//! decoder and the rule table read.

use chrono::NaiveDate;

use crate::models::{CompositeRecord, FieldValues, Value};
use crate::schema::SectionKind;


fn section(pairs: &[(&str, Value)]) -> FieldValues {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

/// A clean report of the given year: all flags present and below every threshold
pub fn report(year: i32) -> CompositeRecord {
    let mut record = CompositeRecord::new(NaiveDate::from_ymd_opt(year, 6, 1).unwrap());
    record.uid = Some("QC0001".to_string());
    record.set_section(
        SectionKind::CoreLocation,
        section(&[
            ("yr", Value::from(i64::from(year))),
            ("mo", Value::from(6i64)),
            ("dy", Value::from(1i64)),
            ("lat", Value::from(4512i64)),
            ("lon", Value::from(12050i64)),
        ]),
    );
    record.set_section(
        SectionKind::CoreRegular,
        section(&[
            ("d", Value::from(270i64)),
            ("w", Value::from(105i64)),
            ("slp", Value::from(10128i64)),
            ("at", Value::from(125i64)),
            ("wbt", Value::from(110i64)),
            ("dpt", Value::from(95i64)),
            ("sst", Value::from(140i64)),
        ]),
    );
    record.set_section(
        SectionKind::Icoads,
        section(&[
            ("b10", Value::from(283i64)),
            ("dck", Value::from(927i64)),
            ("sid", Value::from(1i64)),
            ("pt", Value::from(5i64)),
            ("dups", Value::from(0i64)),
            ("nd", Value::from(2i64)),
            ("trms", Value::from("253121")),
            ("nqcs", Value::from("11111111111111")),
            ("qce", Value::from(0i64)),
            ("lz", Value::from(0i64)),
            ("qcz", Value::from(0i64)),
        ]),
    );
    record.set_section(SectionKind::Immt, section(&[("rh", Value::from(850i64))]));
    record
}

/// Overwrite one field of a report
pub fn set(record: &mut CompositeRecord, kind: SectionKind, field: &str, value: impl Into<Value>) {
    if let Some(values) = record.section_mut(kind) {
        values.insert(field.to_string(), value.into());
    }
}
