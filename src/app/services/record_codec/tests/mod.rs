//! Test utilities and fixture builders for record codec testing
//!
//! Builds section values, fixed-width primary lines and 41-column delimited
//! lines shared by the decoder and encoder tests.

use chrono::NaiveDate;

use crate::app::services::record_codec::encoder::encode_section;
use crate::models::{CompositeRecord, FieldValues, Value};
use crate::schema::{SchemaRegistry, SectionKind};

mod encoder_tests;

pub fn registry() -> &'static SchemaRegistry {
    SchemaRegistry::global()
}

pub fn values(pairs: &[(&str, Value)]) -> FieldValues {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

pub fn int(v: i64) -> Value {
    Value::Integer(v)
}

pub fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

/// Exact fixed-width text of one section instance
pub fn section_text(kind: SectionKind, values: &FieldValues) -> String {
    encode_section(registry().schema(kind), values).unwrap()
}

pub fn core_location(attc: &str) -> FieldValues {
    values(&[
        ("yr", int(1950)),
        ("mo", int(1)),
        ("dy", int(15)),
        ("hr", int(1200)),
        ("lat", int(4512)),
        ("lon", int(12050)),
        ("im", int(1)),
        ("attc", text(attc)),
        ("ti", int(1)),
        ("li", int(3)),
        ("ds", int(6)),
        ("vs", int(5)),
        ("ii", int(10)),
        ("id", text("SHIPNAME")),
        ("c1", text("GB")),
    ])
}

pub fn core_regular() -> FieldValues {
    values(&[
        ("di", int(1)),
        ("d", int(270)),
        ("wi", int(4)),
        ("w", int(105)),
        ("vv", int(97)),
        ("ww", int(2)),
        ("slp", int(10128)),
        ("a", int(2)),
        ("ppp", int(15)),
        ("at", int(125)),
        ("wbt", int(110)),
        ("dpt", int(95)),
        ("sst", int(140)),
        ("n", int(8)),
        ("cl", text("2")),
        ("h", text("5")),
        ("wd", int(10)),
    ])
}

pub fn icoads() -> FieldValues {
    values(&[
        ("b10", int(283)),
        ("b1", int(12)),
        ("dck", int(927)),
        ("sid", int(25)),
        ("pt", int(5)),
        ("dups", int(0)),
        ("dupc", int(0)),
        ("nd", int(2)),
        ("trms", text("253121")),
        ("nqcs", text("11111111111111")),
        ("qce", int(0)),
        ("lz", int(0)),
        ("qcz", int(0)),
    ])
}

pub fn immt() -> FieldValues {
    values(&[
        ("os", int(1)),
        ("op", int(1)),
        ("fm", text("4")),
        ("rh", int(850)),
        ("imono", text("1234567")),
    ])
}

pub fn uida(uid: &str) -> FieldValues {
    values(&[
        ("uid", text(uid)),
        ("rn1", text("0")),
        ("rsa", int(0)),
        ("irf", int(1)),
    ])
}

pub fn reanalysis(icnr: i64, fnr: i64) -> FieldValues {
    values(&[
        ("icnr", int(icnr)),
        ("fnr", int(fnr)),
        ("dpro", int(1)),
        ("mfgr", int(101250)),
        ("arcr", text("ERA")),
    ])
}

/// A record with both core sections, two singular attachments and a UID
pub fn sample_record() -> CompositeRecord {
    let mut record = CompositeRecord::new(NaiveDate::from_ymd_opt(1950, 1, 15).unwrap());
    record.uid = Some("AB1234".to_string());
    record.set_section(SectionKind::CoreLocation, core_location("3"));
    record.set_section(SectionKind::CoreRegular, core_regular());
    record.set_section(SectionKind::Icoads, icoads());
    record.set_section(SectionKind::Immt, immt());
    record.set_section(SectionKind::Uida, uida("AB1234"));
    record
}

/// Primary line of [`sample_record`]
pub fn sample_primary_line() -> String {
    [
        section_text(SectionKind::CoreLocation, &core_location("3")),
        section_text(SectionKind::CoreRegular, &core_regular()),
        section_text(SectionKind::Icoads, &icoads()),
        section_text(SectionKind::Immt, &immt()),
        section_text(SectionKind::Uida, &uida("AB1234")),
    ]
    .concat()
}

/// The 41 columns of a canonical delimited line
pub fn delimited_columns() -> Vec<String> {
    [
        "1950011512000000123",
        "23",
        "1",
        "123456",
        "120.50",
        "45.12",
        "10",
        "999.99",
        "1013.25",
        "1012.80",
        "-9.99",
        "0",
        "9999.99",
        "0.50",
        "9",
        "1.25",
        "0.40",
        "0.00",
        "1",
        "0",
        "1",
        "0",
        "1",
        "0",
        "1011.30",
        "1.20",
        "0.75",
        "1010.00",
        "-9.99",
        "999.99",
        "15",
        "SHIP ROUTE A",
        "STATION12",
        "001",
        "25",
        "927",
        "5",
        "1",
        "00001",
        "00000",
        "00000",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn delimited_line() -> String {
    delimited_columns().join(",")
}
