use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ispd_processor::app::services::quality_control::{TrimOptions, TrimmingEngine};
use ispd_processor::{CompositeRecord, FieldValues, RecordCodec, RecordFormat, SectionKind, Value};

fn values(pairs: &[(&str, Value)]) -> FieldValues {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

fn sample_record() -> CompositeRecord {
    let mut record = CompositeRecord::new(NaiveDate::from_ymd_opt(1950, 1, 15).unwrap());
    record.set_section(
        SectionKind::CoreLocation,
        values(&[
            ("yr", Value::Integer(1950)),
            ("mo", Value::Integer(1)),
            ("dy", Value::Integer(15)),
            ("hr", Value::Integer(1200)),
            ("lat", Value::Integer(4512)),
            ("lon", Value::Integer(12050)),
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
            ("nd", Value::Integer(2)),
            ("trms", Value::from("253121")),
            ("nqcs", Value::from("11111111111111")),
        ]),
    );
    record.set_section(SectionKind::Uida, values(&[("uid", Value::from("AB1234"))]));
    for fnr in 1..=3 {
        record.push_instance(
            SectionKind::ReanalysisFeedback,
            values(&[("icnr", Value::Integer(1)), ("fnr", Value::Integer(fnr))]),
        );
    }
    record
}

fn bench_positional(c: &mut Criterion) {
    let codec = RecordCodec::new();
    let record = sample_record();
    let lines = codec.encode(&record).unwrap();

    c.bench_function("decode_primary_line", |b| {
        b.iter(|| codec.decode(black_box(&lines[0]), RecordFormat::Positional).unwrap())
    });
    c.bench_function("decode_record_with_continuation", |b| {
        b.iter(|| codec.decode_lines(black_box(&lines)).unwrap())
    });
    c.bench_function("encode_record", |b| b.iter(|| codec.encode(black_box(&record)).unwrap()));
}

fn bench_trimming(c: &mut Criterion) {
    let engine = TrimmingEngine::new(TrimOptions::default().with_optf(1)).unwrap();
    let record = sample_record();

    c.bench_function("trim_record", |b| {
        b.iter(|| {
            let mut record = record.clone();
            engine.apply(black_box(&mut record)).unwrap()
        })
    });
}

criterion_group!(benches, bench_positional, bench_trimming);
criterion_main!(benches);
