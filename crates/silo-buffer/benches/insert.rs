//! Benchmarks for the row buffer insert and flush paths.

#![allow(clippy::unwrap_used, clippy::expect_used, missing_docs)]

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use silo_buffer::{Row, RowBuffer};
use silo_testing::{MockChannel, column, row};
use silo_types::RowValue;

fn mixed_schema() -> Vec<silo_types::ColumnMetadata> {
    let mut id = column("ID", "FIXED", "SB8");
    id.scale = Some(0);
    let mut price = column("PRICE", "FIXED", "SB16");
    price.precision = Some(18);
    price.scale = Some(2);
    let mut ts = column("TS", "TIMESTAMP_NTZ", "SB16");
    ts.scale = Some(6);
    vec![
        id,
        price,
        ts,
        column("NAME", "TEXT", "LOB"),
        column("ACTIVE", "BOOLEAN", "SB1"),
        column("SCORE", "REAL", "DOUBLE"),
    ]
}

fn mixed_row(i: i64) -> Row {
    row([
        ("ID", RowValue::from(i)),
        ("PRICE", RowValue::from(format!("{}.25", i % 1000))),
        ("TS", RowValue::from("1700000000.123456")),
        ("NAME", RowValue::from(format!("name-{i}"))),
        ("ACTIVE", RowValue::from(i % 2 == 0)),
        ("SCORE", RowValue::from(i as f64 / 7.0)),
    ])
}

/// Benchmark inserting batches of mixed-type rows.
fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    for batch_size in [1usize, 100, 1000] {
        group.throughput(Throughput::Elements(batch_size as u64));
        group.bench_function(format!("batch_{batch_size}"), |b| {
            b.iter(|| {
                let channel = MockChannel::new("db.schema.bench");
                let buffer = RowBuffer::new(&channel);
                buffer
                    .setup_schema_from_metadata(&mixed_schema())
                    .expect("schema");
                let rows = (0..batch_size as i64).map(mixed_row);
                buffer
                    .insert_rows(rows, Some("token".to_owned()))
                    .expect("insert");
                black_box(buffer.buffer_size())
            })
        });
    }
    group.finish();
}

/// Benchmark a full insert → flush cycle.
fn bench_flush(c: &mut Criterion) {
    let mut group = c.benchmark_group("flush");
    group.throughput(Throughput::Elements(1000));
    group.bench_function("insert_1000_and_flush", |b| {
        b.iter(|| {
            let channel = MockChannel::new("db.schema.bench");
            let buffer = RowBuffer::new(&channel);
            buffer
                .setup_schema_from_metadata(&mixed_schema())
                .expect("schema");
            buffer
                .insert_rows((0..1000i64).map(mixed_row), None)
                .expect("insert");
            black_box(buffer.flush())
        })
    });
    group.finish();
}

criterion_group!(benches, bench_insert, bench_flush);
criterion_main!(benches);
