//! End-to-end demo of the row buffer against an in-process channel.
//!
//! Run with:
//!
//! ```bash
//! cargo run --example ingest_demo -p silo-buffer
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)]

use silo_buffer::RowBuffer;
use silo_testing::{MockChannel, column, row};
use silo_types::RowValue;

fn main() {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let channel = MockChannel::new("analytics.public.events");
    let buffer = RowBuffer::new(&channel);

    let mut id = column("ID", "FIXED", "SB8");
    id.scale = Some(0);
    let mut amount = column("AMOUNT", "FIXED", "SB16");
    amount.precision = Some(18);
    amount.scale = Some(2);
    buffer
        .setup_schema_from_metadata(&[id, amount, column("LABEL", "TEXT", "LOB")])
        .expect("schema");

    buffer
        .insert_rows(
            [
                row([
                    ("ID", RowValue::from(1i64)),
                    ("AMOUNT", RowValue::from("19.99")),
                    ("LABEL", RowValue::from("signup")),
                ]),
                row([
                    ("ID", RowValue::from(2i64)),
                    ("AMOUNT", RowValue::from("0.50")),
                    ("LABEL", RowValue::Null),
                ]),
            ],
            Some("offset-2".to_owned()),
        )
        .expect("insert");

    println!(
        "buffered {} rows, ~{:.3} bytes",
        buffer.row_count(),
        buffer.buffer_size()
    );

    let data = buffer.flush().expect("non-empty flush");
    println!(
        "flushed blob #{} with {} rows (offset token {:?})",
        data.row_sequencer, data.row_count, data.offset_token
    );
    for vector in &data.vectors {
        println!(
            "  column {:<6} {:>9} metadata {:?}",
            vector.name(),
            vector.data().kind(),
            vector.metadata().get("logicalType")
        );
    }
    for (name, props) in &data.column_eps.column_eps {
        println!(
            "  ep {:<6} nulls={} distinct={} min_int={:?} max_int={:?}",
            name, props.null_count, props.distinct_values, props.min_int_value, props.max_int_value
        );
    }

    buffer.close();
}
