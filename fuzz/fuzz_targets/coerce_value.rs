#![no_main]

use arbitrary::Arbitrary;
use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use silo_types::RowValue;
use silo_types::coerce::{coerce_binary, coerce_bool, coerce_days, coerce_text};

/// Arbitrary row values for coercion fuzzing.
#[derive(Debug, Arbitrary)]
enum FuzzRowValue {
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    Text(String),
    Binary(Vec<u8>),
}

fuzz_target!(|input: FuzzRowValue| {
    let value: RowValue = match input {
        FuzzRowValue::Null => RowValue::Null,
        FuzzRowValue::Bool(v) => RowValue::Bool(v),
        FuzzRowValue::Int(v) => RowValue::Int(v),
        FuzzRowValue::Real(v) => RowValue::Real(v),
        FuzzRowValue::Text(v) => RowValue::Text(v),
        FuzzRowValue::Binary(v) => RowValue::Binary(Bytes::from(v)),
    };

    // No coercion may panic on arbitrary input.
    let _ = coerce_bool(&value);
    let _ = coerce_text(&value);
    let _ = coerce_binary(&value);
    let _ = coerce_days(&value);

    // Canonical text and debug formatting must not panic either.
    let _ = value.as_text();
    let _ = format!("{value:?}");
});
