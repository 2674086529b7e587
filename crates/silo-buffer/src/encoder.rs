//! Type-directed value encoding into column vectors.
//!
//! One function, one cell: dispatch on the column's (logical, physical) pair,
//! coerce the loosely-typed value, append it to the matching vector layout,
//! and fold it into the column statistics. The return value is the estimated
//! encoded size in bytes, which the buffer accumulates for backpressure.

use std::borrow::Cow;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use silo_types::coerce::{coerce_binary, coerce_bool, coerce_days, coerce_text};
use silo_types::numeric::{
    decimal_to_unscaled, integer_part, parse_decimal, split_epoch_fraction, time_in_scale,
};
use silo_types::{ColumnDescriptor, LogicalType, PhysicalType, RowValue, TypeError};

use crate::error::Error;
use crate::stats::RowBufferStats;
use crate::vector::{ColumnVector, VectorData};

/// Estimated cost of one validity-bitmap bit.
pub(crate) const BITMAP_BIT: f64 = 0.125;

/// Cost of one timestamp struct row: 8-byte epoch, 4-byte fraction, plus one
/// validity bit for each child.
const TIMESTAMP_STRUCT_BYTES: f64 = 12.25;

fn invalid(field: &ColumnDescriptor, source: TypeError) -> Error {
    Error::InvalidRow {
        column: field.name.clone(),
        source,
    }
}

fn unexpected_kind(field: &ColumnDescriptor, kind: &'static str) -> Error {
    Error::Internal(format!(
        "column {}: unexpected {kind} vector for logical type {}, physical type {}",
        field.name,
        field.logical_type.as_str(),
        field.physical_type.as_str()
    ))
}

fn require_int(field: &ColumnDescriptor, value: &RowValue) -> Result<i64, Error> {
    value.as_i64().ok_or_else(|| {
        invalid(
            field,
            TypeError::TypeMismatch {
                expected: "INTEGER",
                actual: value.type_name(),
            },
        )
    })
}

fn require_text_form<'a>(
    field: &ColumnDescriptor,
    value: &'a RowValue,
    expected: &'static str,
) -> Result<Cow<'a, str>, Error> {
    value.as_text().ok_or_else(|| {
        invalid(
            field,
            TypeError::TypeMismatch {
                expected,
                actual: value.type_name(),
            },
        )
    })
}

fn coerce_decimal(field: &ColumnDescriptor, value: &RowValue) -> Result<Decimal, Error> {
    match value {
        RowValue::Decimal(d) => Ok(*d),
        other => {
            let text = require_text_form(field, other, "DECIMAL")?;
            parse_decimal(&text).map_err(|e| invalid(field, e))
        }
    }
}

fn coerce_real(field: &ColumnDescriptor, value: &RowValue) -> Result<f64, Error> {
    match value {
        RowValue::Real(v) => Ok(*v),
        RowValue::Int(v) => Ok(*v as f64),
        RowValue::Decimal(d) => d.to_f64().ok_or_else(|| {
            invalid(
                field,
                TypeError::InvalidDecimal(d.to_string()),
            )
        }),
        RowValue::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid(field, TypeError::InvalidDecimal(s.clone()))),
        other => Err(invalid(
            field,
            TypeError::TypeMismatch {
                expected: "REAL",
                actual: other.type_name(),
            },
        )),
    }
}

/// Encode one non-null cell into its column vector and statistics.
///
/// Returns the estimated encoded size in bytes (fractional for bit-packed
/// layouts). The caller accounts the cell's own validity bit separately.
pub(crate) fn append_value(
    field: &ColumnDescriptor,
    vector: &mut ColumnVector,
    stats: &mut RowBufferStats,
    value: &RowValue,
) -> Result<f64, Error> {
    use LogicalType as L;
    use PhysicalType as P;

    let scale = field.scale_or_zero();
    match (field.logical_type, field.physical_type) {
        (L::Fixed, P::Sb1) if scale == 0 => {
            let wide = require_int(field, value)?;
            let narrow = i8::try_from(wide).map_err(|_| {
                invalid(
                    field,
                    TypeError::OutOfRange {
                        target_type: "SB1",
                        value: wide.to_string(),
                    },
                )
            })?;
            match vector.data_mut() {
                VectorData::Int8(v) => v.append(narrow),
                other => return Err(unexpected_kind(field, other.kind())),
            }
            stats.add_int_value(narrow.into());
            Ok(1.0)
        }

        (L::Fixed, P::Sb2) if scale == 0 => {
            let wide = require_int(field, value)?;
            let narrow = i16::try_from(wide).map_err(|_| {
                invalid(
                    field,
                    TypeError::OutOfRange {
                        target_type: "SB2",
                        value: wide.to_string(),
                    },
                )
            })?;
            match vector.data_mut() {
                VectorData::Int16(v) => v.append(narrow),
                other => return Err(unexpected_kind(field, other.kind())),
            }
            stats.add_int_value(narrow.into());
            Ok(2.0)
        }

        (L::Fixed, P::Sb4) if scale == 0 => {
            let wide = require_int(field, value)?;
            let narrow = i32::try_from(wide).map_err(|_| {
                invalid(
                    field,
                    TypeError::OutOfRange {
                        target_type: "SB4",
                        value: wide.to_string(),
                    },
                )
            })?;
            match vector.data_mut() {
                VectorData::Int32(v) => v.append(narrow),
                other => return Err(unexpected_kind(field, other.kind())),
            }
            stats.add_int_value(narrow.into());
            Ok(4.0)
        }

        (L::Fixed, P::Sb8) if scale == 0 => {
            let v64 = require_int(field, value)?;
            match vector.data_mut() {
                VectorData::Int64(v) => v.append(v64),
                other => return Err(unexpected_kind(field, other.kind())),
            }
            stats.add_int_value(v64.into());
            Ok(8.0)
        }

        (L::Fixed, P::Sb1 | P::Sb2 | P::Sb4 | P::Sb8 | P::Sb16) => {
            let decimal = coerce_decimal(field, value)?;
            let unscaled = decimal_to_unscaled(&decimal, scale).map_err(|e| invalid(field, e))?;
            if let Some(precision) = field.precision {
                if (1..=38).contains(&precision) && unscaled.unsigned_abs() >= 10u128.pow(precision)
                {
                    return Err(invalid(
                        field,
                        TypeError::OutOfRange {
                            target_type: "DECIMAL(128)",
                            value: decimal.to_string(),
                        },
                    ));
                }
            }
            match vector.data_mut() {
                VectorData::Decimal128(v) => v.append(unscaled),
                other => return Err(unexpected_kind(field, other.kind())),
            }
            stats.add_int_value(integer_part(&decimal));
            Ok(16.0)
        }

        (L::Any | L::Array | L::Char | L::Text | L::Object | L::Variant, _) => {
            let text = coerce_text(value).map_err(|e| invalid(field, e))?;
            let bytes = text.as_bytes();
            match vector.data_mut() {
                VectorData::Utf8(v) => v.append(bytes),
                other => return Err(unexpected_kind(field, other.kind())),
            }
            stats.set_current_max_length(bytes.len() as u64);
            stats.add_str_value(&text);
            Ok(bytes.len() as f64)
        }

        (L::TimestampLtz | L::TimestampNtz, P::Sb8) => {
            let text = require_text_form(field, value, "TIMESTAMP")?;
            let scaled = time_in_scale(&text, scale).map_err(|e| invalid(field, e))?;
            match vector.data_mut() {
                // Low 64 bits, as signed.
                VectorData::Int64(v) => v.append(scaled as i64),
                other => return Err(unexpected_kind(field, other.kind())),
            }
            stats.add_int_value(scaled);
            Ok(8.0)
        }

        (L::TimestampLtz | L::TimestampNtz, P::Sb16) => {
            let text = require_text_form(field, value, "TIMESTAMP")?;
            let parts = split_epoch_fraction(&text, scale).map_err(|e| invalid(field, e))?;
            let scaled = time_in_scale(&text, scale).map_err(|e| invalid(field, e))?;
            match vector.data_mut() {
                VectorData::Timestamp(v) => v.append(parts.epoch, parts.fraction),
                other => return Err(unexpected_kind(field, other.kind())),
            }
            stats.add_int_value(scaled);
            Ok(TIMESTAMP_STRUCT_BYTES)
        }

        (L::Date, _) => {
            let days = coerce_days(value).map_err(|e| invalid(field, e))?;
            match vector.data_mut() {
                VectorData::Int32(v) => v.append(days),
                other => return Err(unexpected_kind(field, other.kind())),
            }
            stats.add_int_value(days.into());
            Ok(4.0)
        }

        (L::Time, P::Sb4) => {
            let text = require_text_form(field, value, "TIME")?;
            let scaled = time_in_scale(&text, scale).map_err(|e| invalid(field, e))?;
            match vector.data_mut() {
                // Low 32 bits, as signed.
                VectorData::Int32(v) => v.append(scaled as i32),
                other => return Err(unexpected_kind(field, other.kind())),
            }
            stats.add_int_value(scaled);
            Ok(4.0)
        }

        (L::Time, P::Sb8) => {
            let text = require_text_form(field, value, "TIME")?;
            let scaled = time_in_scale(&text, scale).map_err(|e| invalid(field, e))?;
            match vector.data_mut() {
                VectorData::Int64(v) => v.append(scaled as i64),
                other => return Err(unexpected_kind(field, other.kind())),
            }
            stats.add_int_value(scaled);
            Ok(8.0)
        }

        (L::Boolean, _) => {
            let bit = coerce_bool(value).map_err(|e| invalid(field, e))?;
            match vector.data_mut() {
                VectorData::Boolean(v) => v.append(bit),
                other => return Err(unexpected_kind(field, other.kind())),
            }
            stats.add_int_value(bit.into());
            Ok(BITMAP_BIT)
        }

        (L::Binary, _) => {
            let bytes = coerce_binary(value).map_err(|e| invalid(field, e))?;
            match vector.data_mut() {
                VectorData::Binary(v) => v.append(&bytes),
                other => return Err(unexpected_kind(field, other.kind())),
            }
            stats.set_current_max_length(bytes.len() as u64);
            Ok(bytes.len() as f64)
        }

        (L::Real, _) => {
            let real = coerce_real(field, value)?;
            match vector.data_mut() {
                VectorData::Float64(v) => v.append(real),
                other => return Err(unexpected_kind(field, other.kind())),
            }
            stats.add_real_value(real);
            Ok(8.0)
        }

        (logical, physical) => Err(Error::UnknownDataType {
            logical: logical.as_str().to_owned(),
            physical: physical.as_str().to_owned(),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::alloc::BufferAllocator;
    use crate::schema::materialize_vector;
    use silo_types::{ColumnDescriptor, LogicalType, PhysicalType};

    struct Harness {
        field: ColumnDescriptor,
        vector: ColumnVector,
        stats: RowBufferStats,
    }

    impl Harness {
        fn new(field: ColumnDescriptor) -> Self {
            let vector = materialize_vector(&field, &BufferAllocator::new(), 8)
                .unwrap_or_else(|e| panic!("materialize: {e}"));
            Self {
                field,
                vector,
                stats: RowBufferStats::default(),
            }
        }

        fn append(&mut self, value: impl Into<RowValue>) -> Result<f64, Error> {
            append_value(&self.field, &mut self.vector, &mut self.stats, &value.into())
        }
    }

    #[test]
    fn test_sb1_range() {
        let mut h = Harness::new(
            ColumnDescriptor::new("B", true, LogicalType::Fixed, PhysicalType::Sb1).with_scale(0),
        );
        assert_eq!(h.append(127i64), Ok(1.0));
        assert_eq!(h.append(-128i64), Ok(1.0));
        let err = h.append(128i64).expect_err("out of range");
        assert!(matches!(
            err,
            Error::InvalidRow {
                source: TypeError::OutOfRange { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_fixed_rejects_non_integers() {
        let mut h = Harness::new(
            ColumnDescriptor::new("N", true, LogicalType::Fixed, PhysicalType::Sb4).with_scale(0),
        );
        let err = h.append("12").expect_err("strings are not raw integers");
        assert!(matches!(
            err,
            Error::InvalidRow {
                source: TypeError::TypeMismatch { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_decimal_unscaled_and_integer_stats() {
        let mut h = Harness::new(
            ColumnDescriptor::new("PRICE", true, LogicalType::Fixed, PhysicalType::Sb4)
                .with_precision_scale(9, 2),
        );
        assert_eq!(h.append("12.34"), Ok(16.0));
        assert_eq!(h.append("0.01"), Ok(16.0));
        match h.vector.data() {
            VectorData::Decimal128(v) => {
                assert_eq!(v.value_at(0), Some(1234));
                assert_eq!(v.value_at(1), Some(1));
                assert_eq!(v.scale(), 2);
            }
            other => panic!("unexpected layout {}", other.kind()),
        }
        assert_eq!(h.stats.min_int_value(), Some(0));
        assert_eq!(h.stats.max_int_value(), Some(12));
    }

    #[test]
    fn test_decimal_precision_bound() {
        let mut h = Harness::new(
            ColumnDescriptor::new("P", true, LogicalType::Fixed, PhysicalType::Sb16)
                .with_precision_scale(4, 2),
        );
        assert!(h.append("99.99").is_ok());
        assert!(h.append("100.00").is_err());
    }

    #[test]
    fn test_text_updates_string_stats() {
        let mut h = Harness::new(ColumnDescriptor::new(
            "S",
            true,
            LogicalType::Text,
            PhysicalType::Lob,
        ));
        assert_eq!(h.append("pear"), Ok(4.0));
        assert_eq!(h.append("apple"), Ok(5.0));
        assert_eq!(h.stats.min_str_value(), Some("apple"));
        assert_eq!(h.stats.max_str_value(), Some("pear"));
        assert_eq!(h.stats.max_length(), 5);
    }

    #[test]
    fn test_timestamp_sb16_parts() {
        let mut h = Harness::new(
            ColumnDescriptor::new("TS", true, LogicalType::TimestampNtz, PhysicalType::Sb16)
                .with_scale(6),
        );
        assert_eq!(h.append("1700000000.123456"), Ok(12.25));
        match h.vector.data() {
            VectorData::Timestamp(v) => {
                let parts = v.value_at(0).expect("non-null");
                assert_eq!(parts.epoch, 1_700_000_000);
                assert_eq!(parts.fraction, 123_456_000);
            }
            other => panic!("unexpected layout {}", other.kind()),
        }
        assert_eq!(h.stats.max_int_value(), Some(1_700_000_000_123_456));
    }

    #[test]
    fn test_timestamp_sb16_scale_violation() {
        let mut h = Harness::new(
            ColumnDescriptor::new("TS", true, LogicalType::TimestampNtz, PhysicalType::Sb16)
                .with_scale(3),
        );
        let err = h.append("1.123456789").expect_err("finer than scale 3");
        assert!(matches!(
            err,
            Error::InvalidRow {
                source: TypeError::ScaleExceeded { .. },
                ..
            }
        ));
        assert_eq!(h.append("1.123000000"), Ok(12.25));
    }

    #[test]
    fn test_boolean_and_binary() {
        let mut h = Harness::new(ColumnDescriptor::new(
            "B",
            true,
            LogicalType::Boolean,
            PhysicalType::Sb1,
        ));
        assert_eq!(h.append("YES"), Ok(0.125));
        assert_eq!(h.append(false), Ok(0.125));
        assert_eq!(h.stats.min_int_value(), Some(0));
        assert_eq!(h.stats.max_int_value(), Some(1));

        let mut h = Harness::new(ColumnDescriptor::new(
            "RAW",
            true,
            LogicalType::Binary,
            PhysicalType::Lob,
        ));
        assert_eq!(h.append("deadBEEF"), Ok(4.0));
        assert!(h.append("abc").is_err());
        assert_eq!(h.stats.max_length(), 4);
    }

    #[test]
    fn test_real_accepts_strings() {
        let mut h = Harness::new(ColumnDescriptor::new(
            "R",
            true,
            LogicalType::Real,
            PhysicalType::Double,
        ));
        assert_eq!(h.append(1.25f64), Ok(8.0));
        assert_eq!(h.append("-3.5"), Ok(8.0));
        assert_eq!(h.stats.min_real_value(), Some(-3.5));
        assert_eq!(h.stats.max_real_value(), Some(1.25));
    }
}
