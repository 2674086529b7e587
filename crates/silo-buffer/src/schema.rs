//! Schema materialization: the logical × physical type matrix.

use std::collections::HashMap;
use std::sync::Arc;

use silo_types::{ColumnDescriptor, LogicalType, PhysicalType};

use crate::alloc::BufferAllocator;
use crate::error::Error;
use crate::vector::{ColumnVector, VectorData};

/// Precision assumed for decimal columns whose metadata omits it.
const DEFAULT_DECIMAL_PRECISION: u32 = 38;

/// Build the column vector for one descriptor, or reject the
/// (logical, physical) pair as unsupported.
pub(crate) fn materialize_vector(
    descriptor: &ColumnDescriptor,
    allocator: &Arc<BufferAllocator>,
    capacity: usize,
) -> Result<ColumnVector, Error> {
    use LogicalType as L;
    use PhysicalType as P;

    let scale = descriptor.scale_or_zero();
    let decimal = || {
        VectorData::decimal128(
            Arc::clone(allocator),
            capacity,
            descriptor.precision.unwrap_or(DEFAULT_DECIMAL_PRECISION),
            scale,
        )
    };

    let data = match (descriptor.logical_type, descriptor.physical_type) {
        (L::Fixed, P::Sb1) if scale == 0 => VectorData::int8(Arc::clone(allocator), capacity),
        (L::Fixed, P::Sb2) if scale == 0 => VectorData::int16(Arc::clone(allocator), capacity),
        (L::Fixed, P::Sb4) if scale == 0 => VectorData::int32(Arc::clone(allocator), capacity),
        (L::Fixed, P::Sb8) if scale == 0 => VectorData::int64(Arc::clone(allocator), capacity),
        (L::Fixed, P::Sb1 | P::Sb2 | P::Sb4 | P::Sb8 | P::Sb16) => decimal(),
        (L::Any | L::Array | L::Char | L::Text | L::Object | L::Variant, _) => {
            VectorData::utf8(Arc::clone(allocator), capacity)
        }
        (L::TimestampLtz | L::TimestampNtz, P::Sb8) => {
            VectorData::int64(Arc::clone(allocator), capacity)
        }
        (L::TimestampLtz | L::TimestampNtz, P::Sb16) => {
            VectorData::timestamp(Arc::clone(allocator), capacity)
        }
        (L::Date, _) => VectorData::int32(Arc::clone(allocator), capacity),
        (L::Time, P::Sb4) => VectorData::int32(Arc::clone(allocator), capacity),
        (L::Time, P::Sb8) => VectorData::int64(Arc::clone(allocator), capacity),
        (L::Boolean, _) => VectorData::boolean(Arc::clone(allocator), capacity),
        (L::Binary, _) => VectorData::binary(Arc::clone(allocator), capacity),
        (L::Real, _) => VectorData::float64(Arc::clone(allocator), capacity),
        (logical, physical) => {
            return Err(Error::UnknownDataType {
                logical: logical.as_str().to_owned(),
                physical: physical.as_str().to_owned(),
            });
        }
    };

    let metadata: HashMap<String, String> = descriptor
        .metadata_pairs()
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect();
    Ok(ColumnVector::new(descriptor.name.clone(), data, metadata))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use silo_types::{LogicalType, PhysicalType};

    fn materialize(descriptor: &ColumnDescriptor) -> Result<ColumnVector, Error> {
        materialize_vector(descriptor, &BufferAllocator::new(), 16)
    }

    fn desc(logical: LogicalType, physical: PhysicalType) -> ColumnDescriptor {
        ColumnDescriptor::new("C", true, logical, physical)
    }

    #[test]
    fn test_fixed_widths_at_scale_zero() {
        let cases = [
            (PhysicalType::Sb1, "INT8"),
            (PhysicalType::Sb2, "INT16"),
            (PhysicalType::Sb4, "INT32"),
            (PhysicalType::Sb8, "INT64"),
        ];
        for (physical, kind) in cases {
            let vector = materialize(&desc(LogicalType::Fixed, physical).with_scale(0))
                .unwrap_or_else(|_| panic!("{physical:?} should materialize"));
            assert_eq!(vector.data().kind(), kind);
        }
    }

    #[test]
    fn test_fixed_with_scale_is_decimal() {
        for physical in [
            PhysicalType::Sb1,
            PhysicalType::Sb2,
            PhysicalType::Sb4,
            PhysicalType::Sb8,
        ] {
            let vector = materialize(
                &desc(LogicalType::Fixed, physical).with_precision_scale(9, 2),
            )
            .unwrap_or_else(|_| panic!("{physical:?} should materialize"));
            assert_eq!(vector.data().kind(), "DECIMAL128");
        }
    }

    #[test]
    fn test_fixed_sb16_always_decimal() {
        let vector = materialize(&desc(LogicalType::Fixed, PhysicalType::Sb16).with_scale(0));
        assert_eq!(vector.map(|v| v.data().kind()), Ok("DECIMAL128"));
    }

    #[test]
    fn test_text_family_is_utf8() {
        for logical in [
            LogicalType::Any,
            LogicalType::Array,
            LogicalType::Char,
            LogicalType::Text,
            LogicalType::Object,
            LogicalType::Variant,
        ] {
            let vector = materialize(&desc(logical, PhysicalType::Lob))
                .unwrap_or_else(|_| panic!("{logical:?} should materialize"));
            assert_eq!(vector.data().kind(), "UTF8");
        }
    }

    #[test]
    fn test_timestamp_widths() {
        let sb8 = materialize(&desc(LogicalType::TimestampNtz, PhysicalType::Sb8).with_scale(3));
        assert_eq!(sb8.map(|v| v.data().kind()), Ok("INT64"));
        let sb16 = materialize(&desc(LogicalType::TimestampLtz, PhysicalType::Sb16).with_scale(9));
        assert_eq!(sb16.map(|v| v.data().kind()), Ok("TIMESTAMP"));
    }

    #[test]
    fn test_timestamp_tz_unsupported() {
        let err = materialize(&desc(LogicalType::TimestampTz, PhysicalType::Sb16));
        assert!(matches!(err, Err(Error::UnknownDataType { .. })));
    }

    #[test]
    fn test_interval_unsupported() {
        let err = materialize(&desc(LogicalType::Interval, PhysicalType::Sb8));
        assert!(matches!(err, Err(Error::UnknownDataType { .. })));
    }

    #[test]
    fn test_metadata_travels_with_vector() {
        let vector = materialize(
            &desc(LogicalType::Fixed, PhysicalType::Sb16).with_precision_scale(38, 4),
        )
        .unwrap_or_else(|_| panic!("decimal should materialize"));
        assert_eq!(
            vector.metadata().get("logicalType").map(String::as_str),
            Some("FIXED")
        );
        assert_eq!(
            vector.metadata().get("physicalType").map(String::as_str),
            Some("SB16")
        );
        assert_eq!(
            vector.metadata().get("precision").map(String::as_str),
            Some("38")
        );
        assert_eq!(vector.metadata().get("scale").map(String::as_str), Some("4"));
    }
}
