//! # silo-types
//!
//! Column model and value conversions for the silo streaming-ingest client.
//!
//! This crate defines the vocabulary shared between the ingest channel and the
//! row buffer: the logical/physical column type matrix reported by the server
//! at channel open, the loosely-typed [`RowValue`] callers put into rows, and
//! the scalar coercions that turn those values into columnar form.
//!
//! ## Type Mappings
//!
//! | Logical type | Physical type | Columnar form |
//! |--------------|---------------|---------------|
//! | `FIXED` (scale 0) | `SB1`/`SB2`/`SB4`/`SB8` | signed integer of that width |
//! | `FIXED` (scale > 0) or `SB16` | any | 128-bit unscaled decimal |
//! | `TEXT`, `CHAR`, `ANY`, `ARRAY`, `OBJECT`, `VARIANT` | `LOB` | UTF-8 bytes |
//! | `TIMESTAMP_LTZ`/`TIMESTAMP_NTZ` | `SB8` | scaled epoch |
//! | `TIMESTAMP_LTZ`/`TIMESTAMP_NTZ` | `SB16` | (epoch seconds, nano fraction) |
//! | `DATE` | any | days since Unix epoch |
//! | `TIME` | `SB4`/`SB8` | scaled seconds since midnight |
//! | `BOOLEAN` | any | packed bit |
//! | `BINARY` | any | raw bytes |
//! | `REAL` | `DOUBLE` | IEEE double |

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod coerce;
pub mod column;
pub mod error;
pub mod numeric;
pub mod value;

pub use column::{
    ColumnDescriptor, ColumnMetadata, LogicalType, PhysicalType, normalize_column_name,
};
pub use error::TypeError;
pub use value::RowValue;
