//! # silo-buffer
//!
//! In-memory columnar row buffer for the silo streaming-ingest client.
//!
//! Each ingestion channel owns one [`RowBuffer`]. The buffer materializes the
//! channel schema into typed column vectors, accepts loosely-typed rows from
//! the caller, encodes every cell into its columnar form while keeping
//! per-column statistics, and hands the encoded columns to the flush stage as
//! a [`ChannelData`] bundle without blocking ingestion for longer than
//! necessary.
//!
//! ## Lifecycle
//!
//! ```text
//! channel open  -> RowBuffer::new + setup_schema (exactly once)
//! ingestion     -> insert_rows (any number of times, under the flush lock)
//! flush tick    -> flush (transfers vectors, snapshots stats, resets)
//! channel close -> close (releases vectors and the allocator)
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use silo_buffer::{Row, RowBuffer};
//! use silo_types::RowValue;
//!
//! let buffer = RowBuffer::new(&channel);
//! buffer.setup_schema_from_metadata(&open_response.columns)?;
//!
//! let row: Row = [("ID".to_owned(), RowValue::from(1i64))].into();
//! buffer.insert_rows([row], Some("token-1".to_owned()))?;
//!
//! if let Some(data) = buffer.flush() {
//!     transport.upload(data)?;
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod alloc;
pub mod bitmap;
pub mod buffer;
pub mod channel;
pub mod config;
mod encoder;
pub mod epinfo;
pub mod error;
mod schema;
pub mod stats;
pub mod vector;

pub use alloc::BufferAllocator;
pub use buffer::{Row, RowBuffer};
pub use channel::{ChannelContext, ChannelData};
pub use config::BufferOptions;
pub use epinfo::{EpInfo, FileColumnProperties, build_ep_info};
pub use error::{Error, ErrorCode};
pub use stats::RowBufferStats;
pub use vector::{ColumnVector, VectorData};
