//! # silo-testing
//!
//! Test fixtures for the silo streaming-ingest workspace.
//!
//! Provides an in-process [`ChannelContext`] implementation plus small
//! builders for rows and column metadata, so buffer tests and examples do
//! not need a live channel or transport.

#![warn(missing_docs)]
#![deny(unsafe_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use parking_lot::Mutex;

use silo_buffer::{BufferAllocator, ChannelContext, Row};
use silo_types::{ColumnMetadata, RowValue};

/// In-process channel double tracking the sequencer and offset token the way
/// a real channel would.
#[derive(Debug)]
pub struct MockChannel {
    name: String,
    allocator: Arc<BufferAllocator>,
    row_sequencer: AtomicI64,
    offset_token: Mutex<Option<String>>,
}

impl MockChannel {
    /// Create a channel double with the given fully qualified name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            allocator: BufferAllocator::new(),
            row_sequencer: AtomicI64::new(0),
            offset_token: Mutex::new(None),
        })
    }

    /// Current sequencer value without advancing it.
    #[must_use]
    pub fn current_row_sequencer(&self) -> i64 {
        self.row_sequencer.load(Ordering::Acquire)
    }
}

impl ChannelContext for MockChannel {
    fn allocator(&self) -> Arc<BufferAllocator> {
        Arc::clone(&self.allocator)
    }

    fn increment_and_get_row_sequencer(&self) -> i64 {
        self.row_sequencer.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn offset_token(&self) -> Option<String> {
        self.offset_token.lock().clone()
    }

    fn set_offset_token(&self, token: Option<String>) {
        *self.offset_token.lock() = token;
    }

    fn fully_qualified_name(&self) -> String {
        self.name.clone()
    }
}

/// Build a [`ColumnMetadata`] record the way a channel-open response would.
#[must_use]
pub fn column(name: &str, logical_type: &str, physical_type: &str) -> ColumnMetadata {
    ColumnMetadata {
        name: name.to_owned(),
        nullable: true,
        logical_type: logical_type.to_owned(),
        physical_type: physical_type.to_owned(),
        precision: None,
        scale: None,
        byte_length: None,
        char_length: None,
    }
}

/// Build a row from `(key, value)` pairs.
#[must_use]
pub fn row<const N: usize>(cells: [(&str, RowValue); N]) -> Row {
    cells
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value))
        .collect::<HashMap<_, _>>()
}
