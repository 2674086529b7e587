//! The per-channel row buffer: insert path, flush handoff, lifecycle.
//!
//! Inserts and flushes contend on a single flush lock. Insert encodes every
//! cell of a batch under the lock and stores the batch's offset token on the
//! channel; flush sets each vector's value count, transfers the filled
//! vectors out, snapshots the statistics, reads the channel's sequencer and
//! offset token, and resets the buffer, all before releasing the lock. A
//! concurrent insert can therefore never straddle two blobs.
//!
//! Row counts and the byte estimate are mirrored into atomics so metrics can
//! read them without contending on the lock.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use silo_types::{ColumnDescriptor, ColumnMetadata, RowValue, TypeError, normalize_column_name};

use crate::alloc::BufferAllocator;
use crate::channel::{ChannelContext, ChannelData};
use crate::config::BufferOptions;
use crate::encoder::{self, BITMAP_BIT};
use crate::epinfo::build_ep_info;
use crate::error::Error;
use crate::schema::materialize_vector;
use crate::stats::RowBufferStats;
use crate::vector::ColumnVector;

/// One user row: column name (quoted or unquoted spelling) to value.
pub type Row = HashMap<String, RowValue>;

/// Mutable buffer state guarded by the flush lock.
#[derive(Default)]
struct BufferState {
    /// Column vectors, keyed by normalized column name.
    vectors: HashMap<String, ColumnVector>,
    /// Column descriptors, keyed by normalized column name.
    fields: HashMap<String, ColumnDescriptor>,
    /// Running statistics, keyed by normalized column name.
    stats: HashMap<String, RowBufferStats>,
    /// Column names in schema order, for the flush handoff.
    column_order: Vec<String>,
    /// Rows accepted in the current epoch.
    row_count: u64,
    /// Next write position; equals `row_count` in steady state.
    cur_row_index: usize,
    /// Estimated encoded bytes, fractional to account bitmap bits exactly.
    buffer_size: f64,
}

impl BufferState {
    fn reset(&mut self) {
        for vector in self.vectors.values_mut() {
            vector.clear();
        }
        self.row_count = 0;
        self.cur_row_index = 0;
        self.buffer_size = 0.0;
    }
}

/// In-memory columnar row buffer for one ingestion channel.
pub struct RowBuffer {
    state: Mutex<BufferState>,
    /// Lock-free mirror of the epoch row count, for metrics.
    row_count: AtomicU64,
    /// Lock-free mirror of `buffer_size`, stored as f64 bits.
    buffer_size_bits: AtomicU64,
    channel: Weak<dyn ChannelContext>,
    allocator: Arc<BufferAllocator>,
    options: BufferOptions,
}

impl RowBuffer {
    /// Create a buffer for the given channel with default options.
    #[must_use]
    pub fn new<C>(channel: &Arc<C>) -> Self
    where
        C: ChannelContext + 'static,
    {
        Self::with_options(channel, BufferOptions::default())
    }

    /// Create a buffer for the given channel.
    #[must_use]
    pub fn with_options<C>(channel: &Arc<C>, options: BufferOptions) -> Self
    where
        C: ChannelContext + 'static,
    {
        let channel_dyn: Arc<dyn ChannelContext> = channel.clone();
        let weak: Weak<dyn ChannelContext> = Arc::downgrade(&channel_dyn);
        Self {
            state: Mutex::new(BufferState::default()),
            row_count: AtomicU64::new(0),
            buffer_size_bits: AtomicU64::new(0.0f64.to_bits()),
            channel: weak,
            allocator: channel.allocator(),
            options,
        }
    }

    /// Materialize vectors, descriptors and statistics for the channel
    /// schema. Called exactly once, before the first insert.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownDataType`] for (logical, physical) pairs outside the
    /// supported matrix; [`Error::Internal`] when a schema is already set or
    /// two columns normalize to the same name.
    pub fn setup_schema(&self, columns: Vec<ColumnDescriptor>) -> Result<(), Error> {
        let mut state = self.state.lock();
        if !state.fields.is_empty() {
            return Err(Error::Internal("schema already materialized".to_owned()));
        }
        for descriptor in columns {
            let vector =
                materialize_vector(&descriptor, &self.allocator, self.options.row_capacity_hint)?;
            let name = descriptor.name.clone();
            if state.fields.contains_key(&name) {
                return Err(Error::Internal(format!(
                    "column {name} appears twice in the schema"
                )));
            }
            state.column_order.push(name.clone());
            state.vectors.insert(name.clone(), vector);
            state
                .stats
                .insert(name.clone(), RowBufferStats::new(self.options.distinct_value_limit));
            state.fields.insert(name, descriptor);
        }
        tracing::debug!(columns = state.column_order.len(), "materialized ingest schema");
        Ok(())
    }

    /// Validate channel-open metadata records and materialize the schema.
    ///
    /// # Errors
    ///
    /// As [`RowBuffer::setup_schema`], plus [`Error::UnknownDataType`] for
    /// unrecognized type strings.
    pub fn setup_schema_from_metadata(&self, columns: &[ColumnMetadata]) -> Result<(), Error> {
        let descriptors = columns
            .iter()
            .map(|meta| {
                ColumnDescriptor::from_metadata(meta).map_err(|e| match e {
                    TypeError::UnknownDataType { logical, physical } => {
                        Error::UnknownDataType { logical, physical }
                    }
                    other => Error::Internal(other.to_string()),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.setup_schema(descriptors)
    }

    /// Buffer a batch of rows and store its offset token on the channel.
    ///
    /// The whole batch is encoded under the flush lock, so it lands in one
    /// flushed blob. On failure the batch is rejected and already-encoded
    /// cells are not rolled back; callers should treat the buffer as
    /// poisoned for the in-flight batch and close the channel.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRow`] (or [`Error::DuplicateColumn`]) when a cell
    /// fails to encode; [`Error::Internal`] on invariant violations.
    pub fn insert_rows<I>(&self, rows: I, offset_token: Option<String>) -> Result<(), Error>
    where
        I: IntoIterator<Item = Row>,
    {
        let channel = self
            .channel
            .upgrade()
            .ok_or_else(|| Error::Internal("owning channel was dropped".to_owned()))?;
        let mut state = self.state.lock();
        if state.fields.is_empty() {
            return Err(Error::Internal("schema not materialized".to_owned()));
        }
        let mut batch_rows = 0u64;
        for row in rows {
            Self::write_row(&mut state, &row)?;
            batch_rows += 1;
        }
        channel.set_offset_token(offset_token);
        self.row_count.store(state.row_count, Ordering::Release);
        self.store_buffer_size(state.buffer_size);
        tracing::trace!(
            rows = batch_rows,
            total = state.row_count,
            channel = %channel.fully_qualified_name(),
            "buffered rows"
        );
        Ok(())
    }

    /// Encode one row at `cur_row_index` across all of its columns.
    fn write_row(state: &mut BufferState, row: &Row) -> Result<(), Error> {
        let BufferState {
            vectors,
            fields,
            stats,
            column_order,
            row_count,
            cur_row_index,
            buffer_size,
        } = state;
        let row_index = *cur_row_index;

        for (key, value) in row {
            // One validity bit per present cell.
            *buffer_size += BITMAP_BIT;
            let name = normalize_column_name(key);
            let field = fields
                .get(&name)
                .ok_or_else(|| Error::Internal(format!("no field for column {name}")))?;
            let vector = vectors
                .get_mut(&name)
                .ok_or_else(|| Error::Internal(format!("no vector for column {name}")))?;
            let column_stats = stats
                .get_mut(&name)
                .ok_or_else(|| Error::Internal(format!("no statistics for column {name}")))?;
            if vector.value_count() > row_index {
                return Err(Error::DuplicateColumn { column: name });
            }
            if value.is_null() {
                vector.append_null();
                column_stats.inc_null_count();
            } else {
                *buffer_size += encoder::append_value(field, vector, column_stats, value)?;
            }
        }

        // Null-fill schema columns the row did not mention, so every vector
        // stays aligned at the same row count.
        for name in column_order.iter() {
            let vector = vectors
                .get_mut(name)
                .ok_or_else(|| Error::Internal(format!("no vector for column {name}")))?;
            if vector.value_count() <= row_index {
                let column_stats = stats
                    .get_mut(name)
                    .ok_or_else(|| Error::Internal(format!("no statistics for column {name}")))?;
                *buffer_size += BITMAP_BIT;
                vector.append_null();
                column_stats.inc_null_count();
            }
        }

        *cur_row_index += 1;
        *row_count += 1;
        Ok(())
    }

    /// Hand the buffered columns to the flush stage.
    ///
    /// Returns `None` when the buffer is empty. Otherwise transfers every
    /// vector into the returned [`ChannelData`], snapshots the statistics,
    /// reads the channel's offset token and a freshly incremented row
    /// sequencer, and resets the buffer for the next epoch.
    pub fn flush(&self) -> Option<ChannelData> {
        // Cheap lock-free probe; re-checked under the lock.
        if self.row_count.load(Ordering::Acquire) == 0 {
            return None;
        }
        let channel = match self.channel.upgrade() {
            Some(channel) => channel,
            None => {
                tracing::warn!("flush requested after the owning channel was dropped");
                return None;
            }
        };

        let mut state = self.state.lock();
        if state.row_count == 0 {
            return None;
        }

        let BufferState {
            vectors,
            stats,
            column_order,
            row_count,
            cur_row_index,
            buffer_size,
            ..
        } = &mut *state;

        let mut handoff = Vec::with_capacity(column_order.len());
        for name in column_order.iter() {
            match vectors.get_mut(name) {
                Some(vector) => {
                    vector.set_value_count(*cur_row_index);
                    handoff.push(vector.transfer());
                }
                None => {
                    tracing::error!(column = %name, "vector missing during flush");
                }
            }
        }

        let flushed_rows = *row_count;
        let flushed_size = *buffer_size;
        let snapshot: HashMap<String, RowBufferStats> = stats
            .iter_mut()
            .map(|(name, stats)| (name.clone(), stats.take_snapshot()))
            .collect();
        let offset_token = channel.offset_token();
        let row_sequencer = channel.increment_and_get_row_sequencer();

        state.reset();
        drop(state);
        self.row_count.store(0, Ordering::Release);
        self.store_buffer_size(0.0);

        tracing::debug!(
            rows = flushed_rows,
            sequencer = row_sequencer,
            channel = %channel.fully_qualified_name(),
            "flushed row buffer"
        );

        let column_eps = build_ep_info(flushed_rows, &snapshot);
        Some(ChannelData {
            vectors: handoff,
            row_count: flushed_rows,
            buffer_size: flushed_size,
            channel,
            row_sequencer,
            offset_token,
            column_eps,
        })
    }

    /// Release all vectors and close the allocator. The caller must ensure
    /// no insert or flush is in flight.
    pub fn close(&self) {
        let mut state = self.state.lock();
        for vector in state.vectors.values_mut() {
            vector.clear();
        }
        state.vectors.clear();
        state.fields.clear();
        state.stats.clear();
        state.column_order.clear();
        state.row_count = 0;
        state.cur_row_index = 0;
        state.buffer_size = 0.0;
        drop(state);
        self.row_count.store(0, Ordering::Release);
        self.store_buffer_size(0.0);
        self.allocator.close();
        tracing::debug!("closed row buffer");
    }

    /// Rows buffered in the current epoch. Lock-free, bounded staleness.
    #[must_use]
    pub fn row_count(&self) -> u64 {
        self.row_count.load(Ordering::Acquire)
    }

    /// Estimated encoded bytes in the current epoch. Lock-free, bounded
    /// staleness.
    #[must_use]
    pub fn buffer_size(&self) -> f64 {
        f64::from_bits(self.buffer_size_bits.load(Ordering::Acquire))
    }

    /// Bytes held by the buffer's vector storage.
    #[must_use]
    pub fn allocated_bytes(&self) -> usize {
        self.allocator.allocated_bytes()
    }

    fn store_buffer_size(&self, size: f64) {
        self.buffer_size_bits.store(size.to_bits(), Ordering::Release);
    }
}

impl fmt::Debug for RowBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowBuffer")
            .field("row_count", &self.row_count())
            .field("buffer_size", &self.buffer_size())
            .field("allocated_bytes", &self.allocated_bytes())
            .finish_non_exhaustive()
    }
}
