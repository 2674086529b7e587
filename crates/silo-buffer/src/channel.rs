//! Channel collaborator contract and the flush handoff bundle.

use std::fmt;
use std::sync::Arc;

use crate::alloc::BufferAllocator;
use crate::epinfo::EpInfo;
use crate::vector::ColumnVector;

/// Operations the row buffer consumes from its owning channel.
///
/// The buffer holds the channel behind a `Weak` reference: the channel owns
/// the buffer, and the buffer must never extend the channel's lifetime. The
/// allocator handed out here is valid for the lifetime of the buffer and must
/// not be shared with another buffer.
pub trait ChannelContext: Send + Sync {
    /// Allocator used for all of the buffer's vector storage.
    fn allocator(&self) -> Arc<BufferAllocator>;

    /// Atomically advance and read the channel's row sequencer. Strictly
    /// increasing across successive flushes.
    fn increment_and_get_row_sequencer(&self) -> i64;

    /// Last offset token stored on the channel.
    fn offset_token(&self) -> Option<String>;

    /// Store the offset token of the latest accepted batch. Last write wins.
    fn set_offset_token(&self, token: Option<String>);

    /// Fully qualified `database.schema.table` name, for logging only.
    fn fully_qualified_name(&self) -> String;
}

/// Encoded columns and bookkeeping handed to the flush service, one bundle
/// per flush.
pub struct ChannelData {
    /// Filled vectors in schema order, each carrying its encoding metadata.
    pub vectors: Vec<ColumnVector>,
    /// Rows encoded into the vectors.
    pub row_count: u64,
    /// Estimated encoded size in bytes.
    pub buffer_size: f64,
    /// The channel this data belongs to.
    pub channel: Arc<dyn ChannelContext>,
    /// Position of this blob in the channel's flush order.
    pub row_sequencer: i64,
    /// Offset token of the last batch in the blob, if any.
    pub offset_token: Option<String>,
    /// Per-column statistics for server-side pruning.
    pub column_eps: EpInfo,
}

impl fmt::Debug for ChannelData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelData")
            .field("channel", &self.channel.fully_qualified_name())
            .field("columns", &self.vectors.len())
            .field("row_count", &self.row_count)
            .field("buffer_size", &self.buffer_size)
            .field("row_sequencer", &self.row_sequencer)
            .field("offset_token", &self.offset_token)
            .finish_non_exhaustive()
    }
}
