//! Vector memory accounting.
//!
//! The owning channel hands one [`BufferAllocator`] to its buffer at
//! construction. Every vector registers its backing capacity against the
//! allocator, so channel-level memory metrics see the buffer's real
//! footprint without taking the flush lock. The allocator is single-owner:
//! a channel must not share it between buffers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Byte accounting for all vectors of one row buffer.
#[derive(Debug, Default)]
pub struct BufferAllocator {
    allocated: AtomicUsize,
    closed: AtomicBool,
}

impl BufferAllocator {
    /// Create a fresh allocator handle.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Bytes currently registered by live vectors.
    #[must_use]
    pub fn allocated_bytes(&self) -> usize {
        self.allocated.load(Ordering::Acquire)
    }

    /// Whether the allocator has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Mark the allocator closed. Outstanding reservations are a bug in the
    /// caller's shutdown ordering and are logged, not leaked silently.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        let outstanding = self.allocated_bytes();
        if outstanding > 0 {
            tracing::warn!(outstanding, "allocator closed with live reservations");
        } else {
            tracing::debug!("allocator closed");
        }
    }

    fn grow(&self, bytes: usize) {
        self.allocated.fetch_add(bytes, Ordering::AcqRel);
    }

    fn shrink(&self, bytes: usize) {
        self.allocated.fetch_sub(bytes, Ordering::AcqRel);
    }
}

/// One vector's registered share of the allocator. Released on drop.
#[derive(Debug)]
pub(crate) struct Reservation {
    allocator: Arc<BufferAllocator>,
    bytes: usize,
}

impl Reservation {
    pub(crate) fn new(allocator: Arc<BufferAllocator>) -> Self {
        Self {
            allocator,
            bytes: 0,
        }
    }

    /// Re-register this vector's backing capacity.
    pub(crate) fn resize(&mut self, bytes: usize) {
        if bytes > self.bytes {
            self.allocator.grow(bytes - self.bytes);
        } else {
            self.allocator.shrink(self.bytes - bytes);
        }
        self.bytes = bytes;
    }

    pub(crate) fn allocator(&self) -> &Arc<BufferAllocator> {
        &self.allocator
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        self.allocator.shrink(self.bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reservation_tracks_diffs() {
        let allocator = BufferAllocator::new();
        let mut a = Reservation::new(Arc::clone(&allocator));
        let mut b = Reservation::new(Arc::clone(&allocator));

        a.resize(100);
        b.resize(50);
        assert_eq!(allocator.allocated_bytes(), 150);

        a.resize(20);
        assert_eq!(allocator.allocated_bytes(), 70);

        drop(a);
        assert_eq!(allocator.allocated_bytes(), 50);
        drop(b);
        assert_eq!(allocator.allocated_bytes(), 0);
    }

    #[test]
    fn test_close_is_observable() {
        let allocator = BufferAllocator::new();
        assert!(!allocator.is_closed());
        allocator.close();
        assert!(allocator.is_closed());
    }
}
