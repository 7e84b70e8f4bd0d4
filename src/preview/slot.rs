use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::overlay::AnnotatedFrame;

/// Single-writer, multi-reader slot holding the current annotated frame.
///
/// The preview loop is the sole writer; the UI and clipboard exporter read
/// at any time without blocking capture. Exactly one frame is live:
/// publishing replaces the previous frame, which is freed once the last
/// reader drops its `Arc`.
pub struct FrameSlot {
    latest: Mutex<Option<Arc<AnnotatedFrame>>>,
    /// Monotonic counter incremented on each publish. Readers can use it
    /// for cache invalidation even when capture timestamps stall.
    sequence: AtomicU64,
}

impl FrameSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self {
            latest: Mutex::new(None),
            sequence: AtomicU64::new(0),
        }
    }

    /// Replace the current frame, returning the new sequence number.
    pub fn publish(&self, frame: AnnotatedFrame) -> u64 {
        *self.latest.lock() = Some(Arc::new(frame));
        self.sequence.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// The most recently published frame, if any.
    ///
    /// Returns a cheap reference-counted pointer rather than copying the
    /// pixel buffer.
    pub fn latest(&self) -> Option<Arc<AnnotatedFrame>> {
        self.latest.lock().clone()
    }

    /// Number of frames published so far.
    pub fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

impl Default for FrameSlot {
    fn default() -> Self {
        Self::new()
    }
}
