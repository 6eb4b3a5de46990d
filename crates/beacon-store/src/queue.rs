//! Background queue for events arriving while the surface is hidden.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use beacon_core::types::record::NotificationRecord;

use crate::store::NotificationStore;

/// FIFO buffer in front of the notification store, gated on visibility.
///
/// While the consuming surface is hidden, submitted records are buffered
/// instead of stored. The visibility signal is an edge trigger: only the
/// hidden→visible transition flushes the buffer, as one atomic batch in
/// original arrival order. Falling edges and rising edges with an empty
/// buffer are no-ops.
#[derive(Debug)]
pub struct BackgroundQueue {
    /// Destination store.
    store: Arc<NotificationStore>,
    /// Buffered records in arrival order.
    buffer: Mutex<VecDeque<NotificationRecord>>,
    /// Current visibility of the consuming surface.
    visible: AtomicBool,
}

impl BackgroundQueue {
    /// Create a queue in front of `store`.
    pub fn new(store: Arc<NotificationStore>, initially_visible: bool) -> Self {
        Self {
            store,
            buffer: Mutex::new(VecDeque::new()),
            visible: AtomicBool::new(initially_visible),
        }
    }

    /// Route a record to the store, or buffer it while hidden.
    ///
    /// Returns `true` when the record went straight into the store.
    pub async fn submit(&self, record: NotificationRecord) -> bool {
        if self.visible.load(Ordering::Acquire) {
            self.store.add(record).await;
            true
        } else {
            let mut buffer = self.lock_buffer();
            buffer.push_back(record);
            debug!(buffered = buffer.len(), "Buffered record while hidden");
            false
        }
    }

    /// Report a visibility change. Rising edges flush the buffer.
    pub async fn set_visible(&self, visible: bool) {
        let was_visible = self.visible.swap(visible, Ordering::AcqRel);
        if visible && !was_visible {
            self.flush().await;
        }
    }

    /// Whether the surface is currently visible.
    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Acquire)
    }

    /// Number of buffered records.
    pub fn buffered(&self) -> usize {
        self.lock_buffer().len()
    }

    /// Drain the buffer into the store as one batch, oldest first.
    async fn flush(&self) {
        let batch: Vec<NotificationRecord> = self.lock_buffer().drain(..).collect();
        if batch.is_empty() {
            return;
        }
        let count = batch.len();
        let added = self.store.add_batch(batch).await;
        debug!(count, added, "Flushed background queue");
    }

    fn lock_buffer(&self) -> std::sync::MutexGuard<'_, VecDeque<NotificationRecord>> {
        self.buffer.lock().unwrap_or_else(|e| e.into_inner())
    }
}
