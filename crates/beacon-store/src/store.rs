//! The canonical ordered notification collection.

use std::sync::Arc;
use std::sync::Mutex;

use tokio::sync::broadcast;
use tracing::{debug, warn};

use beacon_core::config::dedup::DedupConfig;
use beacon_core::config::store::StoreConfig;
use beacon_core::events::StoreEvent;
use beacon_core::traits::storage::KvStorage;
use beacon_core::types::record::NotificationRecord;

use crate::seed::seed_records;

/// Ordered, persisted collection of notification records.
///
/// Records are kept newest-first and unique by id. Every mutation is
/// persisted to durable storage and announced on a broadcast channel, so
/// UI renderers subscribe instead of polling.
///
/// Storage failures are absorbed: a failed persist is logged and the
/// in-memory state stays authoritative until the next mutation retries it.
#[derive(Debug)]
pub struct NotificationStore {
    /// Newest-first record list.
    records: Mutex<Vec<NotificationRecord>>,
    /// Durable storage backend.
    storage: Arc<dyn KvStorage>,
    /// Store settings (keys, retention cap).
    config: StoreConfig,
    /// Window of the coarse duplicate check, in milliseconds.
    duplicate_window_ms: i64,
    /// Mutation event channel.
    events: broadcast::Sender<StoreEvent>,
}

impl NotificationStore {
    /// Create a store backed by the given storage.
    ///
    /// The store starts empty; call [`load`](Self::load) to restore the
    /// persisted list (or the seed set) before routing events into it.
    pub fn new(storage: Arc<dyn KvStorage>, config: StoreConfig, dedup: &DedupConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_buffer_size.max(1));
        Self {
            records: Mutex::new(Vec::new()),
            storage,
            config,
            duplicate_window_ms: dedup.store_window_ms,
            events,
        }
    }

    /// Restore the record list from storage.
    ///
    /// Missing or unreadable data falls back to the fixed seed set; this
    /// never fails.
    pub async fn load(&self) {
        let restored = match self.storage.get(&self.config.records_key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<NotificationRecord>>(&raw) {
                Ok(records) => Some(records),
                Err(e) => {
                    warn!("Stored notification list is unreadable, seeding: {e}");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read stored notifications, seeding: {e}");
                None
            }
        };

        let records = restored.unwrap_or_else(seed_records);
        debug!(count = records.len(), "Notification store loaded");
        *self.lock_records() = records;
        self.persist().await;
    }

    /// Subscribe to store mutation events.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Insert a record at the front of the list.
    ///
    /// Returns `false` when the record is rejected as a duplicate: either
    /// an id already present, or an existing record with the same message
    /// text and kind within the duplicate window. This guards against
    /// races between the stream path and the manual insert path.
    pub async fn add(&self, record: NotificationRecord) -> bool {
        let inserted = {
            let mut records = self.lock_records();
            if Self::is_duplicate(&records, &record, self.duplicate_window_ms) {
                debug!(id = %record.id, "Rejected duplicate record");
                false
            } else {
                records.insert(0, record.clone());
                self.trim(&mut records);
                true
            }
        };

        if inserted {
            self.persist().await;
            self.emit(StoreEvent::Added { record });
        }
        inserted
    }

    /// Insert a batch of records flushed from the background queue.
    ///
    /// The batch arrives oldest-first; each record is prepended in turn so
    /// the resulting list stays newest-first with the batch ahead of all
    /// pre-existing records. Duplicate checks apply per record. The whole
    /// batch is one atomic mutation with a single persist.
    pub async fn add_batch(&self, batch: Vec<NotificationRecord>) -> usize {
        if batch.is_empty() {
            return 0;
        }

        let mut added = Vec::new();
        {
            let mut records = self.lock_records();
            for record in batch {
                if Self::is_duplicate(&records, &record, self.duplicate_window_ms) {
                    debug!(id = %record.id, "Rejected duplicate record in batch");
                    continue;
                }
                records.insert(0, record.clone());
                added.push(record);
            }
            self.trim(&mut records);
        }

        if !added.is_empty() {
            self.persist().await;
            for record in &added {
                self.emit(StoreEvent::Added {
                    record: record.clone(),
                });
            }
            self.emit(StoreEvent::Flushed { count: added.len() });
        }
        added.len()
    }

    /// Mark a record as read. Unknown or already-read ids are a no-op.
    pub async fn mark_read(&self, id: &str) {
        let changed = {
            let mut records = self.lock_records();
            match records.iter_mut().find(|r| r.id == id && !r.read) {
                Some(record) => {
                    record.read = true;
                    true
                }
                None => false,
            }
        };

        if changed {
            self.persist().await;
            self.emit(StoreEvent::Read { id: id.to_string() });
        }
    }

    /// Mark every record as read. A no-op on an empty or all-read store.
    pub async fn mark_all_read(&self) {
        let changed = {
            let mut records = self.lock_records();
            let mut changed = false;
            for record in records.iter_mut().filter(|r| !r.read) {
                record.read = true;
                changed = true;
            }
            changed
        };

        if changed {
            self.persist().await;
            self.emit(StoreEvent::AllRead);
        }
    }

    /// Remove a record. Unknown ids are a no-op.
    pub async fn remove(&self, id: &str) {
        let changed = {
            let mut records = self.lock_records();
            let before = records.len();
            records.retain(|r| r.id != id);
            records.len() != before
        };

        if changed {
            self.persist().await;
            self.emit(StoreEvent::Removed { id: id.to_string() });
        }
    }

    /// Remove every record. A no-op on an empty store.
    pub async fn clear(&self) {
        let changed = {
            let mut records = self.lock_records();
            let was_empty = records.is_empty();
            records.clear();
            !was_empty
        };

        if changed {
            self.persist().await;
            self.emit(StoreEvent::Cleared);
        }
    }

    /// Snapshot of the current record list, newest first.
    pub fn records(&self) -> Vec<NotificationRecord> {
        self.lock_records().clone()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.lock_records().len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.lock_records().is_empty()
    }

    /// Number of unread records.
    pub fn unread_count(&self) -> usize {
        self.lock_records().iter().filter(|r| !r.read).count()
    }

    fn lock_records(&self) -> std::sync::MutexGuard<'_, Vec<NotificationRecord>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_duplicate(
        records: &[NotificationRecord],
        candidate: &NotificationRecord,
        window_ms: i64,
    ) -> bool {
        records.iter().any(|existing| {
            existing.id == candidate.id
                || (existing.message == candidate.message
                    && existing.kind == candidate.kind
                    && (existing.created_at - candidate.created_at)
                        .num_milliseconds()
                        .abs()
                        <= window_ms)
        })
    }

    /// Enforce the retention cap by dropping the oldest records.
    fn trim(&self, records: &mut Vec<NotificationRecord>) {
        if self.config.max_records > 0 && records.len() > self.config.max_records {
            records.truncate(self.config.max_records);
        }
    }

    async fn persist(&self) {
        let snapshot = self.records();
        let json = match serde_json::to_string(&snapshot) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize notification list: {e}");
                return;
            }
        };
        if let Err(e) = self.storage.set(&self.config.records_key, &json).await {
            warn!("Failed to persist notification list: {e}");
        }
    }

    fn emit(&self, event: StoreEvent) {
        // send only fails when no subscriber exists, which is fine.
        let _ = self.events.send(event);
    }
}
