//! Typed store mutation events.
//!
//! The notification store emits one event per mutation on a broadcast
//! channel. UI renderers subscribe instead of polling the record list.

use serde::{Deserialize, Serialize};

use crate::types::record::NotificationRecord;

/// A mutation of the notification store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    /// A record was inserted.
    Added {
        /// The inserted record.
        record: NotificationRecord,
    },
    /// A batch of buffered records was flushed into the store.
    Flushed {
        /// Number of records in the batch.
        count: usize,
    },
    /// A record was marked read.
    Read {
        /// Record identity.
        id: String,
    },
    /// Every record was marked read.
    AllRead,
    /// A record was removed.
    Removed {
        /// Record identity.
        id: String,
    },
    /// All records were removed.
    Cleared,
}
