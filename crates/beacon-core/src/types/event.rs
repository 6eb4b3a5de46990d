//! Transient push-stream event type.

use serde::{Deserialize, Serialize};

/// An opaque message record delivered by the push source.
///
/// Never persisted directly; the stream router converts it into a
/// [`NotificationRecord`](super::record::NotificationRecord) before it
/// reaches the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushEvent {
    /// Stable sender identity.
    pub sender: String,
    /// Human-readable sender name.
    pub display_name: String,
    /// Message text body.
    pub text: String,
    /// Conversation this message belongs to.
    pub conversation_id: String,
    /// Whether the conversation is a group conversation.
    pub is_group: bool,
}
