//! Durable notification record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of a stored notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Locally generated or administrative notification.
    System,
    /// Direct message from another user.
    Message,
    /// Message in a group conversation.
    Group,
}

impl NotificationKind {
    /// String form used in logs and storage keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Message => "message",
            Self::Group => "group",
        }
    }
}

/// A durable, user-visible notification.
///
/// Records are unique by `id` within the store and kept in
/// reverse-chronological order (newest first).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// Opaque unique identity.
    pub id: String,
    /// Short title shown by every channel.
    pub title: String,
    /// Message body.
    pub message: String,
    /// Whether the user has read this notification.
    #[serde(default)]
    pub read: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Notification kind.
    pub kind: NotificationKind,
    /// Conversation or group the notification belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    /// Display name of the sender, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
}

impl NotificationRecord {
    /// Create an unread record with a fresh identity and the current time.
    pub fn new(title: impl Into<String>, message: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            message: message.into(),
            read: false,
            created_at: Utc::now(),
            kind,
            conversation_id: None,
            sender: None,
        }
    }

    /// Create a system notification.
    pub fn system(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, NotificationKind::System)
    }

    /// Attach a conversation id.
    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    /// Attach a sender display name.
    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }
}
