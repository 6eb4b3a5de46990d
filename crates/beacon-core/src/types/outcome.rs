//! Delivery outcome reported by the channel dispatcher.

use serde::{Deserialize, Serialize};

/// The result of a successful `deliver` call.
///
/// Failure of every channel is not an outcome; it surfaces to the
/// dispatcher's retry bookkeeping instead of to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// A concrete channel displayed the notification.
    Delivered {
        /// Name of the channel that succeeded.
        channel: String,
    },
    /// No channel was usable; the in-app record list is the visible surface.
    InApp,
}

impl DeliveryOutcome {
    /// Whether a dedicated visual channel handled the notification.
    pub fn is_channel(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}
