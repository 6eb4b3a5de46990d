//! Channel dispatcher configuration.

use serde::{Deserialize, Serialize};

/// Channel fallback dispatcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Default auto-dismiss duration for system notifications, in
    /// milliseconds, used when the caller gives no duration hint.
    #[serde(default = "default_dismiss_ms")]
    pub default_dismiss_ms: u64,
    /// Delay before the single automatic redelivery of a failed
    /// notification, in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            default_dismiss_ms: default_dismiss_ms(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_dismiss_ms() -> u64 {
    5000
}

fn default_retry_delay_ms() -> u64 {
    1000
}
