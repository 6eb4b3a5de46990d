//! Push-stream subscription configuration.

use serde::{Deserialize, Serialize};

/// Stream subscription manager configuration.
///
/// The reconnect delay grows as `2^attempt * backoff_base_ms`, capped at
/// `backoff_cap_ms`. After `max_reconnect_attempts` consecutive failures a
/// single extended retry is scheduled after `extended_retry_ms` and the
/// attempt counter resets, so the manager never permanently gives up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Maximum value of the reconnect attempt counter.
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    /// Base of the exponential backoff, in milliseconds.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    /// Upper bound on the exponential backoff delay, in milliseconds.
    #[serde(default = "default_backoff_cap_ms")]
    pub backoff_cap_ms: u64,
    /// Delay of the extended retry scheduled once the attempt counter is
    /// exhausted, in milliseconds.
    #[serde(default = "default_extended_retry_ms")]
    pub extended_retry_ms: u64,
    /// Interval between periodic health-check probes, in seconds.
    #[serde(default = "default_health_check_interval")]
    pub health_check_interval_seconds: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            max_reconnect_attempts: default_max_reconnect_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_cap_ms: default_backoff_cap_ms(),
            extended_retry_ms: default_extended_retry_ms(),
            health_check_interval_seconds: default_health_check_interval(),
        }
    }
}

fn default_max_reconnect_attempts() -> u32 {
    5
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_backoff_cap_ms() -> u64 {
    30_000
}

fn default_extended_retry_ms() -> u64 {
    60_000
}

fn default_health_check_interval() -> u64 {
    300
}
