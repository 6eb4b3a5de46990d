//! Event deduplication configuration.

use serde::{Deserialize, Serialize};

/// Fingerprint/dedup engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupConfig {
    /// Window within which a repeated fingerprint is suppressed, in seconds.
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,
    /// Interval of the registry sweep that purges expired fingerprints,
    /// in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    /// Window of the coarser store-level duplicate check (same text and
    /// kind), in milliseconds.
    #[serde(default = "default_store_window_ms")]
    pub store_window_ms: i64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            window_seconds: default_window_seconds(),
            sweep_interval_seconds: default_sweep_interval(),
            store_window_ms: default_store_window_ms(),
        }
    }
}

fn default_window_seconds() -> u64 {
    300
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_store_window_ms() -> i64 {
    5000
}
