//! Sound asset configuration.

use serde::{Deserialize, Serialize};

/// Alert sound asset configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundConfig {
    /// URL of the preferred alert sound asset.
    #[serde(default = "default_asset_url")]
    pub asset_url: String,
    /// URL of the alternate-encoding fallback asset.
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,
    /// Maximum number of preload attempts before the asset is marked
    /// unavailable.
    #[serde(default = "default_max_load_attempts")]
    pub max_load_attempts: u32,
    /// Base of the preload retry backoff, in milliseconds
    /// (delay = `2^attempt * retry_base_ms`).
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            asset_url: default_asset_url(),
            fallback_url: default_fallback_url(),
            max_load_attempts: default_max_load_attempts(),
            retry_base_ms: default_retry_base_ms(),
        }
    }
}

fn default_asset_url() -> String {
    "https://assets.beacon.local/sounds/alert.ogg".to_string()
}

fn default_fallback_url() -> String {
    "https://assets.beacon.local/sounds/alert.mp3".to_string()
}

fn default_max_load_attempts() -> u32 {
    3
}

fn default_retry_base_ms() -> u64 {
    1000
}
