//! Notification store configuration.

use serde::{Deserialize, Serialize};

/// Notification store and persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Root directory of the file-backed key/value storage.
    #[serde(default = "default_data_root")]
    pub data_root: String,
    /// Storage key under which the notification list is persisted.
    #[serde(default = "default_records_key")]
    pub records_key: String,
    /// Storage key under which the sound-enabled flag is persisted.
    #[serde(default = "default_sound_flag_key")]
    pub sound_flag_key: String,
    /// Maximum number of retained records; the oldest are trimmed on
    /// insert. `0` disables the cap.
    #[serde(default = "default_max_records")]
    pub max_records: usize,
    /// Buffer size of the store mutation event channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            records_key: default_records_key(),
            sound_flag_key: default_sound_flag_key(),
            max_records: default_max_records(),
            event_buffer_size: default_event_buffer(),
        }
    }
}

fn default_data_root() -> String {
    "data".to_string()
}

fn default_records_key() -> String {
    "notifications".to_string()
}

fn default_sound_flag_key() -> String {
    "sound_enabled".to_string()
}

fn default_max_records() -> usize {
    200
}

fn default_event_buffer() -> usize {
    256
}
