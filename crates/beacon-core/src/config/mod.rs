//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Defaults carry the delivery-core timing constants so that an
//! empty configuration file yields a fully working setup.

pub mod dedup;
pub mod delivery;
pub mod logging;
pub mod sound;
pub mod store;
pub mod stream;

use serde::{Deserialize, Serialize};

use self::dedup::DedupConfig;
use self::delivery::DeliveryConfig;
use self::logging::LoggingConfig;
use self::sound::SoundConfig;
use self::store::StoreConfig;
use self::stream::StreamConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BeaconConfig {
    /// Channel dispatcher settings.
    #[serde(default)]
    pub delivery: DeliveryConfig,
    /// Push-stream subscription settings.
    #[serde(default)]
    pub stream: StreamConfig,
    /// Event deduplication settings.
    #[serde(default)]
    pub dedup: DedupConfig,
    /// Notification store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Sound asset settings.
    #[serde(default)]
    pub sound: SoundConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BeaconConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `BEACON_`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("BEACON")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
