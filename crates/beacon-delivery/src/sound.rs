//! Alert sound asset lifecycle: preload with bounded retry, ad-hoc
//! load-and-play fallback, and the persisted enable/disable flag.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use beacon_core::config::sound::SoundConfig;
use beacon_core::config::store::StoreConfig;
use beacon_core::error::AppError;
use beacon_core::result::AppResult;
use beacon_core::traits::sound::SoundSink;
use beacon_core::traits::storage::KvStorage;

/// Preload state of the alert sound asset.
#[derive(Debug, Clone)]
enum AssetState {
    NotLoaded,
    Loading,
    Ready(Bytes),
    Unavailable,
}

/// Owns the alert sound asset and the injected playback sink.
///
/// Playback failures are never surfaced to callers: the alert sound is
/// decorative and a missing or broken asset must not affect delivery.
pub struct SoundAssetManager {
    config: SoundConfig,
    sink: Arc<dyn SoundSink>,
    storage: Arc<dyn KvStorage>,
    sound_flag_key: String,
    state: Mutex<AssetState>,
    client: reqwest::Client,
}

impl SoundAssetManager {
    pub fn new(
        config: SoundConfig,
        store_config: &StoreConfig,
        sink: Arc<dyn SoundSink>,
        storage: Arc<dyn KvStorage>,
    ) -> Self {
        Self {
            config,
            sink,
            storage,
            sound_flag_key: store_config.sound_flag_key.clone(),
            state: Mutex::new(AssetState::NotLoaded),
            client: reqwest::Client::new(),
        }
    }

    /// Kick off the background preload of the sound asset.
    ///
    /// Idempotent: a load already in flight or a ready asset is left
    /// alone; a campaign that previously gave up is restarted. Retries
    /// with exponential backoff up to the configured attempt limit, then
    /// marks the asset unavailable until the next call.
    pub async fn ensure_ready(self: &Arc<Self>) {
        {
            let mut state = self.state.lock().await;
            match *state {
                AssetState::NotLoaded | AssetState::Unavailable => {
                    *state = AssetState::Loading;
                }
                _ => return,
            }
        }

        let manager = Arc::clone(self);
        tokio::spawn(async move {
            let attempts = manager.config.max_load_attempts.max(1);
            for attempt in 0..attempts {
                if attempt > 0 {
                    let delay = manager
                        .config
                        .retry_base_ms
                        .saturating_mul(1u64 << attempt.min(20));
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                match manager.fetch(&manager.config.asset_url).await {
                    Ok(data) => {
                        info!(bytes = data.len(), "Alert sound asset preloaded");
                        *manager.state.lock().await = AssetState::Ready(data);
                        return;
                    }
                    Err(e) => {
                        warn!(attempt = attempt + 1, error = %e, "Sound asset load failed");
                    }
                }
            }
            *manager.state.lock().await = AssetState::Unavailable;
        });
    }

    /// Whether the preloaded asset is available for playback.
    pub async fn is_ready(&self) -> bool {
        matches!(*self.state.lock().await, AssetState::Ready(_))
    }

    /// Play the alert sound, if sounds are enabled.
    ///
    /// Prefers the preloaded asset; falls back to an ad-hoc one-shot
    /// fetch, then to the alternate encoding, then gives up with a log
    /// line. Never returns an error.
    pub async fn play(self: &Arc<Self>) {
        if !self.sound_enabled().await {
            debug!("Alert sound disabled, skipping playback");
            return;
        }

        let preloaded = match &*self.state.lock().await {
            AssetState::Ready(data) => Some(data.clone()),
            _ => None,
        };
        if let Some(data) = preloaded {
            match self.sink.play(data).await {
                Ok(()) => return,
                Err(e) => warn!(error = %e, "Preloaded sound playback failed"),
            }
        } else {
            // Not preloaded yet; make sure a preload is in flight for
            // next time while we do a one-shot below.
            self.ensure_ready().await;
        }

        if self.fetch_and_play(&self.config.asset_url).await.is_ok() {
            return;
        }
        if let Err(e) = self.fetch_and_play(&self.config.fallback_url).await {
            warn!(error = %e, "Alert sound unavailable in every encoding");
        }
    }

    /// Read the persisted enable flag; missing or unreadable means enabled.
    pub async fn sound_enabled(&self) -> bool {
        match self.storage.get(&self.sound_flag_key).await {
            Ok(Some(raw)) => serde_json::from_str::<bool>(&raw).unwrap_or(true),
            Ok(None) => true,
            Err(e) => {
                warn!(error = %e, "Could not read sound flag, defaulting to enabled");
                true
            }
        }
    }

    /// Persist the enable flag.
    pub async fn set_sound_enabled(&self, enabled: bool) -> AppResult<()> {
        self.storage
            .set(&self.sound_flag_key, &enabled.to_string())
            .await
    }

    /// Seed the preloaded asset directly, bypassing the network fetch.
    #[cfg(test)]
    pub(crate) async fn preload_for_tests(&self, data: Bytes) {
        *self.state.lock().await = AssetState::Ready(data);
    }

    /// Whether a preload campaign is currently in flight.
    #[cfg(test)]
    pub(crate) async fn is_preloading(&self) -> bool {
        matches!(*self.state.lock().await, AssetState::Loading)
    }

    async fn fetch_and_play(&self, url: &str) -> AppResult<()> {
        let data = self.fetch(url).await?;
        self.sink.play(data).await
    }

    async fn fetch(&self, url: &str) -> AppResult<Bytes> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::asset(format!("Failed to fetch sound asset: {}", e)))?;
        if !response.status().is_success() {
            return Err(AppError::asset(format!(
                "Sound asset fetch returned status {}",
                response.status()
            )));
        }
        response
            .bytes()
            .await
            .map_err(|e| AppError::asset(format!("Failed to read sound asset body: {}", e)))
    }
}

impl std::fmt::Debug for SoundAssetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundAssetManager")
            .field("asset_url", &self.config.asset_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct CountingSink {
        plays: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl SoundSink for CountingSink {
        async fn play(&self, _data: Bytes) -> AppResult<()> {
            self.plays.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(AppError::asset("sink rejected playback"))
            } else {
                Ok(())
            }
        }
    }

    #[derive(Debug)]
    struct MemoryFlagStorage {
        value: Mutex<Option<String>>,
    }

    #[async_trait]
    impl KvStorage for MemoryFlagStorage {
        async fn get(&self, _key: &str) -> AppResult<Option<String>> {
            Ok(self.value.lock().await.clone())
        }
        async fn set(&self, _key: &str, value: &str) -> AppResult<()> {
            *self.value.lock().await = Some(value.to_string());
            Ok(())
        }
        async fn remove(&self, _key: &str) -> AppResult<()> {
            *self.value.lock().await = None;
            Ok(())
        }
    }

    fn make_manager(sink_fails: bool, flag: Option<&str>) -> (Arc<SoundAssetManager>, Arc<CountingSink>) {
        // Unroutable URLs so every fetch fails fast; the asset itself is
        // exercised through the injected state below where needed.
        let config = SoundConfig {
            asset_url: "http://127.0.0.1:9/alert.ogg".to_string(),
            fallback_url: "http://127.0.0.1:9/alert.mp3".to_string(),
            max_load_attempts: 1,
            retry_base_ms: 1,
        };
        let sink = Arc::new(CountingSink {
            plays: AtomicUsize::new(0),
            fail: sink_fails,
        });
        let storage = Arc::new(MemoryFlagStorage {
            value: Mutex::new(flag.map(str::to_string)),
        });
        let manager = Arc::new(SoundAssetManager::new(
            config,
            &StoreConfig::default(),
            sink.clone(),
            storage,
        ));
        (manager, sink)
    }

    async fn inject_ready(manager: &SoundAssetManager, data: &[u8]) {
        *manager.state.lock().await = AssetState::Ready(Bytes::copy_from_slice(data));
    }

    #[tokio::test]
    async fn test_play_uses_preloaded_asset() {
        let (manager, sink) = make_manager(false, None);
        inject_ready(&manager, b"ogg-bytes").await;
        manager.play().await;
        assert_eq!(sink.plays.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_play_skipped_when_disabled() {
        let (manager, sink) = make_manager(false, Some("false"));
        inject_ready(&manager, b"ogg-bytes").await;
        manager.play().await;
        assert_eq!(sink.plays.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_flag_means_enabled() {
        let (manager, _) = make_manager(false, None);
        assert!(manager.sound_enabled().await);
    }

    #[tokio::test]
    async fn test_unreadable_flag_means_enabled() {
        let (manager, _) = make_manager(false, Some("not-a-bool"));
        assert!(manager.sound_enabled().await);
    }

    #[tokio::test]
    async fn test_set_sound_enabled_round_trips() {
        let (manager, sink) = make_manager(false, None);
        inject_ready(&manager, b"ogg-bytes").await;
        manager.set_sound_enabled(false).await.unwrap();
        assert!(!manager.sound_enabled().await);
        manager.play().await;
        assert_eq!(sink.plays.load(Ordering::SeqCst), 0);

        manager.set_sound_enabled(true).await.unwrap();
        manager.play().await;
        assert_eq!(sink.plays.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_play_never_errors_when_everything_fails() {
        // No preloaded asset and unroutable URLs: play must come back
        // quietly rather than propagate.
        let (manager, sink) = make_manager(false, None);
        manager.play().await;
        assert_eq!(sink.plays.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unavailable_asset_restarts_preload() {
        let (manager, _) = make_manager(false, None);
        *manager.state.lock().await = AssetState::Unavailable;
        manager.ensure_ready().await;
        // The new campaign is claimed before the fetch task runs.
        assert!(manager.is_preloading().await);
    }

    #[tokio::test]
    async fn test_failed_preload_settles_unavailable() {
        let (manager, _) = make_manager(false, None);
        manager.ensure_ready().await;
        // Single attempt against an unroutable address settles quickly.
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let state = manager.state.lock().await.clone();
            if matches!(state, AssetState::Unavailable) {
                return;
            }
        }
        panic!("preload did not settle");
    }
}
