//! Shared test helpers for integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use beacon_core::config::BeaconConfig;
use beacon_core::config::sound::SoundConfig;
use beacon_core::error::AppError;
use beacon_core::result::AppResult;
use beacon_core::traits::channel::ChannelProvider;
use beacon_core::traits::push::{EventCallback, PushSource, SubscriptionHandle};
use beacon_core::traits::sound::SoundSink;
use beacon_core::traits::storage::KvStorage;
use beacon_core::types::event::PushEvent;
use beacon_delivery::{ChannelDispatcher, FingerprintEngine, SoundAssetManager};
use beacon_store::{BackgroundQueue, MemoryStorage, NotificationStore};
use beacon_stream::{EventRouter, SubscriptionManager};

/// Fully wired notification core over in-memory storage and fake channels.
pub struct Harness {
    pub config: BeaconConfig,
    pub storage: Arc<MemoryStorage>,
    pub store: Arc<NotificationStore>,
    pub queue: Arc<BackgroundQueue>,
    pub dedup: Arc<FingerprintEngine>,
    pub dispatcher: ChannelDispatcher,
    pub router: Arc<EventRouter>,
}

impl Harness {
    /// Build the core with the given visibility and channel ranking.
    ///
    /// The persisted sound flag starts disabled so no test ever fetches
    /// the sound asset over the network.
    pub async fn new(visible: bool, channels: Vec<Arc<dyn ChannelProvider>>) -> Self {
        let mut config = BeaconConfig::default();
        // Keep the automatic redelivery fast enough for tests to observe.
        config.delivery.retry_delay_ms = 20;
        Self::with_config(config, visible, channels).await
    }

    pub async fn with_config(
        config: BeaconConfig,
        visible: bool,
        channels: Vec<Arc<dyn ChannelProvider>>,
    ) -> Self {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set(&config.store.sound_flag_key, "false")
            .await
            .expect("seed sound flag");

        let store = Arc::new(NotificationStore::new(
            Arc::clone(&storage) as Arc<dyn KvStorage>,
            config.store.clone(),
            &config.dedup,
        ));
        store.load().await;
        let queue = Arc::new(BackgroundQueue::new(Arc::clone(&store), visible));

        let sound_config = SoundConfig {
            asset_url: "http://127.0.0.1:9/alert.ogg".to_string(),
            fallback_url: "http://127.0.0.1:9/alert.mp3".to_string(),
            max_load_attempts: 1,
            retry_base_ms: 1,
        };
        let sound = Arc::new(SoundAssetManager::new(
            sound_config,
            &config.store,
            Arc::new(SilentSink),
            Arc::clone(&storage) as Arc<dyn KvStorage>,
        ));

        let dispatcher = ChannelDispatcher::new(channels, sound, config.delivery.clone());
        let dedup = Arc::new(FingerprintEngine::new(&config.dedup));
        let router = Arc::new(EventRouter::new(
            Arc::clone(&dedup),
            Arc::clone(&queue),
            dispatcher.clone(),
        ));

        Self {
            config,
            storage,
            store,
            queue,
            dedup,
            dispatcher,
            router,
        }
    }

    /// Wire a subscription manager on top of the harness.
    pub fn manager(
        &self,
        source: Arc<dyn PushSource>,
        stream: beacon_core::config::stream::StreamConfig,
    ) -> Arc<SubscriptionManager> {
        Arc::new(SubscriptionManager::new(
            source,
            Arc::clone(&self.router),
            self.dispatcher.clone(),
            stream,
        ))
    }
}

/// Poll `check` until it holds, advancing (possibly virtual) time.
///
/// The budget covers two minutes so paused-clock tests can wait out the
/// extended reconnect delay.
pub async fn wait_for<F: Fn() -> bool>(check: F) {
    for _ in 0..12_000 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached");
}

pub fn event(sender: &str, text: &str) -> PushEvent {
    PushEvent {
        sender: sender.to_string(),
        display_name: sender.to_string(),
        text: text.to_string(),
        conversation_id: format!("conv-{sender}"),
        is_group: false,
    }
}

/// Sound sink that swallows playback.
#[derive(Debug)]
pub struct SilentSink;

#[async_trait]
impl SoundSink for SilentSink {
    async fn play(&self, _data: bytes::Bytes) -> AppResult<()> {
        Ok(())
    }
}

/// Channel fake with a switchable availability flag and scripted failures.
#[derive(Debug)]
pub struct FakeChannel {
    channel_name: &'static str,
    available: AtomicBool,
    failures_left: AtomicUsize,
    delivered: Mutex<Vec<(String, String)>>,
}

impl FakeChannel {
    pub fn new(channel_name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            channel_name,
            available: AtomicBool::new(true),
            failures_left: AtomicUsize::new(0),
            delivered: Mutex::new(Vec::new()),
        })
    }

    pub fn unavailable(channel_name: &'static str) -> Arc<Self> {
        let channel = Self::new(channel_name);
        channel.available.store(false, Ordering::SeqCst);
        channel
    }

    pub fn failing(channel_name: &'static str, failures: usize) -> Arc<Self> {
        let channel = Self::new(channel_name);
        channel.failures_left.store(failures, Ordering::SeqCst);
        channel
    }

    pub fn delivered(&self) -> Vec<(String, String)> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn delivered_count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }
}

#[async_trait]
impl ChannelProvider for FakeChannel {
    fn name(&self) -> &'static str {
        self.channel_name
    }

    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn deliver(&self, title: &str, body: &str, _dismiss: Duration) -> AppResult<()> {
        if self.failures_left.load(Ordering::SeqCst) > 0 {
            self.failures_left.fetch_sub(1, Ordering::SeqCst);
            return Err(AppError::channel("scripted failure"));
        }
        self.delivered
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}

#[derive(Debug)]
pub struct FakeHandle {
    unsubscribes: Arc<AtomicUsize>,
}

impl SubscriptionHandle for FakeHandle {
    fn unsubscribe(&self) {
        self.unsubscribes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Push source that fails a scripted number of subscribe calls, then
/// succeeds and hands the callback to the test for driving.
pub struct ScriptedSource {
    failures: AtomicUsize,
    subscribes: AtomicUsize,
    pub unsubscribes: Arc<AtomicUsize>,
    callback: Mutex<Option<EventCallback>>,
}

impl ScriptedSource {
    pub fn new(failures: usize) -> Arc<Self> {
        Arc::new(Self {
            failures: AtomicUsize::new(failures),
            subscribes: AtomicUsize::new(0),
            unsubscribes: Arc::new(AtomicUsize::new(0)),
            callback: Mutex::new(None),
        })
    }

    pub fn subscribe_count(&self) -> usize {
        self.subscribes.load(Ordering::SeqCst)
    }

    pub fn emit(&self, event: PushEvent) {
        let callback = self.callback.lock().unwrap().clone();
        if let Some(callback) = callback {
            callback(event);
        }
    }
}

// The held callback is a bare closure, so Debug cannot be derived.
impl std::fmt::Debug for ScriptedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedSource")
            .field("subscribes", &self.subscribes)
            .finish()
    }
}

#[async_trait]
impl PushSource for ScriptedSource {
    async fn subscribe(&self, callback: EventCallback) -> AppResult<Box<dyn SubscriptionHandle>> {
        self.subscribes.fetch_add(1, Ordering::SeqCst);
        if self.failures.load(Ordering::SeqCst) > 0 {
            self.failures.fetch_sub(1, Ordering::SeqCst);
            return Err(AppError::subscription("scripted subscribe failure"));
        }
        *self.callback.lock().unwrap() = Some(callback);
        Ok(Box::new(FakeHandle {
            unsubscribes: Arc::clone(&self.unsubscribes),
        }))
    }
}
