//! Beacon Daemon — Notification Delivery Core
//!
//! Entry point that wires the store, delivery, and stream crates together
//! and runs them against demo platform bindings until shutdown.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing_subscriber::{EnvFilter, fmt};

use beacon_core::config::BeaconConfig;
use beacon_core::error::AppError;
use beacon_core::result::AppResult;
use beacon_core::traits::channel::ChannelProvider;
use beacon_core::traits::os_notify::{OsNotifier, Permission};
use beacon_core::traits::push::{EventCallback, PushSource, SubscriptionHandle};
use beacon_core::traits::sound::SoundSink;
use beacon_core::types::event::PushEvent;
use beacon_delivery::{
    ChannelDispatcher, FingerprintEngine, NativeBridgeChannel, SoundAssetManager,
    SystemNotifyChannel,
};
use beacon_store::{BackgroundQueue, FileStorage, NotificationStore};
use beacon_stream::{EventRouter, SubscriptionManager};

#[tokio::main]
async fn main() {
    let env = std::env::var("BEACON_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match BeaconConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Daemon error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &BeaconConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main daemon run function
async fn run(config: BeaconConfig) -> Result<(), AppError> {
    tracing::info!("Starting Beacon v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Storage + notification store ─────────────────────
    let storage = Arc::new(FileStorage::new(&config.store.data_root).await?);
    let store = Arc::new(NotificationStore::new(
        Arc::clone(&storage) as _,
        config.store.clone(),
        &config.dedup,
    ));
    store.load().await;
    tracing::info!(records = store.len(), "Notification store loaded");

    // ── Step 2: Background queue ─────────────────────────────────
    // The daemon has no real UI surface; treat it as always visible.
    let queue = Arc::new(BackgroundQueue::new(Arc::clone(&store), true));

    // ── Step 3: Sound + delivery channels ────────────────────────
    let sound = Arc::new(SoundAssetManager::new(
        config.sound.clone(),
        &config.store,
        Arc::new(LogSink),
        Arc::clone(&storage) as _,
    ));
    sound.ensure_ready().await;

    let channels: Vec<Arc<dyn ChannelProvider>> = vec![
        Arc::new(NativeBridgeChannel::new(None)),
        Arc::new(SystemNotifyChannel::new(Arc::new(LogNotifier))),
    ];
    let dispatcher = ChannelDispatcher::new(channels, sound, config.delivery.clone());
    tracing::info!("Channel dispatcher initialized");

    // ── Step 4: Dedup engine + sweeper ───────────────────────────
    let dedup = Arc::new(FingerprintEngine::new(&config.dedup));
    let sweeper = dedup.start_sweeper(&config.dedup);

    // ── Step 5: Event router + subscription manager ──────────────
    let router = Arc::new(EventRouter::new(
        Arc::clone(&dedup),
        Arc::clone(&queue),
        dispatcher.clone(),
    ));
    let source = Arc::new(DemoPushSource::new(Duration::from_secs(20)));
    let manager = Arc::new(SubscriptionManager::new(
        source,
        Arc::clone(&router),
        dispatcher,
        config.stream.clone(),
    ));
    manager.start()?;
    tracing::info!("Subscription manager started");

    // ── Step 6: Log store events ─────────────────────────────────
    let mut store_events = store.subscribe();
    let event_logger = tokio::spawn(async move {
        while let Ok(event) = store_events.recv().await {
            tracing::info!(?event, "Store event");
        }
    });

    // ── Step 7: Run until shutdown ───────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, tearing down...");

    manager.teardown();
    sweeper.abort();
    event_logger.abort();

    tracing::info!("Beacon daemon shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Sound sink that logs playback instead of touching audio hardware.
#[derive(Debug)]
struct LogSink;

#[async_trait]
impl SoundSink for LogSink {
    async fn play(&self, data: bytes::Bytes) -> AppResult<()> {
        tracing::info!(bytes = data.len(), "Playing alert sound");
        Ok(())
    }
}

/// OS notifier that grants permission and logs notifications.
#[derive(Debug)]
struct LogNotifier;

#[async_trait]
impl OsNotifier for LogNotifier {
    async fn request_permission(&self) -> AppResult<Permission> {
        Ok(Permission::Granted)
    }

    async fn show(&self, title: &str, body: &str, auto_dismiss: Duration) -> AppResult<()> {
        tracing::info!(title, body, dismiss_ms = auto_dismiss.as_millis() as u64, "OS notification");
        Ok(())
    }
}

/// Push source emitting a synthetic message on a fixed interval.
#[derive(Debug)]
struct DemoPushSource {
    period: Duration,
}

impl DemoPushSource {
    fn new(period: Duration) -> Self {
        Self { period }
    }
}

#[derive(Debug)]
struct DemoHandle {
    task: tokio::task::JoinHandle<()>,
}

impl SubscriptionHandle for DemoHandle {
    fn unsubscribe(&self) {
        self.task.abort();
    }
}

#[async_trait]
impl PushSource for DemoPushSource {
    async fn subscribe(&self, callback: EventCallback) -> AppResult<Box<dyn SubscriptionHandle>> {
        let period = self.period;
        let task = tokio::spawn(async move {
            let mut counter = 0u64;
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                counter += 1;
                callback(PushEvent {
                    sender: "demo".to_string(),
                    display_name: "Demo".to_string(),
                    text: format!("Synthetic message #{}", counter),
                    conversation_id: "demo-conversation".to_string(),
                    is_group: false,
                });
            }
        });
        Ok(Box::new(DemoHandle { task }))
    }
}
