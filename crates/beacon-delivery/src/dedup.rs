//! Fingerprinting and deduplication of rapid events within a time window.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use beacon_core::config::dedup::DedupConfig;
use beacon_core::types::event::PushEvent;

/// A derived event identity.
///
/// The arrival timestamp is carried alongside the id as a first-class
/// field; nothing ever parses it back out of the id string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    /// Stable identity of the event within the dedup window.
    pub id: String,
    /// Arrival time in unix milliseconds.
    pub arrival_ms: i64,
}

/// Key/value record carried with a delivery attempt so a retry never has
/// to reconstruct the content from the fingerprint string.
#[derive(Debug, Clone)]
pub struct DeliveryTicket {
    /// Fingerprint id of the attempt.
    pub id: String,
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub message: String,
    /// Creation time of the attempt.
    pub created_at: DateTime<Utc>,
    /// Number of channel attempts made so far.
    pub attempts: u32,
}

/// Event deduplicator — suppresses repeats of an identity within a window.
///
/// Identities seen within `window_seconds` collide; the registry is purged
/// on a periodic sweep using the arrival timestamp stored per entry.
#[derive(Debug)]
pub struct FingerprintEngine {
    /// Suppression window.
    window: Duration,
    /// Registered id → arrival unix milliseconds.
    seen: Mutex<HashMap<String, i64>>,
}

impl FingerprintEngine {
    /// Create an engine with the configured window.
    pub fn new(config: &DedupConfig) -> Self {
        Self {
            window: Duration::from_secs(config.window_seconds),
            seen: Mutex::new(HashMap::new()),
        }
    }

    /// Derive the identity of a stream event.
    ///
    /// Combines conversation id, sender, the text plus an order-dependent
    /// character-code hash of it, and the arrival time quantized to the
    /// dedup window: identical wire deliveries inside one window collide,
    /// while the same content arriving in a later window gets a fresh
    /// identity. Carrying the raw text keeps distinct messages distinct
    /// even when their 32-bit hashes coincide.
    pub fn fingerprint_event(&self, event: &PushEvent, arrival: DateTime<Utc>) -> Fingerprint {
        let arrival_ms = arrival.timestamp_millis();
        let window_ms = self.window.as_millis() as i64;
        let bucket = arrival_ms.div_euclid(window_ms.max(1));
        let id = format!(
            "evt:{}:{}:{}:{}:{}",
            event.conversation_id,
            event.sender,
            event.text,
            char_hash(&event.text),
            bucket
        );
        Fingerprint { id, arrival_ms }
    }

    /// Check whether `fingerprint` was registered within the window,
    /// registering it when it was not.
    pub fn is_duplicate(&self, fingerprint: &Fingerprint) -> bool {
        let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
        let window_ms = self.window.as_millis() as i64;

        if let Some(registered_ms) = seen.get(&fingerprint.id) {
            if fingerprint.arrival_ms - registered_ms < window_ms {
                trace!(id = %fingerprint.id, "Suppressed duplicate event");
                return true;
            }
        }

        seen.insert(fingerprint.id.clone(), fingerprint.arrival_ms);
        false
    }

    /// Purge registrations older than the window.
    pub fn sweep(&self, now: DateTime<Utc>) {
        let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
        let window_ms = self.window.as_millis() as i64;
        let before = seen.len();
        seen.retain(|_, arrival_ms| now.timestamp_millis() - *arrival_ms < window_ms);
        if seen.len() != before {
            debug!(purged = before - seen.len(), "Swept dedup registry");
        }
    }

    /// Number of registered identities.
    pub fn registered(&self) -> usize {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Spawn the periodic sweep task.
    ///
    /// The caller owns the handle and must abort it on teardown.
    pub fn start_sweeper(self: &Arc<Self>, config: &DedupConfig) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        let interval = Duration::from_secs(config.sweep_interval_seconds.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await; // immediate first tick
            loop {
                ticker.tick().await;
                engine.sweep(Utc::now());
            }
        })
    }
}

/// Derive the identity of a delivery attempt from its content fields.
pub fn delivery_fingerprint(title: &str, message: &str, created_at: DateTime<Utc>) -> Fingerprint {
    let arrival_ms = created_at.timestamp_millis();
    let id = format!("ntf:{}:{}:{}", char_hash(title), char_hash(message), arrival_ms);
    Fingerprint { id, arrival_ms }
}

/// Order-dependent character-code hash.
fn char_hash(text: &str) -> u32 {
    text.chars()
        .fold(0u32, |hash, c| hash.wrapping_mul(31).wrapping_add(c as u32))
}
