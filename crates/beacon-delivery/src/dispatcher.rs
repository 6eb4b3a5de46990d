//! Ranked-channel delivery with fallback, failure bookkeeping, and an
//! at-most-once automatic redelivery.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tracing::{debug, info, warn};

use beacon_core::config::delivery::DeliveryConfig;
use beacon_core::error::AppError;
use beacon_core::result::AppResult;
use beacon_core::traits::channel::ChannelProvider;
use beacon_core::types::outcome::DeliveryOutcome;

use crate::dedup::{DeliveryTicket, delivery_fingerprint};
use crate::sound::SoundAssetManager;

/// Walks delivery channels in rank order until one succeeds.
///
/// The sound plays first regardless of which channel wins. When every
/// available channel raises, the attempt is parked in a failed-set and a
/// single automatic redelivery is scheduled; a manual [`retry`] in the
/// interim takes the ticket and cancels the automatic one.
///
/// [`retry`]: ChannelDispatcher::retry
#[derive(Debug, Clone)]
pub struct ChannelDispatcher {
    channels: Vec<Arc<dyn ChannelProvider>>,
    sound: Arc<SoundAssetManager>,
    config: DeliveryConfig,
    failed: Arc<DashMap<String, DeliveryTicket>>,
}

impl ChannelDispatcher {
    /// Create a dispatcher over `channels`, highest priority first.
    pub fn new(
        channels: Vec<Arc<dyn ChannelProvider>>,
        sound: Arc<SoundAssetManager>,
        config: DeliveryConfig,
    ) -> Self {
        Self {
            channels,
            sound,
            config,
            failed: Arc::new(DashMap::new()),
        }
    }

    /// Deliver a notification through the first willing channel.
    ///
    /// `dismiss_hint` overrides the configured auto-dismiss duration.
    /// Falling through every channel because none is available is not an
    /// error; the caller renders in-app instead. `Err` means every
    /// available channel raised, in which case the automatic redelivery
    /// has already been scheduled.
    pub async fn deliver(
        &self,
        title: &str,
        message: &str,
        dismiss_hint: Option<Duration>,
    ) -> AppResult<DeliveryOutcome> {
        let created_at = Utc::now();
        let ticket = DeliveryTicket {
            id: delivery_fingerprint(title, message, created_at).id,
            title: title.to_string(),
            message: message.to_string(),
            created_at,
            attempts: 0,
        };
        self.deliver_ticket(ticket, dismiss_hint, true).await
    }

    /// Play the alert sound without delivering anything.
    ///
    /// Used for events that the visible surface renders itself.
    pub async fn play_sound(&self) {
        self.sound.play().await;
    }

    /// Manually retry a parked failed delivery.
    ///
    /// Returns `false` when the id is not in the failed-set (already
    /// retried, or never failed). Taking the ticket here also cancels the
    /// pending automatic redelivery for it.
    pub async fn retry(&self, id: &str) -> bool {
        let Some((_, ticket)) = self.failed.remove(id) else {
            return false;
        };
        info!(id, "Manual redelivery of failed notification");
        let _ = self.deliver_ticket(ticket, None, false).await;
        true
    }

    /// Number of deliveries currently parked as failed.
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Verify the delivery path without rendering anything.
    ///
    /// A missing sound asset gets its preload re-kicked but does not make
    /// the path unhealthy; only a channel raising does.
    pub async fn probe(&self) -> AppResult<()> {
        if !self.sound.is_ready().await {
            self.sound.ensure_ready().await;
        }
        for channel in &self.channels {
            channel.probe().await?;
        }
        Ok(())
    }

    async fn deliver_ticket(
        &self,
        mut ticket: DeliveryTicket,
        dismiss_hint: Option<Duration>,
        allow_auto_retry: bool,
    ) -> AppResult<DeliveryOutcome> {
        self.sound.play().await;

        let dismiss_after =
            dismiss_hint.unwrap_or(Duration::from_millis(self.config.default_dismiss_ms));
        let mut raised = 0usize;

        for channel in &self.channels {
            if !channel.is_available().await {
                debug!(channel = channel.name(), "Channel unavailable, falling through");
                continue;
            }
            ticket.attempts += 1;
            match channel.deliver(&ticket.title, &ticket.message, dismiss_after).await {
                Ok(()) => {
                    self.failed.remove(&ticket.id);
                    debug!(channel = channel.name(), id = %ticket.id, "Notification delivered");
                    return Ok(DeliveryOutcome::Delivered {
                        channel: channel.name().to_string(),
                    });
                }
                Err(e) => {
                    warn!(channel = channel.name(), error = %e, "Channel delivery failed");
                    raised += 1;
                }
            }
        }

        if raised == 0 {
            // No channel was even available: quiet in-app fallthrough.
            return Ok(DeliveryOutcome::InApp);
        }

        if allow_auto_retry {
            self.park_and_schedule_retry(ticket.clone());
        }
        Err(AppError::channel(format!(
            "All {} available channel(s) failed for {} after {} attempt(s)",
            raised, ticket.id, ticket.attempts
        )))
    }

    /// Park a failed ticket and schedule its one automatic redelivery.
    ///
    /// The retry only fires if the ticket is still parked when the delay
    /// elapses; a manual retry in the interim removes it first.
    fn park_and_schedule_retry(&self, ticket: DeliveryTicket) {
        let id = ticket.id.clone();
        self.failed.insert(id.clone(), ticket);

        let dispatcher = self.clone();
        let delay = Duration::from_millis(self.config.retry_delay_ms);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some((_, ticket)) = dispatcher.failed.remove(&id) else {
                return;
            };
            info!(
                id = %ticket.id,
                attempts = ticket.attempts,
                "Automatic redelivery of failed notification"
            );
            if let Err(e) = dispatcher.deliver_ticket(ticket, None, false).await {
                warn!(error = %e, "Automatic redelivery failed, giving up");
            }
        });
    }
}
