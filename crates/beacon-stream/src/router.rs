//! Turns arriving push events into stored notifications and alerts.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use beacon_core::types::event::PushEvent;
use beacon_core::types::outcome::DeliveryOutcome;
use beacon_core::types::record::{NotificationKind, NotificationRecord};
use beacon_delivery::{ChannelDispatcher, FingerprintEngine};
use beacon_store::BackgroundQueue;

/// Routes events from the push stream into the store, and manual alerts
/// through the channel dispatcher.
#[derive(Debug)]
pub struct EventRouter {
    dedup: Arc<FingerprintEngine>,
    queue: Arc<BackgroundQueue>,
    dispatcher: ChannelDispatcher,
}

impl EventRouter {
    pub fn new(
        dedup: Arc<FingerprintEngine>,
        queue: Arc<BackgroundQueue>,
        dispatcher: ChannelDispatcher,
    ) -> Self {
        Self {
            dedup,
            queue,
            dispatcher,
        }
    }

    /// Handle one event from the push stream.
    ///
    /// Duplicates within the dedup window are dropped. Fresh events become
    /// notification records; while the surface is visible they go straight
    /// into the store with the alert sound as a side effect, otherwise
    /// they wait in the background queue.
    pub async fn route(&self, event: PushEvent) {
        let arrival = Utc::now();
        let fingerprint = self.dedup.fingerprint_event(&event, arrival);
        if self.dedup.is_duplicate(&fingerprint) {
            debug!(id = %fingerprint.id, "Dropped duplicate stream event");
            return;
        }

        let record = Self::to_record(&fingerprint.id, event);
        let stored_directly = self.queue.submit(record).await;
        if stored_directly {
            self.dispatcher.play_sound().await;
        }
    }

    /// Deliver a notification that did not come from the stream.
    ///
    /// Used for app-originated alerts; does not touch the store. Delivery
    /// failure is absorbed here, the dispatcher has already scheduled its
    /// redelivery.
    pub async fn alert(&self, title: &str, message: &str) -> DeliveryOutcome {
        match self.dispatcher.deliver(title, message, None).await {
            Ok(outcome) => outcome,
            Err(e) => {
                debug!(error = %e, "Alert delivery failed, redelivery scheduled");
                DeliveryOutcome::InApp
            }
        }
    }

    /// Fire a real test notification through the delivery path.
    ///
    /// Returns `true` when delivery completed without every channel
    /// failing. Unlike the periodic probe, this renders a visible
    /// notification on purpose.
    pub async fn self_test(&self) -> bool {
        info!("Running notification self-test");
        self.dispatcher
            .deliver("Beacon", "Test notification", None)
            .await
            .is_ok()
    }

    fn to_record(id: &str, event: PushEvent) -> NotificationRecord {
        let kind = if event.is_group {
            NotificationKind::Group
        } else {
            NotificationKind::Message
        };
        let title = if event.display_name.is_empty() {
            "New message".to_string()
        } else {
            event.display_name.clone()
        };
        let mut record = NotificationRecord::new(&title, &event.text, kind)
            .with_conversation(&event.conversation_id)
            .with_sender(&event.sender);
        record.id = id.to_string();
        record
    }
}
