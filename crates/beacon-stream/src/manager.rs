//! Push-stream subscription lifecycle: establish, watch, reconnect.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use beacon_core::config::stream::StreamConfig;
use beacon_core::error::AppError;
use beacon_core::result::AppResult;
use beacon_core::traits::push::{EventCallback, PushSource, SubscriptionHandle};
use beacon_core::types::event::PushEvent;
use beacon_delivery::ChannelDispatcher;

use crate::router::EventRouter;

/// Observable phase of the subscription lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionPhase {
    /// Not started yet.
    Unsubscribed,
    /// A subscribe call is in flight.
    Subscribing,
    /// The registration is live and events flow.
    Active,
    /// Waiting out a backoff delay before the next subscribe attempt.
    Reconnecting,
    /// Torn down; late callbacks are ignored and the manager is inert.
    TornDown,
}

/// Keeps the push-stream registration alive.
///
/// Failed subscribe attempts are retried with exponential backoff; once
/// the attempt counter is exhausted a single extended retry is scheduled
/// and the counter resets, so the manager never permanently gives up.
/// While active, a periodic probe of the delivery path triggers a
/// resubscribe on failure. Every processed event resets the counter.
pub struct SubscriptionManager {
    source: Arc<dyn PushSource>,
    router: Arc<EventRouter>,
    dispatcher: ChannelDispatcher,
    config: StreamConfig,
    /// Consecutive reconnect attempts, bounded by the configured maximum.
    attempts: AtomicU32,
    /// Bumped on every resubscribe and on teardown; events carrying a
    /// stale generation are dropped.
    generation: AtomicU64,
    phase_tx: watch::Sender<SubscriptionPhase>,
    cancel_tx: watch::Sender<bool>,
    events: Mutex<Option<mpsc::UnboundedSender<(u64, PushEvent)>>>,
    handle_slot: Mutex<Option<Box<dyn SubscriptionHandle>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl SubscriptionManager {
    pub fn new(
        source: Arc<dyn PushSource>,
        router: Arc<EventRouter>,
        dispatcher: ChannelDispatcher,
        config: StreamConfig,
    ) -> Self {
        let (phase_tx, _) = watch::channel(SubscriptionPhase::Unsubscribed);
        let (cancel_tx, _) = watch::channel(false);
        Self {
            source,
            router,
            dispatcher,
            config,
            attempts: AtomicU32::new(0),
            generation: AtomicU64::new(0),
            phase_tx,
            cancel_tx,
            events: Mutex::new(None),
            handle_slot: Mutex::new(None),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Start the subscription lifecycle.
    ///
    /// Spawns the supervising task and the event consumer. May only be
    /// called once; calling again or after teardown is a lifecycle error.
    pub fn start(self: &Arc<Self>) -> AppResult<()> {
        // Claim the lifecycle synchronously; a second call must fail even
        // before the supervisor task first runs.
        let claimed = self.phase_tx.send_if_modified(|phase| {
            if *phase == SubscriptionPhase::Unsubscribed {
                *phase = SubscriptionPhase::Subscribing;
                true
            } else {
                false
            }
        });
        if !claimed {
            return Err(AppError::lifecycle(format!(
                "Subscription manager cannot start from {:?}",
                self.phase()
            )));
        }

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        *self.lock_events() = Some(event_tx);

        let consumer = tokio::spawn(Arc::clone(self).consume_events(event_rx));
        let supervisor = tokio::spawn(Arc::clone(self).supervise(self.cancel_tx.subscribe()));

        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.push(consumer);
        tasks.push(supervisor);
        Ok(())
    }

    /// Tear the subscription down.
    ///
    /// Cancels the supervising tasks, unsubscribes the live registration,
    /// and bumps the generation so any callback still in flight is
    /// ignored. Terminal: the manager cannot be restarted.
    pub fn teardown(&self) {
        self.cancel_tx.send_replace(true);
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.lock_events() = None;
        if let Some(handle) = self.take_handle() {
            handle.unsubscribe();
        }
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        for task in tasks.drain(..) {
            task.abort();
        }
        self.phase_tx.send_replace(SubscriptionPhase::TornDown);
        info!("Subscription manager torn down");
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SubscriptionPhase {
        *self.phase_tx.borrow()
    }

    /// Watch lifecycle phase changes.
    pub fn watch_phase(&self) -> watch::Receiver<SubscriptionPhase> {
        self.phase_tx.subscribe()
    }

    /// Current value of the reconnect attempt counter.
    pub fn reconnect_attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    async fn supervise(self: Arc<Self>, mut cancel: watch::Receiver<bool>) {
        loop {
            if *cancel.borrow() {
                return;
            }
            self.set_phase(SubscriptionPhase::Subscribing);
            let generation = self.generation.load(Ordering::SeqCst);
            let callback = self.make_callback(generation);

            match self.source.subscribe(callback).await {
                Ok(handle) => {
                    *self.handle_slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
                    self.set_phase(SubscriptionPhase::Active);
                    info!("Push subscription established");

                    let unhealthy = self.watch_health(&mut cancel).await;
                    if let Some(handle) = self.take_handle() {
                        handle.unsubscribe();
                    }
                    if !unhealthy {
                        return;
                    }
                    self.generation.fetch_add(1, Ordering::SeqCst);
                }
                Err(e) => {
                    warn!(error = %e, "Push subscription attempt failed");
                }
            }

            self.set_phase(SubscriptionPhase::Reconnecting);
            let attempts = self.attempts.load(Ordering::SeqCst);
            let (delay, next_attempts) = backoff_delay(attempts, &self.config);
            self.attempts.store(next_attempts, Ordering::SeqCst);
            debug!(attempts, delay_ms = delay.as_millis() as u64, "Reconnect scheduled");

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        return;
                    }
                }
            }
        }
    }

    /// Probe the delivery path on the configured interval while active.
    ///
    /// Returns `true` when a probe failed and a resubscribe is needed,
    /// `false` when cancelled.
    async fn watch_health(&self, cancel: &mut watch::Receiver<bool>) -> bool {
        let period = Duration::from_secs(self.config.health_check_interval_seconds.max(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await; // immediate first tick
        loop {
            tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        return false;
                    }
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.dispatcher.probe().await {
                        warn!(error = %e, "Delivery health probe failed, resubscribing");
                        return true;
                    }
                }
            }
        }
    }

    /// Process arriving events to completion, one at a time, in order.
    async fn consume_events(
        self: Arc<Self>,
        mut events: mpsc::UnboundedReceiver<(u64, PushEvent)>,
    ) {
        while let Some((generation, event)) = events.recv().await {
            if generation != self.generation.load(Ordering::SeqCst) {
                debug!("Dropped event from stale subscription");
                continue;
            }
            self.router.route(event).await;
            self.attempts.store(0, Ordering::SeqCst);
        }
    }

    fn make_callback(&self, generation: u64) -> EventCallback {
        let sender = self.lock_events().clone();
        Arc::new(move |event| {
            if let Some(sender) = &sender {
                let _ = sender.send((generation, event));
            }
        })
    }

    fn set_phase(&self, phase: SubscriptionPhase) {
        // send_replace records the phase even with no live receiver;
        // phase() must stay accurate when nothing calls watch_phase().
        self.phase_tx.send_replace(phase);
    }

    fn take_handle(&self) -> Option<Box<dyn SubscriptionHandle>> {
        self.handle_slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }

    fn lock_events(
        &self,
    ) -> std::sync::MutexGuard<'_, Option<mpsc::UnboundedSender<(u64, PushEvent)>>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for SubscriptionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionManager")
            .field("phase", &self.phase())
            .field("attempts", &self.reconnect_attempts())
            .finish()
    }
}

/// Compute the delay before the next subscribe attempt and the new value
/// of the attempt counter.
fn backoff_delay(attempts: u32, config: &StreamConfig) -> (Duration, u32) {
    if attempts >= config.max_reconnect_attempts {
        (Duration::from_millis(config.extended_retry_ms), 0)
    } else {
        let exp = config.backoff_base_ms.saturating_mul(1u64 << attempts.min(63));
        let capped = exp.min(config.backoff_cap_ms);
        (Duration::from_millis(capped), attempts + 1)
    }
}
