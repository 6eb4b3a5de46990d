//! Push/message source trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::event::PushEvent;

/// Callback invoked by the push source for every arriving event.
///
/// Callbacks fire in arrival order; the subscription manager processes each
/// to completion before the next is started.
pub type EventCallback = Arc<dyn Fn(PushEvent) + Send + Sync>;

/// A live subscription to the push source.
///
/// Dropping the handle without calling [`unsubscribe`](Self::unsubscribe)
/// leaks the remote registration; the subscription manager always calls it
/// on teardown and on resubscribe.
pub trait SubscriptionHandle: Send + Sync + std::fmt::Debug {
    /// Cancel the subscription. Best effort, never fails.
    fn unsubscribe(&self);
}

/// Trait for the external push/message source.
///
/// The source may fail synchronously (error return) or silently stop
/// delivering without any signal; the subscription manager treats both as
/// grounds for reconnection.
#[async_trait]
pub trait PushSource: Send + Sync + std::fmt::Debug + 'static {
    /// Register `callback` to be invoked for every new event.
    ///
    /// Returns a handle used to cancel the registration.
    async fn subscribe(&self, callback: EventCallback) -> AppResult<Box<dyn SubscriptionHandle>>;
}
