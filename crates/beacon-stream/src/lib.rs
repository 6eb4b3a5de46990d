//! # beacon-stream
//!
//! Subscription side of the Beacon notification core: the
//! [`SubscriptionManager`] keeping the push-stream registration alive
//! through failures, and the [`EventRouter`] turning arriving events into
//! stored notifications.

pub mod manager;
pub mod router;

pub use manager::{SubscriptionManager, SubscriptionPhase};
pub use router::EventRouter;
