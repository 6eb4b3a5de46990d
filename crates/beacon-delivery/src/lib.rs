//! # beacon-delivery
//!
//! Delivery side of the Beacon notification core. Provides:
//!
//! - The [`SoundAssetManager`] preloading the alert sound with bounded retry
//! - The [`FingerprintEngine`] deduplicating events within a time window
//! - The [`ChannelDispatcher`] walking ranked delivery channels with
//!   fallback and an at-most-once automatic redelivery
//! - Channel providers wrapping the injected native bridge and OS notifier

pub mod channels;
pub mod dedup;
pub mod dispatcher;
pub mod sound;

pub use channels::native::NativeBridgeChannel;
pub use channels::system::SystemNotifyChannel;
pub use dedup::{DeliveryTicket, Fingerprint, FingerprintEngine, delivery_fingerprint};
pub use dispatcher::ChannelDispatcher;
pub use sound::SoundAssetManager;
