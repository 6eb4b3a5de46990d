//! Provider traits for the narrow external interfaces of the delivery core.
//!
//! Every external collaborator (push source, native bridge, OS notifier,
//! sound sink, durable storage) is consumed through one of these traits.
//! The [`ChannelProvider`](channel::ChannelProvider) trait additionally
//! models one ranked delivery strategy of the channel dispatcher.

pub mod bridge;
pub mod channel;
pub mod os_notify;
pub mod push;
pub mod sound;
pub mod storage;

pub use bridge::NativeBridge;
pub use channel::ChannelProvider;
pub use os_notify::{OsNotifier, Permission};
pub use push::{EventCallback, PushSource, SubscriptionHandle};
pub use sound::SoundSink;
pub use storage::KvStorage;
