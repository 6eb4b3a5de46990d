//! Domain types shared across the Beacon crates.

pub mod event;
pub mod outcome;
pub mod record;

pub use event::PushEvent;
pub use outcome::DeliveryOutcome;
pub use record::{NotificationKind, NotificationRecord};
