//! Seed notifications used when storage is empty or unreadable.

use beacon_core::types::record::{NotificationKind, NotificationRecord};

/// The fixed record set a fresh (or corrupted) installation starts with.
pub fn seed_records() -> Vec<NotificationRecord> {
    vec![NotificationRecord::new(
        "Welcome to Beacon",
        "You will see new message alerts here.",
        NotificationKind::System,
    )]
}
