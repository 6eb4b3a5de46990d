//! # beacon-store
//!
//! Canonical notification collection for Beacon. Provides:
//!
//! - The ordered, persisted [`NotificationStore`] with read/unread state
//!   and typed mutation events
//! - The [`BackgroundQueue`] buffering events while the consuming surface
//!   is hidden, flushed on the visibility rising edge
//! - Key/value storage backends (in-memory and JSON files on disk)

pub mod queue;
pub mod seed;
pub mod storage;
pub mod store;

pub use queue::BackgroundQueue;
pub use storage::file::FileStorage;
pub use storage::memory::MemoryStorage;
pub use store::NotificationStore;
