//! OS-level notification service trait.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Outcome of an OS notification permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// The user granted notification permission.
    Granted,
    /// The user denied notification permission.
    Denied,
}

/// Trait for the permission-gated OS notification capability.
#[async_trait]
pub trait OsNotifier: Send + Sync + std::fmt::Debug + 'static {
    /// Ask the user for notification permission.
    ///
    /// The system channel provider calls this at most once per denied
    /// answer; a `Granted` result is cached.
    async fn request_permission(&self) -> AppResult<Permission>;

    /// Display a system notification that auto-dismisses after
    /// `auto_dismiss`.
    async fn show(&self, title: &str, body: &str, auto_dismiss: Duration) -> AppResult<()>;
}
