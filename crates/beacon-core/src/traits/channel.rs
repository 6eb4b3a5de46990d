//! Delivery channel provider trait.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// One ranked delivery strategy of the channel dispatcher.
///
/// Providers are iterated in priority order; the first available one that
/// delivers without error wins. An error from `deliver` means "try the
/// next channel" and is never surfaced to the user.
#[async_trait]
pub trait ChannelProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Short channel name used in logs and outcomes (e.g., "native_bridge").
    fn name(&self) -> &'static str;

    /// Whether this channel can currently deliver.
    ///
    /// Also used by the health probe, which must not render anything.
    async fn is_available(&self) -> bool;

    /// Display a notification, auto-dismissing after `dismiss_after` where
    /// the channel supports it.
    async fn deliver(&self, title: &str, body: &str, dismiss_after: Duration) -> AppResult<()>;

    /// Verify the channel plumbing without rendering anything.
    ///
    /// The default treats a completed availability check as healthy;
    /// providers with a real non-rendering check override this.
    async fn probe(&self) -> AppResult<()> {
        self.is_available().await;
        Ok(())
    }
}
