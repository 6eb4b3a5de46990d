//! Native host bridge trait.

use async_trait::async_trait;

use crate::result::AppResult;

/// Optional platform bridge present only inside certain host containers.
///
/// The common case is absence (`Option<Arc<dyn NativeBridge>>` is `None`).
/// `display` is best effort with no delivery confirmation; an error return
/// means "try the next channel", never a user-visible failure.
#[async_trait]
pub trait NativeBridge: Send + Sync + std::fmt::Debug + 'static {
    /// Display a notification through the host container.
    async fn display(&self, title: &str, body: &str) -> AppResult<()>;
}
