//! Highest-ranked channel: the embedding shell's native bridge.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use beacon_core::error::AppError;
use beacon_core::result::AppResult;
use beacon_core::traits::bridge::NativeBridge;
use beacon_core::traits::channel::ChannelProvider;

/// Delivers through the native bridge when the host shell injected one.
///
/// The bridge is absent in plain browser/desktop contexts; the channel
/// then reports unavailable and the dispatcher falls through.
pub struct NativeBridgeChannel {
    bridge: Option<Arc<dyn NativeBridge>>,
}

impl NativeBridgeChannel {
    pub fn new(bridge: Option<Arc<dyn NativeBridge>>) -> Self {
        Self { bridge }
    }
}

#[async_trait]
impl ChannelProvider for NativeBridgeChannel {
    fn name(&self) -> &'static str {
        "native_bridge"
    }

    async fn is_available(&self) -> bool {
        self.bridge.is_some()
    }

    async fn deliver(&self, title: &str, body: &str, _dismiss_after: Duration) -> AppResult<()> {
        let bridge = self
            .bridge
            .as_ref()
            .ok_or_else(|| AppError::channel("Native bridge is not present"))?;
        bridge.display(title, body).await?;
        debug!(title, "Delivered via native bridge");
        Ok(())
    }
}

impl std::fmt::Debug for NativeBridgeChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeBridgeChannel")
            .field("present", &self.bridge.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingBridge {
        shown: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl NativeBridge for RecordingBridge {
        async fn display(&self, title: &str, body: &str) -> AppResult<()> {
            self.shown
                .lock()
                .unwrap()
                .push((title.to_string(), body.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_absent_bridge_is_unavailable() {
        let channel = NativeBridgeChannel::new(None);
        assert!(!channel.is_available().await);
        let result = channel
            .deliver("T", "B", Duration::from_millis(5000))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_present_bridge_delivers() {
        let bridge = Arc::new(RecordingBridge::default());
        let channel = NativeBridgeChannel::new(Some(bridge.clone()));
        assert!(channel.is_available().await);
        channel
            .deliver("Title", "Body", Duration::from_millis(5000))
            .await
            .unwrap();
        assert_eq!(
            bridge.shown.lock().unwrap().as_slice(),
            &[("Title".to_string(), "Body".to_string())]
        );
    }
}
