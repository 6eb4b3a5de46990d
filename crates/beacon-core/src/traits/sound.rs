//! Sound sink trait.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Trait for the audio output injected by the embedding application.
///
/// The delivery core fetches and caches the encoded asset; the sink only
/// has to play a complete buffer. Playback failures degrade delivery to
/// silent, they never block the visual path.
#[async_trait]
pub trait SoundSink: Send + Sync + std::fmt::Debug + 'static {
    /// Play a complete encoded audio buffer.
    async fn play(&self, data: Bytes) -> AppResult<()>;
}
