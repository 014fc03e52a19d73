//! TTS engine implementations

pub mod log;
pub mod native;

use crate::config::SpeechConfig;
use crate::error::SpeechError;
use async_trait::async_trait;

/// Trait for TTS engines
#[async_trait]
pub trait TtsEngine: Send + Sync {
    /// Speak text aloud, returning once the utterance has finished
    async fn speak(&self, text: &str, config: &SpeechConfig) -> Result<(), SpeechError>;

    /// Check if engine is available
    fn is_available(&self) -> bool;

    /// Get engine name
    fn name(&self) -> &str {
        "tts"
    }
}
