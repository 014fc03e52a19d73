//! Configuration for speech output

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which text-to-speech back-end to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Platform speech program (espeak-ng / say)
    #[default]
    Native,
    /// Write utterances to the log only
    Log,
}

/// Speech output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpeechConfig {
    /// Enable spoken alerts
    pub enabled: bool,
    pub engine: EngineKind,
    /// Speaking rate in words per minute
    pub rate: u32,
    /// Volume (0.0 to 1.0)
    pub volume: f32,
    /// Pitch offset (-1.0 to 1.0, 0.0 is the voice default)
    pub pitch: f32,
    /// Engine specific voice name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    /// Pending utterances held before new ones are dropped
    pub queue_size: usize,
    /// A CRITICAL alert discards utterances still waiting in the queue
    pub barge_in_on_critical: bool,
    /// Upper bound on a single utterance
    pub speak_timeout_ms: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            engine: EngineKind::Native,
            rate: 150,
            volume: 0.9,
            pitch: 0.0,
            voice: None,
            queue_size: 16,
            barge_in_on_critical: false,
            speak_timeout_ms: 10_000,
        }
    }
}

impl SpeechConfig {
    pub fn speak_timeout(&self) -> Duration {
        Duration::from_millis(self.speak_timeout_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.rate < 50 || self.rate > 500 {
            return Err("Speech rate must be between 50 and 500 words per minute".to_string());
        }
        if !(0.0..=1.0).contains(&self.volume) {
            return Err("Volume must be between 0.0 and 1.0".to_string());
        }
        if !(-1.0..=1.0).contains(&self.pitch) {
            return Err("Pitch must be between -1.0 and 1.0".to_string());
        }
        if self.queue_size == 0 {
            return Err("Speech queue size must be at least 1".to_string());
        }
        if self.speak_timeout_ms == 0 {
            return Err("Speak timeout must be positive".to_string());
        }
        if let Some(voice) = &self.voice {
            let valid = !voice.is_empty()
                && voice.len() <= 64
                && voice
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.'));
            if !valid {
                return Err(format!("Invalid voice name: {:?}", voice));
            }
        }
        Ok(())
    }
}
