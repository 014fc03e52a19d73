//! Engine that only logs what it would say

use crate::config::SpeechConfig;
use crate::engines::TtsEngine;
use crate::error::SpeechError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::info;

/// Utterances kept in the transcript; older ones are forgotten
pub const TRANSCRIPT_CAPACITY: usize = 256;

/// Logs utterances instead of playing them. Keeps a transcript of the most
/// recent [`TRANSCRIPT_CAPACITY`] utterances, which makes it the engine of
/// choice for headless runs.
#[derive(Clone, Default)]
pub struct LogTtsEngine {
    transcript: Arc<Mutex<VecDeque<String>>>,
}

impl LogTtsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recent utterances, oldest first
    pub fn transcript(&self) -> Vec<String> {
        self.transcript.lock().iter().cloned().collect()
    }
}

#[async_trait]
impl TtsEngine for LogTtsEngine {
    async fn speak(&self, text: &str, _config: &SpeechConfig) -> Result<(), SpeechError> {
        info!("SPEAK: {}", text);
        let mut transcript = self.transcript.lock();
        if transcript.len() == TRANSCRIPT_CAPACITY {
            transcript.pop_front();
        }
        transcript.push_back(text.to_string());
        Ok(())
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "log"
    }
}
