//! Fire-and-forget voice output queue

use crate::config::SpeechConfig;
use crate::engines::TtsEngine;
use crate::error::SpeechError;
use parking_lot::Mutex;
use smartcap_core::AlertLevel;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

struct Utterance {
    text: String,
    generation: u64,
}

/// Bounded speech queue served by a background worker.
///
/// `speak` never waits: a full queue drops the request. With barge-in enabled
/// a CRITICAL alert bumps the queue generation and the worker skips every
/// utterance queued before it.
pub struct VoiceOutput {
    config: Arc<SpeechConfig>,
    sender: mpsc::Sender<Utterance>,
    generation: Arc<AtomicU64>,
    dropped: AtomicU64,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl VoiceOutput {
    /// Start the worker on the current tokio runtime
    pub fn spawn(engine: Arc<dyn TtsEngine>, config: SpeechConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Config)?;

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SpeechError::Engine(format!("No tokio runtime for voice worker: {}", e)))?;

        if !engine.is_available() {
            warn!("TTS engine '{}' is not available, utterances will fail", engine.name());
        }

        let config = Arc::new(config);
        let generation = Arc::new(AtomicU64::new(0));
        let (sender, receiver) = mpsc::channel(config.queue_size);

        let worker = runtime.spawn(run_worker(
            engine.clone(),
            config.clone(),
            generation.clone(),
            receiver,
        ));
        info!("Voice output started with '{}' engine", engine.name());

        Ok(Self {
            config,
            sender,
            generation,
            dropped: AtomicU64::new(0),
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Queue an utterance. Returns false when it was not queued (disabled,
    /// queue full or worker stopped).
    pub fn speak(&self, text: &str, level: AlertLevel) -> bool {
        if !self.config.enabled {
            debug!("Speech disabled, not speaking: {}", text);
            return false;
        }

        let generation = if self.config.barge_in_on_critical && level == AlertLevel::Critical {
            let next = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            debug!("Barge-in: discarding queued speech");
            next
        } else {
            self.generation.load(Ordering::SeqCst)
        };

        let utterance = Utterance {
            text: text.to_string(),
            generation,
        };

        match self.sender.try_send(utterance) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("Voice queue full, dropping: {}", text);
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("Voice worker stopped, dropping: {}", text);
                false
            }
        }
    }

    /// Discard everything still waiting in the queue
    pub fn interrupt(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Utterances rejected because the queue was full or closed
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Discard pending speech and stop the worker
    pub fn stop(&self) {
        self.interrupt();
        if let Some(worker) = self.worker.lock().take() {
            worker.abort();
            info!("Voice output stopped");
        }
    }
}

impl Drop for VoiceOutput {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.get_mut().take() {
            worker.abort();
        }
    }
}

async fn run_worker(
    engine: Arc<dyn TtsEngine>,
    config: Arc<SpeechConfig>,
    generation: Arc<AtomicU64>,
    mut receiver: mpsc::Receiver<Utterance>,
) {
    while let Some(utterance) = receiver.recv().await {
        if utterance.generation < generation.load(Ordering::SeqCst) {
            debug!("Skipping stale utterance: {}", utterance.text);
            continue;
        }

        match tokio::time::timeout(config.speak_timeout(), engine.speak(&utterance.text, &config)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("Speech failed: {}", e),
            Err(_) => warn!("Speech timed out after {:?}: {}", config.speak_timeout(), utterance.text),
        }
    }
    debug!("Voice worker exiting");
}
