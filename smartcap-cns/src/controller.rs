//! Haptic pattern queue

use crate::config::HapticConfig;
use crate::driver::HapticDriver;
use crate::error::HapticError;
use crate::pattern::HapticPattern;
use parking_lot::Mutex;
use smartcap_core::AlertLevel;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Plays alert patterns on a motor driver from a bounded queue
pub struct HapticController {
    config: HapticConfig,
    driver: Arc<dyn HapticDriver>,
    sender: mpsc::Sender<HapticPattern>,
    dropped: AtomicU64,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl HapticController {
    /// Start the pattern worker on the current tokio runtime
    pub fn spawn(driver: Arc<dyn HapticDriver>, config: HapticConfig) -> Result<Self, HapticError> {
        config.validate().map_err(HapticError::Config)?;

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| HapticError::Driver(format!("No tokio runtime for haptic worker: {}", e)))?;

        let (sender, receiver) = mpsc::channel(config.queue_size);
        let timeout = Duration::from_millis(config.command_timeout_ms);
        let worker = runtime.spawn(run_worker(driver.clone(), timeout, receiver));
        info!("Haptic controller started with '{}' driver", driver.name());

        Ok(Self {
            config,
            driver,
            sender,
            dropped: AtomicU64::new(0),
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Queue the pattern for an alert level. Returns false when nothing was
    /// queued (SAFE, disabled, queue full or worker stopped).
    pub fn vibrate_alert(&self, level: AlertLevel) -> bool {
        if !self.config.enabled {
            return false;
        }

        let pattern = match HapticPattern::for_level(level, &self.config) {
            Some(pattern) => pattern,
            None => return false,
        };

        match self.sender.try_send(pattern) {
            Ok(()) => {
                debug!("Queued {} haptic pattern", level);
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("Haptic queue full, dropping {} pattern", level);
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("Haptic worker stopped, dropping {} pattern", level);
                false
            }
        }
    }

    /// Queue a pattern by numeric level code. Unknown codes are logged and skipped.
    pub fn vibrate_code(&self, code: u8) -> bool {
        match AlertLevel::try_from(code) {
            Ok(level) => self.vibrate_alert(level),
            Err(e) => {
                warn!("Ignoring haptic request: {}", e);
                false
            }
        }
    }

    /// Patterns rejected because the queue was full or closed
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Stop the worker and turn the motor off
    pub async fn stop(&self) {
        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            worker.abort();
        }
        if let Err(e) = self.driver.stop().await {
            error!("Failed to stop haptic motor: {}", e);
        }
        info!("Haptic controller stopped");
    }
}

impl Drop for HapticController {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.get_mut().take() {
            worker.abort();
        }
    }
}

async fn run_worker(
    driver: Arc<dyn HapticDriver>,
    timeout: Duration,
    mut receiver: mpsc::Receiver<HapticPattern>,
) {
    while let Some(pattern) = receiver.recv().await {
        if let Err(e) = play(driver.as_ref(), &pattern, timeout).await {
            error!("Haptic pattern failed: {}", e);
        }
    }
    debug!("Haptic worker exiting");
}

async fn play(driver: &dyn HapticDriver, pattern: &HapticPattern, timeout: Duration) -> Result<(), HapticError> {
    for step in &pattern.steps {
        tokio::time::timeout(timeout, driver.pulse(pattern.intensity, step.on_ms))
            .await
            .map_err(|_| HapticError::Driver("Pulse command timed out".to_string()))??;

        let pause = u64::from(step.on_ms) + u64::from(step.off_ms);
        tokio::time::sleep(Duration::from_millis(pause)).await;
    }

    tokio::time::timeout(timeout, driver.stop())
        .await
        .map_err(|_| HapticError::Driver("Stop command timed out".to_string()))?
}
