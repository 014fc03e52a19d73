//! Frame pipeline: an ingestion task filling the ring buffer and a fixed-rate
//! processing loop draining it.

use crate::buffer::FrameBuffer;
use crate::config::PipelineConfig;
use crate::engine::AlertEngine;
use crate::error::EngineError;
use crate::source::{FrameInput, FrameSource};
use crate::stats::ProcessingStats;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use smartcap_core::Alert;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Snapshot of a pipeline for monitoring
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineStatus {
    pub running: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub frames_buffered: usize,
    pub track_count: usize,
    pub last_alert: Option<Alert>,
    pub stats: ProcessingStats,
}

/// Runs an [`AlertEngine`] against a [`FrameSource`].
///
/// `run` owns the engine for its duration; `status` and `stop` may be called
/// concurrently through a shared reference.
pub struct Pipeline {
    config: PipelineConfig,
    engine: Mutex<Option<AlertEngine>>,
    buffer: Arc<FrameBuffer>,
    is_running: Arc<RwLock<bool>>,
    status: Arc<RwLock<PipelineStatus>>,
    alert_sink: Option<mpsc::Sender<Alert>>,
}

impl Pipeline {
    pub fn new(engine: AlertEngine, config: PipelineConfig) -> Result<Self, EngineError> {
        config.validate().map_err(EngineError::Config)?;

        let status = PipelineStatus {
            stats: engine.stats(),
            ..PipelineStatus::default()
        };

        Ok(Self {
            buffer: Arc::new(FrameBuffer::new(config.buffer_capacity)),
            config,
            engine: Mutex::new(Some(engine)),
            is_running: Arc::new(RwLock::new(false)),
            status: Arc::new(RwLock::new(status)),
            alert_sink: None,
        })
    }

    /// Forward every dispatched alert to `sink` (dropped when the sink is full)
    pub fn with_alert_sink(mut self, sink: mpsc::Sender<Alert>) -> Self {
        self.alert_sink = Some(sink);
        self
    }

    pub fn status(&self) -> PipelineStatus {
        let mut status = self.status.read().clone();
        status.frames_buffered = self.buffer.len();
        status
    }

    pub fn is_running(&self) -> bool {
        *self.is_running.read()
    }

    /// Ask both tasks to finish; `run` returns after its current cycle
    pub fn stop(&self) {
        let mut is_running = self.is_running.write();
        if *is_running {
            *is_running = false;
            info!("Pipeline stop requested");
        }
    }

    /// Process frames until the source ends or `stop` is called. Returns the
    /// final statistics.
    pub async fn run<S>(&self, source: S) -> Result<ProcessingStats, EngineError>
    where
        S: FrameSource + 'static,
    {
        {
            let mut is_running = self.is_running.write();
            if *is_running {
                return Err(EngineError::Pipeline("Pipeline already running".to_string()));
            }
            *is_running = true;
        }

        let taken = self.engine.lock().take();
        let mut engine = match taken {
            Some(engine) => engine,
            None => {
                *self.is_running.write() = false;
                return Err(EngineError::Pipeline("Alert engine unavailable".to_string()));
            }
        };

        {
            let mut status = self.status.write();
            status.running = true;
            status.started_at = Some(Utc::now());
        }
        info!("Pipeline started");

        let source_done = Arc::new(AtomicBool::new(false));
        let ingestion = tokio::spawn(run_ingestion(
            source,
            self.buffer.clone(),
            self.is_running.clone(),
            source_done.clone(),
            self.config.read_timeout(),
        ));

        let mut ticker = tokio::time::interval(self.config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            if !*self.is_running.read() {
                break;
            }

            let input = match self.buffer.pop() {
                Some(input) => input,
                None => {
                    if source_done.load(Ordering::SeqCst) && self.buffer.is_empty() {
                        info!("Frame source exhausted");
                        break;
                    }
                    continue;
                }
            };

            self.run_cycle(&mut engine, input).await;
        }

        *self.is_running.write() = false;
        ingestion.abort();
        let _ = tokio::time::timeout(Duration::from_secs(1), ingestion).await;

        engine.shutdown().await;
        let stats = engine.stats();
        self.publish_status(&engine, false);
        *self.engine.lock() = Some(engine);

        info!(
            "Pipeline stopped after {} frames ({} alerts, {} dropped)",
            stats.frames_processed, stats.alerts_dispatched, stats.frames_dropped
        );
        Ok(stats)
    }

    async fn run_cycle(&self, engine: &mut AlertEngine, input: FrameInput) {
        let frame_id = input.frame.id;
        let outcome = AssertUnwindSafe(engine.process(&input.frame, input.ranging_mm))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(Some(alert))) => {
                if let Some(sink) = &self.alert_sink {
                    if let Err(e) = sink.try_send(alert) {
                        warn!("Alert sink unavailable: {}", e);
                    }
                }
            }
            Ok(Ok(None)) => {}
            Ok(Err(e)) => {
                error!("Processing frame {} failed: {}", frame_id, e);
                engine.record_cycle_failure();
            }
            Err(panic) => {
                error!("Processing frame {} panicked: {}", frame_id, panic_message(&*panic));
                engine.record_cycle_failure();
            }
        }

        engine.record_frames_dropped(self.buffer.dropped());
        self.publish_status(engine, true);
    }

    fn publish_status(&self, engine: &AlertEngine, running: bool) {
        let mut status = self.status.write();
        status.running = running;
        status.track_count = engine.track_count();
        status.last_alert = engine.last_dispatched().cloned();
        status.stats = engine.stats();
    }
}

async fn run_ingestion<S: FrameSource>(
    mut source: S,
    buffer: Arc<FrameBuffer>,
    is_running: Arc<RwLock<bool>>,
    source_done: Arc<AtomicBool>,
    read_timeout: Duration,
) {
    loop {
        if !*is_running.read() {
            break;
        }

        match tokio::time::timeout(read_timeout, source.next_frame()).await {
            Ok(Ok(Some(input))) => {
                if let Some(evicted) = buffer.push(input) {
                    warn!("Frame buffer full, dropped frame {}", evicted.frame.id);
                }
            }
            Ok(Ok(None)) => {
                info!("Frame source ended");
                break;
            }
            Ok(Err(e)) => {
                error!("Frame source error: {}", e);
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            Err(_) => {
                debug!("No frame within {:?}", read_timeout);
            }
        }
    }

    source_done.store(true, Ordering::SeqCst);
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
