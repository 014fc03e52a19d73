//! The alert engine: one `process` call per frame

use crate::config::SmartCapConfig;
use crate::decision::DecisionEngine;
use crate::dispatch::DispatchGate;
use crate::error::EngineError;
use crate::stats::ProcessingStats;
use smartcap_cns::HapticController;
use smartcap_core::{Alert, Frame, TextSpan, TrackedDetection};
use smartcap_eye::{
    DetectionEnricher, Detector, ObjectTracker, RangingObstacleCheck, RangingSensor, TextGate,
    TextRecognizer,
};
use smartcap_spk::VoiceOutput;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Owns the per-stream state (tracks, dispatch history, statistics) and the
/// collaborators used on every frame. Driven by exactly one task.
pub struct AlertEngine {
    detector: Arc<dyn Detector>,
    recognizer: Option<Arc<dyn TextRecognizer>>,
    ranging_sensor: Option<Arc<dyn RangingSensor>>,
    voice: Option<Arc<VoiceOutput>>,
    haptic: Option<Arc<HapticController>>,
    enricher: DetectionEnricher,
    tracker: ObjectTracker,
    ranging: RangingObstacleCheck,
    text_gate: TextGate,
    decision: DecisionEngine,
    gate: DispatchGate,
    stats: ProcessingStats,
    sensor_timeout: Duration,
    stats_log_interval: u64,
}

impl AlertEngine {
    pub fn builder() -> AlertEngineBuilder {
        AlertEngineBuilder::new()
    }

    /// Process one frame and return the alert dispatched for it, if any
    pub async fn process(&mut self, frame: &Frame, ranging_mm: Option<i32>) -> Result<Option<Alert>, EngineError> {
        self.process_at(frame, ranging_mm, Instant::now()).await
    }

    /// Process one frame as if observed at `now`
    pub async fn process_at(
        &mut self,
        frame: &Frame,
        ranging_mm: Option<i32>,
        now: Instant,
    ) -> Result<Option<Alert>, EngineError> {
        if frame.width == 0 || frame.height == 0 {
            return Err(EngineError::InvalidFrame(format!(
                "frame {} has zero dimension {}x{}",
                frame.id, frame.width, frame.height
            )));
        }

        let started = Instant::now();

        let detections = match self.detector.detect(frame).await {
            Ok(detections) => detections,
            Err(e) => {
                warn!("Detector '{}' failed on frame {}: {}", self.detector.name(), frame.id, e);
                Vec::new()
            }
        };
        let detections = self.enricher.enrich_all(detections, frame.width, frame.height);
        self.stats.detections_made += detections.len() as u64;

        let run_ocr = self.text_gate.should_run_ocr(&detections);
        let tracked = self.tracker.update(detections, frame.width, now);

        let ranging_mm = match ranging_mm {
            Some(mm) => Some(mm),
            None => self.read_ranging_sensor().await,
        };
        let ranging_alert = self.ranging.check_reading(ranging_mm, &tracked);

        let texts = if run_ocr {
            self.recognize_text(frame).await
        } else {
            Vec::new()
        };

        let decided = self.decision.decide(&tracked, ranging_alert, &texts);
        log_cycle(frame, &tracked, ranging_mm, &texts, decided.as_ref());

        let dispatched = match decided {
            Some(alert) => match self.gate.gate(alert, now) {
                Some(alert) => {
                    self.dispatch(&alert);
                    Some(alert)
                }
                None => {
                    self.stats.alerts_suppressed += 1;
                    None
                }
            },
            None => None,
        };

        self.stats.frames_processed += 1;
        self.stats
            .record_latency(started.elapsed().as_secs_f64() * 1000.0);

        if self.stats_log_interval > 0 && self.stats.frames_processed % self.stats_log_interval == 0 {
            info!(
                "Stats: frames={} dropped={} detections={} ocr={} alerts={} suppressed={} failures={} latency={:.1}ms",
                self.stats.frames_processed,
                self.stats.frames_dropped,
                self.stats.detections_made,
                self.stats.ocr_recognitions,
                self.stats.alerts_dispatched,
                self.stats.alerts_suppressed,
                self.stats.cycle_failures,
                self.stats.avg_latency_ms,
            );
        }

        Ok(dispatched)
    }

    /// Number of live tracks
    pub fn track_count(&self) -> usize {
        self.tracker.track_count()
    }

    /// Most recently dispatched alert
    pub fn last_dispatched(&self) -> Option<&Alert> {
        self.gate.last_dispatched()
    }

    pub fn stats(&self) -> ProcessingStats {
        self.stats.clone()
    }

    /// Record the running total of frames evicted before processing
    pub fn record_frames_dropped(&mut self, total: u64) {
        self.stats.frames_dropped = total;
    }

    /// Record a cycle that failed or panicked
    pub fn record_cycle_failure(&mut self) {
        self.stats.cycle_failures += 1;
    }

    /// Discard pending speech and turn the motor off
    pub async fn shutdown(&self) {
        if let Some(voice) = &self.voice {
            voice.stop();
        }
        if let Some(haptic) = &self.haptic {
            haptic.stop().await;
        }
    }

    fn dispatch(&mut self, alert: &Alert) {
        self.stats.alerts_dispatched += 1;
        info!("ALERT [{}]: {}", alert.level, alert.message);

        if let Some(voice) = &self.voice {
            voice.speak(&alert.message, alert.level);
        }
        if let Some(haptic) = &self.haptic {
            haptic.vibrate_alert(alert.level);
        }
    }

    async fn read_ranging_sensor(&self) -> Option<i32> {
        let sensor = self.ranging_sensor.as_ref()?;
        match tokio::time::timeout(self.sensor_timeout, sensor.read_mm()).await {
            Ok(Ok(mm)) => Some(mm),
            Ok(Err(e)) => {
                warn!("Ranging sensor read failed: {}", e);
                None
            }
            Err(_) => {
                warn!("Ranging sensor read timed out after {:?}", self.sensor_timeout);
                None
            }
        }
    }

    async fn recognize_text(&mut self, frame: &Frame) -> Vec<TextSpan> {
        let recognizer = match &self.recognizer {
            Some(recognizer) => recognizer,
            None => return Vec::new(),
        };

        match recognizer.recognize(frame).await {
            Ok(spans) => {
                let spans = self.text_gate.filter_spans(spans);
                if !spans.is_empty() {
                    self.stats.ocr_recognitions += 1;
                }
                spans
            }
            Err(e) => {
                warn!("Text recognizer '{}' failed on frame {}: {}", recognizer.name(), frame.id, e);
                Vec::new()
            }
        }
    }
}

fn log_cycle(
    frame: &Frame,
    tracked: &[TrackedDetection],
    ranging_mm: Option<i32>,
    texts: &[TextSpan],
    decided: Option<&Alert>,
) {
    debug!(
        "Frame {}: {} tracked, ranging={:?}, {} text spans, decision={:?}",
        frame.id,
        tracked.len(),
        ranging_mm,
        texts.len(),
        decided.map(|a| a.message.as_str())
    );
    for t in tracked {
        debug!(
            "  track {} {} conf={:.2} dist={:?} {} {}",
            t.track_id,
            t.class_name(),
            t.confidence(),
            t.detection.distance_m,
            t.detection.position.as_str(),
            t.movement.direction
        );
    }
}

/// Builder for [`AlertEngine`]. A detector is required; everything else is optional.
pub struct AlertEngineBuilder {
    config: SmartCapConfig,
    detector: Option<Arc<dyn Detector>>,
    recognizer: Option<Arc<dyn TextRecognizer>>,
    ranging_sensor: Option<Arc<dyn RangingSensor>>,
    voice: Option<Arc<VoiceOutput>>,
    haptic: Option<Arc<HapticController>>,
}

impl AlertEngineBuilder {
    pub fn new() -> Self {
        Self {
            config: SmartCapConfig::default(),
            detector: None,
            recognizer: None,
            ranging_sensor: None,
            voice: None,
            haptic: None,
        }
    }

    pub fn config(mut self, config: SmartCapConfig) -> Self {
        self.config = config;
        self
    }

    pub fn detector(mut self, detector: Arc<dyn Detector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn text_recognizer(mut self, recognizer: Arc<dyn TextRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    /// Sensor polled when a frame arrives without a ranging reading
    pub fn ranging_sensor(mut self, sensor: Arc<dyn RangingSensor>) -> Self {
        self.ranging_sensor = Some(sensor);
        self
    }

    pub fn voice(mut self, voice: Arc<VoiceOutput>) -> Self {
        self.voice = Some(voice);
        self
    }

    pub fn haptic(mut self, haptic: Arc<HapticController>) -> Self {
        self.haptic = Some(haptic);
        self
    }

    pub fn build(self) -> Result<AlertEngine, EngineError> {
        self.config.validate()?;

        let detector = self
            .detector
            .ok_or_else(|| EngineError::Config("No detector supplied to the alert engine".to_string()))?;

        let config = self.config;
        info!(
            "Alert engine ready: detector='{}', ocr={}, voice={}, haptic={}",
            detector.name(),
            self.recognizer.is_some() && config.text.enabled,
            self.voice.is_some(),
            self.haptic.is_some()
        );

        Ok(AlertEngine {
            detector,
            recognizer: self.recognizer,
            ranging_sensor: self.ranging_sensor,
            voice: self.voice,
            haptic: self.haptic,
            enricher: DetectionEnricher::new(config.hazard),
            tracker: ObjectTracker::new(config.tracker),
            ranging: RangingObstacleCheck::new(config.ranging),
            text_gate: TextGate::new(config.text),
            decision: DecisionEngine::new(config.decision),
            gate: DispatchGate::new(&config.dispatch),
            stats: ProcessingStats::default(),
            sensor_timeout: config.pipeline.read_timeout(),
            stats_log_interval: config.pipeline.stats_log_interval,
        })
    }
}

impl Default for AlertEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
