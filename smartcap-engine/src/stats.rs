//! Processing statistics

use serde::{Deserialize, Serialize};

/// Weight of the previous average in the latency EWMA
const LATENCY_DECAY: f64 = 0.9;

/// Counters kept by the alert engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub frames_processed: u64,
    pub frames_dropped: u64,
    pub detections_made: u64,
    pub ocr_recognitions: u64,
    pub alerts_dispatched: u64,
    pub alerts_suppressed: u64,
    pub cycle_failures: u64,
    /// Exponentially weighted per-frame processing time
    pub avg_latency_ms: f64,
}

impl ProcessingStats {
    pub fn record_latency(&mut self, latency_ms: f64) {
        if latency_ms.is_finite() && latency_ms >= 0.0 {
            self.avg_latency_ms =
                LATENCY_DECAY * self.avg_latency_ms + (1.0 - LATENCY_DECAY) * latency_ms;
        }
    }
}
