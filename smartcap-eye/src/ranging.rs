//! Ranging sensor obstacle check

use crate::config::RangingConfig;
use smartcap_core::{Alert, AlertCategory, AlertLevel, TrackedDetection};
use tracing::debug;

/// Turns a proximity reading into an obstacle alert.
///
/// Between the unconditional and critical thresholds a reading only escalates
/// when one of the obstacle classes is in view.
#[derive(Debug, Clone)]
pub struct RangingObstacleCheck {
    config: RangingConfig,
}

impl RangingObstacleCheck {
    pub fn new(config: RangingConfig) -> Self {
        Self { config }
    }

    /// Check a reading in millimetres against the detections of the same frame.
    /// Zero or negative readings mean no echo.
    pub fn check(&self, distance_mm: i32, detections: &[TrackedDetection]) -> Option<Alert> {
        if distance_mm <= 0 {
            return None;
        }

        let distance_cm = distance_mm as f32 / 10.0;

        if distance_cm < self.config.critical_distance_cm {
            let obstacle_visible = detections.iter().any(|d| {
                self.config
                    .obstacle_classes
                    .iter()
                    .any(|class| class == d.class_name())
            });

            if obstacle_visible || distance_cm < self.config.unconditional_critical_cm {
                return Some(
                    Alert::new(
                        AlertCategory::Obstacle,
                        AlertLevel::Critical,
                        format!("CRITICAL: Obstacle {:.0}cm ahead", distance_cm),
                    )
                    .with_distance_cm(distance_cm),
                );
            }

            debug!("Close echo at {:.0}cm with no obstacle in view", distance_cm);
            return None;
        }

        if distance_cm < self.config.warning_distance_cm {
            return Some(
                Alert::new(
                    AlertCategory::Obstacle,
                    AlertLevel::Warning,
                    format!("Warning: Object {:.0}cm ahead", distance_cm),
                )
                .with_distance_cm(distance_cm),
            );
        }

        None
    }

    /// Check an optional reading; a failed sensor read yields no alert
    pub fn check_reading(&self, distance_mm: Option<i32>, detections: &[TrackedDetection]) -> Option<Alert> {
        distance_mm.and_then(|mm| self.check(mm, detections))
    }
}

impl Default for RangingObstacleCheck {
    fn default() -> Self {
        Self::new(RangingConfig::default())
    }
}
