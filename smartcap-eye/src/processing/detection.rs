//! Detection enrichment: distance estimate, position, severity and priority

use crate::config::HazardConfig;
use crate::hazard::HazardClassifier;
use smartcap_core::{AlertLevel, Detection, Position};
use std::collections::HashSet;
use tracing::debug;

/// Fills in the fields a bare detector back-end does not report
pub struct DetectionEnricher {
    config: HazardConfig,
    hazard: HazardClassifier,
    priority_classes: HashSet<String>,
}

impl DetectionEnricher {
    pub fn new(config: HazardConfig) -> Self {
        let hazard = HazardClassifier::new(&config);
        let priority_classes = config.priority_classes.iter().cloned().collect();
        Self {
            config,
            hazard,
            priority_classes,
        }
    }

    /// Pinhole distance estimate from the apparent height of a known class,
    /// clamped to the configured range and rounded to 0.1 m.
    pub fn estimate_distance(&self, class_name: &str, bbox_height: f32, frame_height: u32) -> Option<f32> {
        if !bbox_height.is_finite() || bbox_height <= 0.0 || frame_height == 0 {
            return None;
        }

        let reference_cm = self
            .config
            .reference_heights_cm
            .get(class_name)
            .copied()
            .unwrap_or(self.config.default_reference_height_cm);
        let focal_length = self.config.focal_length_ratio * frame_height as f32;
        let distance_m = (reference_cm * focal_length / bbox_height) / 100.0;
        let clamped = distance_m.clamp(self.config.min_distance_m, self.config.max_distance_m);

        Some((clamped * 10.0).round() / 10.0)
    }

    pub fn is_priority_class(&self, class_name: &str) -> bool {
        self.priority_classes.contains(class_name)
    }

    pub fn enrich(&self, mut detection: Detection, frame_width: u32, frame_height: u32) -> Detection {
        detection.distance_m = detection.distance_m.filter(|d| d.is_finite() && *d >= 0.0);
        if detection.distance_m.is_none() && self.config.estimate_missing_distance {
            detection.distance_m =
                self.estimate_distance(&detection.class_name, detection.bbox.height(), frame_height);
        }

        if frame_width > 0 {
            let (center_x, _) = detection.bbox.center();
            if center_x.is_finite() {
                detection.position = Position::from_relative_x(center_x / frame_width as f32);
            }
        }

        self.hazard.apply(&mut detection);
        detection.priority = self.is_priority_class(&detection.class_name);
        detection
    }

    /// Enrich every detection of a frame and order them for decision making
    pub fn enrich_all(&self, detections: Vec<Detection>, frame_width: u32, frame_height: u32) -> Vec<Detection> {
        let mut enriched: Vec<Detection> = detections
            .into_iter()
            .map(|d| self.enrich(d, frame_width, frame_height))
            .collect();
        sort_by_priority(&mut enriched);
        debug!(
            "Enriched {} detections, overall level {}",
            enriched.len(),
            overall_level(&enriched)
        );
        enriched
    }
}

impl Default for DetectionEnricher {
    fn default() -> Self {
        Self::new(HazardConfig::default())
    }
}

/// Priority classes first, then by descending confidence. Stable.
pub fn sort_by_priority(detections: &mut [Detection]) {
    detections.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| b.confidence.total_cmp(&a.confidence))
    });
}

/// Highest severity present, SAFE when there is nothing
pub fn overall_level(detections: &[Detection]) -> AlertLevel {
    detections
        .iter()
        .map(|d| d.severity)
        .max()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartcap_core::BBox;

    fn detection(class_name: &str, confidence: f32, height: f32) -> Detection {
        Detection::new(class_name, confidence, BBox::new(300.0, 0.0, 340.0, height))
    }

    #[test]
    fn test_estimate_distance_person() {
        let enricher = DetectionEnricher::default();
        // 170 * (0.8 * 480) / 240 / 100 = 2.72
        assert_eq!(enricher.estimate_distance("person", 240.0, 480), Some(2.7));
    }

    #[test]
    fn test_estimate_distance_clamped() {
        let enricher = DetectionEnricher::default();
        assert_eq!(enricher.estimate_distance("cup", 470.0, 480), Some(0.3));
        assert_eq!(enricher.estimate_distance("bus", 2.0, 480), Some(10.0));
    }

    #[test]
    fn test_estimate_distance_unknown_class() {
        let enricher = DetectionEnricher::default();
        // 50 * 384 / 192 / 100 = 1.0
        assert_eq!(enricher.estimate_distance("toaster", 192.0, 480), Some(1.0));
    }

    #[test]
    fn test_estimate_distance_degenerate() {
        let enricher = DetectionEnricher::default();
        assert_eq!(enricher.estimate_distance("person", 0.0, 480), None);
        assert_eq!(enricher.estimate_distance("person", f32::NAN, 480), None);
        assert_eq!(enricher.estimate_distance("person", 100.0, 0), None);
    }

    #[test]
    fn test_enrich_fills_missing_fields() {
        let enricher = DetectionEnricher::default();
        let det = enricher.enrich(detection("person", 0.9, 400.0), 640, 480);
        assert!(det.priority);
        assert_eq!(det.position, Position::Center);
        // 170 * 384 / 400 / 100 = 1.632
        assert_eq!(det.distance_m, Some(1.6));
        assert_eq!(det.severity, AlertLevel::Warning);
    }

    #[test]
    fn test_enrich_keeps_reported_distance() {
        let enricher = DetectionEnricher::default();
        let det = enricher.enrich(detection("cup", 0.9, 40.0).with_distance(0.8), 640, 480);
        assert_eq!(det.distance_m, Some(0.8));
        assert_eq!(det.severity, AlertLevel::Critical);
        assert!(!det.priority);
    }

    #[test]
    fn test_enrich_without_estimation() {
        let config = HazardConfig {
            estimate_missing_distance: false,
            ..HazardConfig::default()
        };
        let enricher = DetectionEnricher::new(config);
        let det = enricher.enrich(detection("person", 0.9, 400.0), 640, 480);
        assert_eq!(det.distance_m, None);
        assert_eq!(det.severity, AlertLevel::Safe);
    }

    #[test]
    fn test_sort_by_priority() {
        let enricher = DetectionEnricher::default();
        let sorted = enricher.enrich_all(
            vec![
                detection("cup", 0.99, 40.0),
                detection("person", 0.6, 40.0),
                detection("laptop", 0.7, 40.0),
                detection("car", 0.8, 40.0),
            ],
            640,
            480,
        );
        let classes: Vec<&str> = sorted.iter().map(|d| d.class_name.as_str()).collect();
        assert_eq!(classes, vec!["car", "person", "cup", "laptop"]);
    }

    #[test]
    fn test_overall_level() {
        assert_eq!(overall_level(&[]), AlertLevel::Safe);

        let mut near = detection("person", 0.9, 40.0);
        near.severity = AlertLevel::Critical;
        let far = detection("chair", 0.9, 40.0);
        assert_eq!(overall_level(&[far, near]), AlertLevel::Critical);
    }
}
