//! Distance based hazard classification

use crate::config::HazardConfig;
use smartcap_core::{AlertLevel, Detection};

/// Maps an estimated distance to a severity level
#[derive(Debug, Clone)]
pub struct HazardClassifier {
    critical_distance_m: f32,
    warning_distance_m: f32,
}

impl HazardClassifier {
    pub fn new(config: &HazardConfig) -> Self {
        Self {
            critical_distance_m: config.critical_distance_m,
            warning_distance_m: config.warning_distance_m,
        }
    }

    /// Severity for a distance in meters. Unknown, negative or non-finite
    /// distances carry no proximity signal and are SAFE.
    pub fn classify(&self, distance_m: Option<f32>) -> AlertLevel {
        match distance_m {
            Some(d) if d.is_finite() && d >= 0.0 => {
                if d <= self.critical_distance_m {
                    AlertLevel::Critical
                } else if d <= self.warning_distance_m {
                    AlertLevel::Warning
                } else {
                    AlertLevel::Safe
                }
            }
            _ => AlertLevel::Safe,
        }
    }

    /// Set the severity of a detection from its distance
    pub fn apply(&self, detection: &mut Detection) {
        detection.severity = self.classify(detection.distance_m);
    }
}

impl Default for HazardClassifier {
    fn default() -> Self {
        Self::new(&HazardConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartcap_core::BBox;

    #[test]
    fn test_classify_thresholds() {
        let classifier = HazardClassifier::default();
        assert_eq!(classifier.classify(Some(0.4)), AlertLevel::Critical);
        assert_eq!(classifier.classify(Some(1.0)), AlertLevel::Critical);
        assert_eq!(classifier.classify(Some(1.01)), AlertLevel::Warning);
        assert_eq!(classifier.classify(Some(2.5)), AlertLevel::Warning);
        assert_eq!(classifier.classify(Some(2.6)), AlertLevel::Safe);
    }

    #[test]
    fn test_classify_missing_distance() {
        let classifier = HazardClassifier::default();
        assert_eq!(classifier.classify(None), AlertLevel::Safe);
        assert_eq!(classifier.classify(Some(f32::NAN)), AlertLevel::Safe);
        assert_eq!(classifier.classify(Some(-1.0)), AlertLevel::Safe);
    }

    #[test]
    fn test_custom_thresholds() {
        let config = HazardConfig {
            critical_distance_m: 0.5,
            warning_distance_m: 1.0,
            ..HazardConfig::default()
        };
        let classifier = HazardClassifier::new(&config);
        assert_eq!(classifier.classify(Some(0.8)), AlertLevel::Warning);
        assert_eq!(classifier.classify(Some(1.5)), AlertLevel::Safe);
    }

    #[test]
    fn test_apply_sets_severity() {
        let classifier = HazardClassifier::default();
        let mut det = Detection::new("car", 0.9, BBox::new(0.0, 0.0, 10.0, 10.0)).with_distance(2.0);
        classifier.apply(&mut det);
        assert_eq!(det.severity, AlertLevel::Warning);
    }
}
