//! Configuration for smartcap-eye

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Object tracker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    /// Minimum IoU (exclusive) for a detection to continue a track
    pub iou_threshold: f32,
    /// A track not seen for longer than this is dropped
    pub track_timeout_ms: u64,
    /// Samples kept per track
    pub max_history: usize,
    /// Horizontal center shift (pixels) that counts as lateral motion
    pub movement_threshold_px: f32,
    /// Distance change (meters) that counts as approaching / receding
    pub approach_threshold_m: f32,
    /// Upper bound on live tracks; the least recently seen is evicted beyond it
    pub max_tracks: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            iou_threshold: 0.25,
            track_timeout_ms: 2000,
            max_history: 10,
            movement_threshold_px: 15.0,
            approach_threshold_m: 0.05,
            max_tracks: 1000,
        }
    }
}

impl TrackerConfig {
    pub fn track_timeout(&self) -> Duration {
        Duration::from_millis(self.track_timeout_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.iou_threshold.is_finite() || !(0.0..1.0).contains(&self.iou_threshold) {
            return Err("IoU threshold must be in [0, 1)".to_string());
        }
        if self.track_timeout_ms == 0 {
            return Err("Track timeout must be positive".to_string());
        }
        if self.max_history < 2 {
            return Err("Track history must hold at least 2 samples".to_string());
        }
        if !self.movement_threshold_px.is_finite() || self.movement_threshold_px < 0.0 {
            return Err("Movement threshold must be a non-negative number".to_string());
        }
        if !self.approach_threshold_m.is_finite() || self.approach_threshold_m < 0.0 {
            return Err("Approach threshold must be a non-negative number".to_string());
        }
        if self.max_tracks == 0 {
            return Err("max_tracks must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Distance based severity and enrichment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HazardConfig {
    /// At or below this distance a detection is CRITICAL
    pub critical_distance_m: f32,
    /// At or below this distance a detection is WARNING
    pub warning_distance_m: f32,
    /// Estimate distance from bbox height when the detector did not supply one
    pub estimate_missing_distance: bool,
    /// Fraction of the frame height used as the pinhole focal length
    pub focal_length_ratio: f32,
    pub min_distance_m: f32,
    pub max_distance_m: f32,
    /// Classes that matter for navigation; sorted ahead of everything else
    pub priority_classes: Vec<String>,
    /// Real-world height (cm) assumed for classes without an entry
    pub default_reference_height_cm: f32,
    /// Real-world object heights (cm) by class
    pub reference_heights_cm: BTreeMap<String, f32>,
}

impl Default for HazardConfig {
    fn default() -> Self {
        let reference_heights_cm = [
            ("person", 170.0),
            ("bicycle", 100.0),
            ("car", 150.0),
            ("motorcycle", 110.0),
            ("bus", 280.0),
            ("truck", 250.0),
            ("chair", 90.0),
            ("dog", 50.0),
            ("cat", 30.0),
            ("bottle", 25.0),
            ("cup", 10.0),
            ("laptop", 25.0),
            ("cell phone", 14.0),
            ("book", 20.0),
            ("backpack", 50.0),
            ("handbag", 30.0),
            ("umbrella", 100.0),
        ]
        .into_iter()
        .map(|(class, height)| (class.to_string(), height))
        .collect();

        let priority_classes = [
            "person",
            "bicycle",
            "car",
            "motorcycle",
            "bus",
            "truck",
            "traffic light",
            "stop sign",
            "bench",
            "chair",
            "dog",
            "cat",
            "fire hydrant",
            "parking meter",
            "potted plant",
            "dining table",
            "couch",
            "bed",
            "door",
            "stairs",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        Self {
            critical_distance_m: 1.0,
            warning_distance_m: 2.5,
            estimate_missing_distance: true,
            focal_length_ratio: 0.8,
            min_distance_m: 0.3,
            max_distance_m: 10.0,
            priority_classes,
            default_reference_height_cm: 50.0,
            reference_heights_cm,
        }
    }
}

impl HazardConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.critical_distance_m.is_finite() || self.critical_distance_m <= 0.0 {
            return Err("Critical distance must be positive".to_string());
        }
        if !self.warning_distance_m.is_finite() || self.warning_distance_m < self.critical_distance_m {
            return Err("Warning distance must not be below the critical distance".to_string());
        }
        if !self.focal_length_ratio.is_finite() || self.focal_length_ratio <= 0.0 {
            return Err("Focal length ratio must be positive".to_string());
        }
        if !(self.min_distance_m > 0.0 && self.min_distance_m <= self.max_distance_m) {
            return Err("Distance clamp must satisfy 0 < min <= max".to_string());
        }
        if self.default_reference_height_cm <= 0.0
            || self.reference_heights_cm.values().any(|h| !h.is_finite() || *h <= 0.0)
        {
            return Err("Reference heights must be positive".to_string());
        }
        Ok(())
    }
}

/// Ranging sensor obstacle check configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RangingConfig {
    /// Below this distance an obstacle may be CRITICAL
    pub critical_distance_cm: f32,
    /// Below this distance an obstacle is CRITICAL regardless of what the camera sees
    pub unconditional_critical_cm: f32,
    /// Below this distance (and at or above the critical one) an obstacle is a WARNING
    pub warning_distance_cm: f32,
    /// Visible classes that confirm a close echo as a real obstacle
    pub obstacle_classes: Vec<String>,
}

impl Default for RangingConfig {
    fn default() -> Self {
        Self {
            critical_distance_cm: 50.0,
            unconditional_critical_cm: 30.0,
            warning_distance_cm: 100.0,
            obstacle_classes: ["person", "car", "truck", "bicycle", "chair", "door"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl RangingConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        let ordered = self.unconditional_critical_cm > 0.0
            && self.unconditional_critical_cm <= self.critical_distance_cm
            && self.critical_distance_cm <= self.warning_distance_cm;
        if !ordered {
            return Err(
                "Ranging thresholds must satisfy 0 < unconditional <= critical <= warning".to_string(),
            );
        }
        Ok(())
    }
}

/// Text recognition gating configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextConfig {
    /// Run the text recognizer at all
    pub enabled: bool,
    /// Spans below this confidence are discarded
    pub min_text_confidence: f32,
    /// Classes that always trigger recognition (compared case-insensitively)
    pub trigger_classes: Vec<String>,
    /// Classes that trigger recognition only when detected confidently
    pub document_classes: Vec<String>,
    pub document_confidence: f32,
    /// Cleaned spans shorter than this are discarded
    pub min_text_length: usize,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_text_confidence: 0.3,
            trigger_classes: ["text", "sign", "label", "book", "screen"]
                .into_iter()
                .map(String::from)
                .collect(),
            document_classes: vec!["backpack".to_string(), "book".to_string()],
            document_confidence: 0.8,
            min_text_length: 2,
        }
    }
}

impl TextConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.min_text_confidence) {
            return Err("Text confidence must be between 0 and 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.document_confidence) {
            return Err("Document confidence must be between 0 and 1".to_string());
        }
        Ok(())
    }
}
