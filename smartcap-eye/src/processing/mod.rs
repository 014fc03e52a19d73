//! Per-frame detection processing

pub mod detection;
pub mod movement;
pub mod tracker;

pub use detection::{overall_level, sort_by_priority, DetectionEnricher};
pub use movement::{MotionSample, MovementClassifier};
pub use tracker::{ObjectTracker, Track};
