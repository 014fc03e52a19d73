//! smartcap-eye: perception-side correlation for SmartCap
//!
//! Turns raw per-frame detections into tracked objects with motion intent,
//! classifies their hazard level, and checks the ranging sensor for close
//! obstacles the camera may have missed.

pub mod config;
pub mod detector;
pub mod error;
pub mod hazard;
pub mod processing;
pub mod ranging;
pub mod text;

pub use config::{HazardConfig, RangingConfig, TextConfig, TrackerConfig};
pub use detector::{Detector, RangingSensor, TextRecognizer};
pub use error::VisionError;
pub use hazard::HazardClassifier;
pub use processing::{DetectionEnricher, MovementClassifier, ObjectTracker};
pub use ranging::RangingObstacleCheck;
pub use text::TextGate;
