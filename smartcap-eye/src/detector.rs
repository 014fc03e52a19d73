//! Boundaries to the perception collaborators

use crate::error::VisionError;
use async_trait::async_trait;
use smartcap_core::{Detection, Frame, TextSpan};

/// Object detector (model inference happens behind this trait)
#[async_trait]
pub trait Detector: Send + Sync {
    /// Detect objects in a frame. Each detection carries class, confidence,
    /// bbox and, when the back-end can range it, a distance estimate.
    async fn detect(&self, frame: &Frame) -> Result<Vec<Detection>, VisionError>;

    fn name(&self) -> &str {
        "detector"
    }
}

/// Optical character recognizer
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, frame: &Frame) -> Result<Vec<TextSpan>, VisionError>;

    fn name(&self) -> &str {
        "text-recognizer"
    }
}

/// Short-range proximity sensor (ultrasonic / time-of-flight).
///
/// Returns the latest reading in millimetres; zero or negative means no echo.
#[async_trait]
pub trait RangingSensor: Send + Sync {
    async fn read_mm(&self) -> Result<i32, VisionError>;
}
