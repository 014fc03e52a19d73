#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use smartcap_core::{BBox, Detection, Frame, TextSpan};
use smartcap_eye::{Detector, RangingSensor, TextRecognizer, VisionError};
use std::collections::HashMap;

/// Detector returning canned detections per frame id
#[derive(Default)]
pub struct ScriptedDetector {
    frames: Mutex<HashMap<u64, Vec<Detection>>>,
    panic_on: Option<u64>,
}

impl ScriptedDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frame(self, frame_id: u64, detections: Vec<Detection>) -> Self {
        self.frames.lock().insert(frame_id, detections);
        self
    }

    pub fn panicking_on(mut self, frame_id: u64) -> Self {
        self.panic_on = Some(frame_id);
        self
    }
}

#[async_trait]
impl Detector for ScriptedDetector {
    async fn detect(&self, frame: &Frame) -> Result<Vec<Detection>, VisionError> {
        if self.panic_on == Some(frame.id) {
            panic!("detector crashed on frame {}", frame.id);
        }
        Ok(self.frames.lock().get(&frame.id).cloned().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Recognizer returning the same spans for every frame
pub struct FixedRecognizer {
    pub spans: Vec<TextSpan>,
}

#[async_trait]
impl TextRecognizer for FixedRecognizer {
    async fn recognize(&self, _frame: &Frame) -> Result<Vec<TextSpan>, VisionError> {
        Ok(self.spans.clone())
    }
}

/// Sensor returning a fixed reading or failing
pub struct FixedSensor {
    pub reading: Option<i32>,
}

#[async_trait]
impl RangingSensor for FixedSensor {
    async fn read_mm(&self) -> Result<i32, VisionError> {
        self.reading
            .ok_or_else(|| VisionError::Ranging("no echo".to_string()))
    }
}

pub fn person(x: f32, distance_m: f32) -> Detection {
    Detection::new("person", 0.9, BBox::new(x, 40.0, x + 100.0, 440.0)).with_distance(distance_m)
}

pub fn detection(class_name: &str, confidence: f32) -> Detection {
    Detection::new(class_name, confidence, BBox::new(250.0, 100.0, 390.0, 300.0))
}

pub fn frame(id: u64) -> Frame {
    Frame::new(id, 640, 480)
}
