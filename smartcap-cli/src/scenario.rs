//! Recorded scenarios: one JSON object per line describing what the camera,
//! detector, recognizer and ranging sensor saw on each frame.
//!
//! ```text
//! {"frame_id": 1, "ranging_mm": 420, "detections": [{"class": "person", "confidence": 0.9, "bbox": {"x1": 100, "y1": 40, "x2": 200, "y2": 440}}]}
//! {"frame_id": 2, "at_ms": 250, "texts": [{"text": "EXIT", "confidence": 0.8}]}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use anyhow::{bail, Context};
use async_trait::async_trait;
use serde::Deserialize;
use smartcap_core::{Detection, Frame, TextSpan};
use smartcap_engine::{EngineError, FrameInput, FrameSource};
use smartcap_eye::{Detector, TextRecognizer, VisionError};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Spacing of frames that carry no `at_ms`
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 100;

fn default_width() -> u32 {
    640
}

fn default_height() -> u32 {
    480
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioFrame {
    pub frame_id: u64,
    /// Offset from the start of the replay
    #[serde(default)]
    pub at_ms: Option<u64>,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default)]
    pub ranging_mm: Option<i32>,
    #[serde(default)]
    pub detections: Vec<Detection>,
    #[serde(default)]
    pub texts: Vec<TextSpan>,
}

impl ScenarioFrame {
    pub fn offset(&self) -> Duration {
        Duration::from_millis(self.at_ms.unwrap_or(0))
    }

    pub fn to_input(&self) -> FrameInput {
        FrameInput::new(Frame::new(self.frame_id, self.width, self.height), self.ranging_mm)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scenario {
    pub frames: Vec<ScenarioFrame>,
}

impl Scenario {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid scenario {}", path.display()))
    }

    /// Parse a JSON-lines scenario. Frames without `at_ms` are spaced
    /// [`DEFAULT_FRAME_INTERVAL_MS`] after the previous one.
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let mut frames: Vec<ScenarioFrame> = Vec::new();
        let mut last_at = None;

        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut frame: ScenarioFrame = serde_json::from_str(line)
                .with_context(|| format!("line {}", index + 1))?;

            let at_ms = match (frame.at_ms, last_at) {
                (Some(at), Some(prev)) if at < prev => {
                    bail!("line {}: at_ms {} goes back in time (previous {})", index + 1, at, prev);
                }
                (Some(at), _) => at,
                (None, Some(prev)) => prev + DEFAULT_FRAME_INTERVAL_MS,
                (None, None) => 0,
            };
            frame.at_ms = Some(at_ms);
            last_at = Some(at_ms);
            frames.push(frame);
        }

        Ok(Self { frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn detector(&self) -> ScenarioDetector {
        ScenarioDetector {
            detections: self
                .frames
                .iter()
                .map(|f| (f.frame_id, f.detections.clone()))
                .collect(),
        }
    }

    pub fn recognizer(&self) -> ScenarioRecognizer {
        ScenarioRecognizer {
            texts: self
                .frames
                .iter()
                .filter(|f| !f.texts.is_empty())
                .map(|f| (f.frame_id, f.texts.clone()))
                .collect(),
        }
    }

    /// Frame source replaying the scenario, paced by `at_ms` when `realtime`
    pub fn source(&self, realtime: bool) -> ScenarioSource {
        ScenarioSource {
            frames: Arc::new(self.frames.clone()),
            next: 0,
            realtime,
            started: None,
        }
    }
}

/// Detector answering with the recorded detections of each frame
pub struct ScenarioDetector {
    detections: HashMap<u64, Vec<Detection>>,
}

#[async_trait]
impl Detector for ScenarioDetector {
    async fn detect(&self, frame: &Frame) -> Result<Vec<Detection>, VisionError> {
        Ok(self.detections.get(&frame.id).cloned().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "scenario"
    }
}

/// Recognizer answering with the recorded text of each frame
pub struct ScenarioRecognizer {
    texts: HashMap<u64, Vec<TextSpan>>,
}

#[async_trait]
impl TextRecognizer for ScenarioRecognizer {
    async fn recognize(&self, frame: &Frame) -> Result<Vec<TextSpan>, VisionError> {
        Ok(self.texts.get(&frame.id).cloned().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "scenario"
    }
}

pub struct ScenarioSource {
    frames: Arc<Vec<ScenarioFrame>>,
    next: usize,
    realtime: bool,
    started: Option<Instant>,
}

#[async_trait]
impl FrameSource for ScenarioSource {
    /// Cancel-safe: the cursor only advances once the frame is due, so a
    /// read dropped by a timeout resumes the same frame on the next call.
    async fn next_frame(&mut self) -> Result<Option<FrameInput>, EngineError> {
        let frame = match self.frames.get(self.next) {
            Some(frame) => frame,
            None => return Ok(None),
        };

        if self.realtime {
            let started = *self.started.get_or_insert_with(Instant::now);
            tokio::time::sleep_until(started + frame.offset()).await;
        }

        self.next += 1;
        debug!("Replaying frame {}", frame.frame_id);
        Ok(Some(frame.to_input()))
    }
}
