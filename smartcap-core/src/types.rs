//! Data model shared by every stage of the alert pipeline

use crate::error::CoreError;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Axis-aligned bounding box (x1, y1) top-left to (x2, y2) bottom-right,
/// in pixel space of the processed frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Width, zero for inverted boxes
    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    /// Height, zero for inverted boxes
    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn center(&self) -> (f32, f32) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    pub fn is_finite(&self) -> bool {
        self.x1.is_finite() && self.y1.is_finite() && self.x2.is_finite() && self.y2.is_finite()
    }

    /// Intersection over Union with another box.
    ///
    /// Degenerate, inverted or non-finite boxes yield 0 instead of dividing by a
    /// zero union.
    pub fn iou(&self, other: &BBox) -> f32 {
        if !self.is_finite() || !other.is_finite() {
            return 0.0;
        }

        let inter_w = (self.x2.min(other.x2) - self.x1.max(other.x1)).max(0.0);
        let inter_h = (self.y2.min(other.y2) - self.y1.max(other.y1)).max(0.0);
        let inter_area = inter_w * inter_h;

        let union_area = self.area() + other.area() - inter_area;
        if union_area <= 0.0 || !union_area.is_finite() {
            return 0.0;
        }

        (inter_area / union_area).clamp(0.0, 1.0)
    }
}

/// Severity of a detection or alert, ordered by urgency
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertLevel {
    #[default]
    Safe,
    Warning,
    Critical,
}

impl AlertLevel {
    /// Numeric code used by the haptic protocol (0 = SAFE, 1 = WARNING, 2 = CRITICAL)
    pub fn code(self) -> u8 {
        match self {
            AlertLevel::Safe => 0,
            AlertLevel::Warning => 1,
            AlertLevel::Critical => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AlertLevel::Safe => "SAFE",
            AlertLevel::Warning => "WARNING",
            AlertLevel::Critical => "CRITICAL",
        }
    }
}

impl TryFrom<u8> for AlertLevel {
    type Error = CoreError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(AlertLevel::Safe),
            1 => Ok(AlertLevel::Warning),
            2 => Ok(AlertLevel::Critical),
            other => Err(CoreError::UnknownAlertLevel(other.to_string())),
        }
    }
}

impl FromStr for AlertLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SAFE" => Ok(AlertLevel::Safe),
            "WARNING" => Ok(AlertLevel::Warning),
            "CRITICAL" => Ok(AlertLevel::Critical),
            _ => Err(CoreError::UnknownAlertLevel(s.to_string())),
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Horizontal position bucket of a detection within the frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Left,
    #[default]
    Center,
    Right,
}

impl Position {
    /// Bucket a center x coordinate normalised to 0.0 (far left) .. 1.0 (far right)
    pub fn from_relative_x(relative_x: f32) -> Self {
        if relative_x < 0.33 {
            Position::Left
        } else if relative_x > 0.67 {
            Position::Right
        } else {
            Position::Center
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Position::Left => "left",
            Position::Center => "center",
            Position::Right => "right",
        }
    }
}

impl FromStr for Position {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Position::Left),
            "center" => Ok(Position::Center),
            "right" => Ok(Position::Right),
            _ => Err(CoreError::UnknownPosition(s.to_string())),
        }
    }
}

/// One object reported by the detector for a single frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Detection {
    #[serde(rename = "class")]
    pub class_name: String,
    pub confidence: f32,
    pub bbox: BBox,
    /// Estimated distance in meters, absent when the detector could not range it
    #[serde(default)]
    pub distance_m: Option<f32>,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub severity: AlertLevel,
    /// Class belongs to the navigation priority set
    #[serde(default)]
    pub priority: bool,
}

impl Detection {
    pub fn new(class_name: impl Into<String>, confidence: f32, bbox: BBox) -> Self {
        Self {
            class_name: class_name.into(),
            confidence,
            bbox,
            distance_m: None,
            position: Position::Center,
            severity: AlertLevel::Safe,
            priority: false,
        }
    }

    pub fn with_distance(mut self, distance_m: f32) -> Self {
        self.distance_m = Some(distance_m);
        self
    }
}

/// Lateral motion component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lateral {
    MovingLeft,
    MovingRight,
}

impl Lateral {
    pub fn side(self) -> &'static str {
        match self {
            Lateral::MovingLeft => "left",
            Lateral::MovingRight => "right",
        }
    }
}

/// Combined motion label of a track
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Stationary,
    New,
    Approaching,
    Receding,
    MovingLeft,
    MovingRight,
    ApproachingLeft,
    ApproachingRight,
    RecedingLeft,
    RecedingRight,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Stationary => "stationary",
            Direction::New => "new",
            Direction::Approaching => "approaching",
            Direction::Receding => "receding",
            Direction::MovingLeft => "moving_left",
            Direction::MovingRight => "moving_right",
            Direction::ApproachingLeft => "approaching_left",
            Direction::ApproachingRight => "approaching_right",
            Direction::RecedingLeft => "receding_left",
            Direction::RecedingRight => "receding_right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Motion derived from the two most recent samples of a track
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub direction: Direction,
    /// `Some(true)` approaching, `Some(false)` receding, `None` no depth signal
    pub approaching: Option<bool>,
    pub lateral: Option<Lateral>,
    /// Magnitude of the depth change in meters
    pub speed: f32,
}

impl Movement {
    pub fn stationary() -> Self {
        Self::default()
    }

    pub fn new_track() -> Self {
        Self {
            direction: Direction::New,
            ..Self::default()
        }
    }
}

/// Detection after it has been assigned to a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedDetection {
    pub detection: Detection,
    pub track_id: u64,
    pub movement: Movement,
}

impl TrackedDetection {
    pub fn class_name(&self) -> &str {
        &self.detection.class_name
    }

    pub fn confidence(&self) -> f32 {
        self.detection.confidence
    }
}

/// Alert category, listed in decision precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCategory {
    Obstacle,
    MovingObject,
    Text,
    Object,
}

impl AlertCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertCategory::Obstacle => "obstacle",
            AlertCategory::MovingObject => "moving_object",
            AlertCategory::Text => "text",
            AlertCategory::Object => "object",
        }
    }
}

impl fmt::Display for AlertCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dedup key of an alert
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertKey {
    pub category: AlertCategory,
    pub message: String,
}

/// The single decision produced by one processing cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Alert {
    pub category: AlertCategory,
    pub level: AlertLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_cm: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Alert {
    pub fn new(category: AlertCategory, level: AlertLevel, message: impl Into<String>) -> Self {
        Self {
            category,
            level,
            message: message.into(),
            distance_cm: None,
            object: None,
            confidence: None,
            text: None,
        }
    }

    pub fn with_distance_cm(mut self, distance_cm: f32) -> Self {
        self.distance_cm = Some(distance_cm);
        self
    }

    pub fn with_object(mut self, object: impl Into<String>, confidence: f32) -> Self {
        self.object = Some(object.into());
        self.confidence = Some(confidence);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn key(&self) -> AlertKey {
        AlertKey {
            category: self.category,
            message: self.message.clone(),
        }
    }
}

/// A span of text returned by the text recognizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextSpan {
    pub text: String,
    pub confidence: f32,
    #[serde(default)]
    pub bbox: Option<BBox>,
}

impl TextSpan {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
            bbox: None,
        }
    }
}

/// One captured frame. The pixel payload is opaque to the engine and only
/// handed to the detector and text recognizer.
#[derive(Debug, Clone)]
pub struct Frame {
    pub id: u64,
    pub width: u32,
    pub height: u32,
    pub captured_at: DateTime<Utc>,
    pub data: Bytes,
}

impl Frame {
    pub fn new(id: u64, width: u32, height: u32) -> Self {
        Self {
            id,
            width,
            height,
            captured_at: Utc::now(),
            data: Bytes::new(),
        }
    }

    pub fn with_data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = data.into();
        self
    }
}
