//! smartcap-core: shared building blocks for the SmartCap alert engine
//!
//! Holds the data model that flows between the perception, decision and
//! output crates, the common error type, and the multi-format config loader.

pub mod config;
pub mod error;
pub mod types;

pub use config::{parse_config, read_config};
pub use error::{CoreError, Result};
pub use types::{
    Alert, AlertCategory, AlertKey, AlertLevel, BBox, Detection, Direction, Frame, Lateral,
    Movement, Position, TextSpan, TrackedDetection,
};
