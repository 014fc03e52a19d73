//! smartcap-engine: alert fusion for SmartCap
//!
//! Fuses tracked detections, ranging readings and recognized text into at
//! most one alert per frame, rate-limits it, and hands it to the voice and
//! haptic outputs. The [`Pipeline`] drives the engine from a frame source.

pub mod buffer;
pub mod config;
pub mod decision;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod source;
pub mod stats;

pub use buffer::FrameBuffer;
pub use config::{DecisionConfig, DispatchConfig, PipelineConfig, SmartCapConfig};
pub use decision::DecisionEngine;
pub use dispatch::DispatchGate;
pub use engine::{AlertEngine, AlertEngineBuilder};
pub use error::EngineError;
pub use pipeline::{Pipeline, PipelineStatus};
pub use source::{ChannelFrameSource, FrameInput, FrameSource};
pub use stats::ProcessingStats;
