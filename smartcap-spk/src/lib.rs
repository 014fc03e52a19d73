//! smartcap-spk: spoken alerts for SmartCap
//!
//! Alerts are queued to a background worker that drives a text-to-speech
//! engine, so the processing loop never waits on audio.

pub mod config;
pub mod engines;
pub mod error;
pub mod voice;

pub use config::{EngineKind, SpeechConfig};
pub use engines::log::LogTtsEngine;
pub use engines::native::NativeTtsEngine;
pub use engines::TtsEngine;
pub use error::SpeechError;
pub use voice::VoiceOutput;
