//! Error types for smartcap-engine

use smartcap_cns::HapticError;
use smartcap_core::CoreError;
use smartcap_eye::VisionError;
use smartcap_spk::SpeechError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Vision error: {0}")]
    Vision(#[from] VisionError),

    #[error("Speech error: {0}")]
    Speech(#[from] SpeechError),

    #[error("Haptic error: {0}")]
    Haptic(#[from] HapticError),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Frame source error: {0}")]
    Source(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),
}
