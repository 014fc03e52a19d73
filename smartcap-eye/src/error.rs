//! Error types for smartcap-eye

use smartcap_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Detector error: {0}")]
    Detector(String),

    #[error("Text recognizer error: {0}")]
    Recognizer(String),

    #[error("Ranging sensor error: {0}")]
    Ranging(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}
