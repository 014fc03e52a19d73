//! Error types for smartcap-spk

use smartcap_core::CoreError;
use thiserror::Error;

/// Speech output errors
#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("Synthesizer error: {0}")]
    Synthesizer(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Queue error: {0}")]
    Queue(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}
