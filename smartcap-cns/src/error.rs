//! Error types for smartcap-cns

use smartcap_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HapticError {
    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Queue error: {0}")]
    Queue(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}
