//! Motor drivers

use crate::error::HapticError;
use crate::pattern::HapticCommand;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

/// Trait for vibration motor drivers
#[async_trait]
pub trait HapticDriver: Send + Sync {
    /// Run the motor at `intensity` for `duration_ms`
    async fn pulse(&self, intensity: u8, duration_ms: u16) -> Result<(), HapticError>;

    /// Turn the motor off
    async fn stop(&self) -> Result<(), HapticError>;

    fn name(&self) -> &str {
        "haptic"
    }
}

/// Driver writing encoded commands to a byte sink
pub struct WriterHapticDriver<W> {
    writer: tokio::sync::Mutex<W>,
}

impl<W> WriterHapticDriver<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer: tokio::sync::Mutex::new(writer),
        }
    }

    async fn send(&self, command: HapticCommand) -> Result<(), HapticError> {
        let mut writer = self.writer.lock().await;
        writer.write_all(&command.encode()).await?;
        writer.flush().await?;
        debug!(
            "Haptic command sent: intensity={} duration={}ms",
            command.intensity, command.duration_ms
        );
        Ok(())
    }
}

#[async_trait]
impl<W> HapticDriver for WriterHapticDriver<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn pulse(&self, intensity: u8, duration_ms: u16) -> Result<(), HapticError> {
        self.send(HapticCommand::pulse(intensity, duration_ms)).await
    }

    async fn stop(&self) -> Result<(), HapticError> {
        self.send(HapticCommand::stop()).await
    }

    fn name(&self) -> &str {
        "writer"
    }
}

/// Commands remembered by [`LogHapticDriver`]
pub const COMMAND_LOG_CAPACITY: usize = 256;

/// Driver that logs commands instead of moving a motor
#[derive(Clone, Default)]
pub struct LogHapticDriver {
    commands: Arc<Mutex<VecDeque<HapticCommand>>>,
}

impl LogHapticDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent commands, oldest first
    pub fn commands(&self) -> Vec<HapticCommand> {
        self.commands.lock().iter().copied().collect()
    }

    fn record(&self, command: HapticCommand) {
        let mut commands = self.commands.lock();
        if commands.len() == COMMAND_LOG_CAPACITY {
            commands.pop_front();
        }
        commands.push_back(command);
    }
}

#[async_trait]
impl HapticDriver for LogHapticDriver {
    async fn pulse(&self, intensity: u8, duration_ms: u16) -> Result<(), HapticError> {
        info!("VIBRATE: intensity={} duration={}ms", intensity, duration_ms);
        self.record(HapticCommand::pulse(intensity, duration_ms));
        Ok(())
    }

    async fn stop(&self) -> Result<(), HapticError> {
        debug!("VIBRATE: stop");
        self.record(HapticCommand::stop());
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
