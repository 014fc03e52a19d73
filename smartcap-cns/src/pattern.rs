//! Vibration patterns and the motor command protocol

use crate::config::HapticConfig;
use crate::error::HapticError;
use bytes::{BufMut, Bytes, BytesMut};
use smartcap_core::AlertLevel;
use std::time::Duration;

/// Command header byte
pub const COMMAND_HEADER: u8 = b'V';
pub const COMMAND_LEN: usize = 4;

/// One motor pulse followed by a pause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseStep {
    pub on_ms: u16,
    pub off_ms: u16,
}

impl PulseStep {
    pub const fn new(on_ms: u16, off_ms: u16) -> Self {
        Self { on_ms, off_ms }
    }
}

/// A sequence of pulses at a fixed intensity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HapticPattern {
    pub level: AlertLevel,
    pub intensity: u8,
    pub steps: Vec<PulseStep>,
}

impl HapticPattern {
    /// Pattern for an alert level; SAFE has none.
    ///
    /// WARNING is three even pulses, CRITICAL three short pulses and a long one.
    pub fn for_level(level: AlertLevel, config: &HapticConfig) -> Option<Self> {
        match level {
            AlertLevel::Safe => None,
            AlertLevel::Warning => Some(Self {
                level,
                intensity: config.warning_intensity,
                steps: vec![
                    PulseStep::new(100, 100),
                    PulseStep::new(100, 100),
                    PulseStep::new(100, 0),
                ],
            }),
            AlertLevel::Critical => Some(Self {
                level,
                intensity: config.critical_intensity,
                steps: vec![
                    PulseStep::new(50, 50),
                    PulseStep::new(50, 50),
                    PulseStep::new(50, 50),
                    PulseStep::new(500, 0),
                ],
            }),
        }
    }

    pub fn total_duration(&self) -> Duration {
        let ms: u64 = self
            .steps
            .iter()
            .map(|s| u64::from(s.on_ms) + u64::from(s.off_ms))
            .sum();
        Duration::from_millis(ms)
    }
}

/// Motor command: `['V', intensity, duration_lo, duration_hi]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HapticCommand {
    pub intensity: u8,
    pub duration_ms: u16,
}

impl HapticCommand {
    pub fn pulse(intensity: u8, duration_ms: u16) -> Self {
        Self {
            intensity,
            duration_ms,
        }
    }

    /// Motor off
    pub fn stop() -> Self {
        Self::pulse(0, 0)
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(COMMAND_LEN);
        buf.put_u8(COMMAND_HEADER);
        buf.put_u8(self.intensity);
        buf.put_u16_le(self.duration_ms);
        buf.freeze()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, HapticError> {
        if bytes.len() != COMMAND_LEN {
            return Err(HapticError::Protocol(format!(
                "Command must be {} bytes, got {}",
                COMMAND_LEN,
                bytes.len()
            )));
        }
        if bytes[0] != COMMAND_HEADER {
            return Err(HapticError::Protocol(format!("Bad command header 0x{:02x}", bytes[0])));
        }
        Ok(Self {
            intensity: bytes[1],
            duration_ms: u16::from_le_bytes([bytes[2], bytes[3]]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_has_no_pattern() {
        assert!(HapticPattern::for_level(AlertLevel::Safe, &HapticConfig::default()).is_none());
    }

    #[test]
    fn test_warning_pattern() {
        let pattern = HapticPattern::for_level(AlertLevel::Warning, &HapticConfig::default()).unwrap();
        assert_eq!(pattern.intensity, 150);
        assert_eq!(pattern.steps.len(), 3);
        assert_eq!(pattern.steps[2], PulseStep::new(100, 0));
        assert_eq!(pattern.total_duration(), Duration::from_millis(500));
    }

    #[test]
    fn test_critical_pattern() {
        let pattern = HapticPattern::for_level(AlertLevel::Critical, &HapticConfig::default()).unwrap();
        assert_eq!(pattern.intensity, 255);
        assert_eq!(pattern.steps.len(), 4);
        assert_eq!(pattern.steps[3], PulseStep::new(500, 0));
        assert_eq!(pattern.total_duration(), Duration::from_millis(800));
    }

    #[test]
    fn test_command_encoding() {
        let cmd = HapticCommand::pulse(150, 300);
        assert_eq!(cmd.encode().as_ref(), &[b'V', 150, 0x2c, 0x01]);
        assert_eq!(HapticCommand::stop().encode().as_ref(), &[b'V', 0, 0, 0]);
    }

    #[test]
    fn test_command_decoding() {
        let cmd = HapticCommand::decode(&[b'V', 255, 0xf4, 0x01]).unwrap();
        assert_eq!(cmd, HapticCommand::pulse(255, 500));

        assert!(HapticCommand::decode(&[b'X', 1, 0, 0]).is_err());
        assert!(HapticCommand::decode(&[b'V', 1, 0]).is_err());
    }
}
