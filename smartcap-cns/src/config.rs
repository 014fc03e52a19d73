//! Configuration for haptic feedback

use serde::{Deserialize, Serialize};

/// Haptic feedback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HapticConfig {
    /// Enable vibration feedback
    pub enabled: bool,
    /// Patterns waiting to be played before new ones are dropped
    pub queue_size: usize,
    /// Motor duty (0-255) for WARNING patterns
    pub warning_intensity: u8,
    /// Motor duty (0-255) for CRITICAL patterns
    pub critical_intensity: u8,
    /// Timeout for a single driver write
    pub command_timeout_ms: u64,
}

impl Default for HapticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            queue_size: 8,
            warning_intensity: 150,
            critical_intensity: 255,
            command_timeout_ms: 500,
        }
    }
}

impl HapticConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.queue_size == 0 {
            return Err("Haptic queue size must be at least 1".to_string());
        }
        if self.warning_intensity == 0 || self.critical_intensity == 0 {
            return Err("Pattern intensities must be non-zero".to_string());
        }
        if self.critical_intensity < self.warning_intensity {
            return Err("Critical intensity must not be below warning intensity".to_string());
        }
        if self.command_timeout_ms == 0 {
            return Err("Command timeout must be positive".to_string());
        }
        Ok(())
    }
}
