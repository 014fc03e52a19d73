//! Engine configuration and the aggregate SmartCap configuration

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use smartcap_cns::HapticConfig;
use smartcap_eye::{HazardConfig, RangingConfig, TextConfig, TrackerConfig};
use smartcap_spk::SpeechConfig;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Alert selection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecisionConfig {
    /// Generic objects are announced only above this confidence
    pub min_confidence: f32,
    /// Classes announced as moving objects ahead of text and generic objects
    pub moving_object_classes: Vec<String>,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            moving_object_classes: vec!["person".to_string(), "car".to_string(), "truck".to_string()],
        }
    }
}

impl DecisionConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err("min_confidence must be between 0 and 1".to_string());
        }
        Ok(())
    }
}

/// Rate limiting and deduplication of dispatched alerts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
    /// Minimum gap between two dispatched alerts
    pub cooldown_ms: u64,
    /// Recent alert keys remembered for deduplication
    pub history_size: usize,
    /// How long a remembered key blocks the same alert. While it does not
    /// exceed `cooldown_ms` (as with the defaults) the cooldown always rejects
    /// first and the key history is informational only.
    pub dedup_window_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 500,
            history_size: 5,
            dedup_window_ms: 500,
        }
    }
}

impl DispatchConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn dedup_window(&self) -> Duration {
        Duration::from_millis(self.dedup_window_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.history_size == 0 {
            return Err("Dispatch history must hold at least one alert".to_string());
        }
        Ok(())
    }
}

/// Frame pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Frames held between ingestion and processing; the oldest is dropped beyond it
    pub buffer_capacity: usize,
    /// Processing loop tick
    pub poll_interval_ms: u64,
    /// Bound on a single frame source or ranging sensor read
    pub read_timeout_ms: u64,
    /// Processing statistics are logged every this many frames
    pub stats_log_interval: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 10,
            poll_interval_ms: 10,
            read_timeout_ms: 2000,
            stats_log_interval: 30,
        }
    }
}

impl PipelineConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.buffer_capacity == 0 {
            return Err("Frame buffer capacity must be at least 1".to_string());
        }
        if self.poll_interval_ms == 0 {
            return Err("Poll interval must be positive".to_string());
        }
        if self.read_timeout_ms == 0 {
            return Err("Read timeout must be positive".to_string());
        }
        Ok(())
    }
}

/// Complete SmartCap configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SmartCapConfig {
    /// Log filter used by the host binary
    pub log_level: String,
    pub tracker: TrackerConfig,
    pub hazard: HazardConfig,
    pub ranging: RangingConfig,
    pub text: TextConfig,
    pub decision: DecisionConfig,
    pub dispatch: DispatchConfig,
    pub pipeline: PipelineConfig,
    pub speech: SpeechConfig,
    pub haptic: HapticConfig,
}

impl Default for SmartCapConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            tracker: TrackerConfig::default(),
            hazard: HazardConfig::default(),
            ranging: RangingConfig::default(),
            text: TextConfig::default(),
            decision: DecisionConfig::default(),
            dispatch: DispatchConfig::default(),
            pipeline: PipelineConfig::default(),
            speech: SpeechConfig::default(),
            haptic: HapticConfig::default(),
        }
    }
}

impl FromStr for SmartCapConfig {
    type Err = EngineError;

    /// Parse a JSON, TOML or YAML document
    fn from_str(content: &str) -> Result<Self, Self::Err> {
        Ok(smartcap_core::parse_config(content)?)
    }
}

impl SmartCapConfig {
    /// Load configuration from a JSON, TOML or YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        Ok(smartcap_core::read_config(path)?)
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Apply `SMARTCAP_*` environment overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from a key lookup. Unparseable values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("SMARTCAP_MIN_CONFIDENCE") {
            if let Ok(v) = value.trim().parse::<f32>() {
                self.decision.min_confidence = v;
            }
        }

        if let Some(value) = lookup("SMARTCAP_ALERT_COOLDOWN_MS") {
            if let Ok(v) = value.trim().parse::<u64>() {
                self.dispatch.cooldown_ms = v;
            }
        }

        if let Some(value) = lookup("SMARTCAP_ENABLE_OCR") {
            match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.text.enabled = true,
                "0" | "false" | "no" | "off" => self.text.enabled = false,
                _ => {}
            }
        }

        if let Some(value) = lookup("SMARTCAP_LOG_LEVEL") {
            if !value.trim().is_empty() {
                self.log_level = value.trim().to_string();
            }
        }
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), EngineError> {
        let sections: [(&str, Result<(), String>); 9] = [
            ("tracker", self.tracker.validate()),
            ("hazard", self.hazard.validate()),
            ("ranging", self.ranging.validate()),
            ("text", self.text.validate()),
            ("decision", self.decision.validate()),
            ("dispatch", self.dispatch.validate()),
            ("pipeline", self.pipeline.validate()),
            ("speech", self.speech.validate()),
            ("haptic", self.haptic.validate()),
        ];

        for (section, result) in sections {
            if let Err(e) = result {
                return Err(EngineError::Config(format!("{}: {}", section, e)));
            }
        }
        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, EngineError> {
        toml::to_string_pretty(self).map_err(|e| EngineError::Config(e.to_string()))
    }
}
