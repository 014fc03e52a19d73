//! Text recognition gating and cleanup

use crate::config::TextConfig;
use smartcap_core::{Detection, TextSpan};

/// Decides when the recognizer is worth running and cleans what it returns
#[derive(Debug, Clone)]
pub struct TextGate {
    config: TextConfig,
}

impl TextGate {
    pub fn new(config: TextConfig) -> Self {
        Self { config }
    }

    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// True when a detection suggests readable text in the frame
    pub fn should_run_ocr(&self, detections: &[Detection]) -> bool {
        if !self.config.enabled {
            return false;
        }

        detections.iter().any(|d| {
            let class_name = d.class_name.to_lowercase();
            let trigger = self
                .config
                .trigger_classes
                .iter()
                .any(|c| c.eq_ignore_ascii_case(&class_name));
            let document = d.confidence > self.config.document_confidence
                && self
                    .config
                    .document_classes
                    .iter()
                    .any(|c| c.eq_ignore_ascii_case(&class_name));
            trigger || document
        })
    }

    /// Collapse whitespace and reject fragments that cannot be read aloud
    pub fn clean_text(&self, raw: &str) -> Option<String> {
        let cleaned = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if cleaned.chars().count() < self.config.min_text_length {
            return None;
        }
        if !cleaned.chars().any(char::is_alphanumeric) {
            return None;
        }
        Some(cleaned)
    }

    /// Clean and confidence-filter recognized spans, keeping their order
    pub fn filter_spans(&self, spans: Vec<TextSpan>) -> Vec<TextSpan> {
        spans
            .into_iter()
            .filter(|span| span.confidence >= self.config.min_text_confidence)
            .filter_map(|mut span| {
                span.text = self.clean_text(&span.text)?;
                Some(span)
            })
            .collect()
    }
}

impl Default for TextGate {
    fn default() -> Self {
        Self::new(TextConfig::default())
    }
}
