//! Single-alert selection from the signals of one frame

use crate::config::DecisionConfig;
use smartcap_core::{Alert, AlertCategory, AlertLevel, TextSpan, TrackedDetection};

/// Picks the one alert worth announcing for a frame.
///
/// Precedence: critical ranging obstacle, moving object class, recognized
/// text, confident generic object, ranging warning.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    config: DecisionConfig,
}

impl DecisionEngine {
    pub fn new(config: DecisionConfig) -> Self {
        Self { config }
    }

    pub fn decide(
        &self,
        tracked: &[TrackedDetection],
        ranging_alert: Option<Alert>,
        texts: &[TextSpan],
    ) -> Option<Alert> {
        if let Some(alert) = ranging_alert.as_ref() {
            if alert.level == AlertLevel::Critical {
                return ranging_alert;
            }
        }

        let moving = tracked.iter().find(|t| {
            self.config
                .moving_object_classes
                .iter()
                .any(|class| class == t.class_name())
        });
        if let Some(t) = moving {
            return Some(
                Alert::new(
                    AlertCategory::MovingObject,
                    AlertLevel::Warning,
                    format!("{} detected", capitalize(t.class_name())),
                )
                .with_object(t.class_name(), t.confidence()),
            );
        }

        if let Some(span) = texts.first() {
            return Some(
                Alert::new(AlertCategory::Text, AlertLevel::Safe, format!("Sign: {}", span.text))
                    .with_text(span.text.clone()),
            );
        }

        let confident = tracked
            .iter()
            .find(|t| t.confidence() > self.config.min_confidence);
        if let Some(t) = confident {
            return Some(
                Alert::new(
                    AlertCategory::Object,
                    AlertLevel::Safe,
                    format!("Object: {}", t.class_name()),
                )
                .with_object(t.class_name(), t.confidence()),
            );
        }

        ranging_alert
    }
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new(DecisionConfig::default())
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartcap_core::{BBox, Detection, Movement};

    fn tracked(class_name: &str, confidence: f32) -> TrackedDetection {
        TrackedDetection {
            detection: Detection::new(class_name, confidence, BBox::new(0.0, 0.0, 10.0, 10.0)),
            track_id: 1,
            movement: Movement::new_track(),
        }
    }

    fn ranging(level: AlertLevel) -> Alert {
        Alert::new(AlertCategory::Obstacle, level, "ranging").with_distance_cm(25.0)
    }

    #[test]
    fn test_nothing_to_say() {
        let engine = DecisionEngine::default();
        assert!(engine.decide(&[], None, &[]).is_none());
        assert!(engine.decide(&[tracked("cup", 0.3)], None, &[]).is_none());
    }

    #[test]
    fn test_critical_ranging_wins() {
        let engine = DecisionEngine::default();
        let alert = engine
            .decide(
                &[tracked("person", 0.95)],
                Some(ranging(AlertLevel::Critical)),
                &[TextSpan::new("EXIT", 0.9)],
            )
            .unwrap();
        assert_eq!(alert.category, AlertCategory::Obstacle);
        assert_eq!(alert.level, AlertLevel::Critical);
        assert_eq!(alert.distance_cm, Some(25.0));
    }

    #[test]
    fn test_moving_object() {
        let engine = DecisionEngine::default();
        let alert = engine
            .decide(
                &[tracked("chair", 0.9), tracked("truck", 0.6)],
                Some(ranging(AlertLevel::Warning)),
                &[TextSpan::new("EXIT", 0.9)],
            )
            .unwrap();
        assert_eq!(alert.category, AlertCategory::MovingObject);
        assert_eq!(alert.level, AlertLevel::Warning);
        assert_eq!(alert.message, "Truck detected");
        assert_eq!(alert.object.as_deref(), Some("truck"));
        assert_eq!(alert.confidence, Some(0.6));
    }

    #[test]
    fn test_text_before_generic_objects() {
        let engine = DecisionEngine::default();
        let alert = engine
            .decide(
                &[tracked("chair", 0.9)],
                None,
                &[TextSpan::new("Platform 2", 0.8), TextSpan::new("EXIT", 0.9)],
            )
            .unwrap();
        assert_eq!(alert.category, AlertCategory::Text);
        assert_eq!(alert.level, AlertLevel::Safe);
        assert_eq!(alert.message, "Sign: Platform 2");
        assert_eq!(alert.text.as_deref(), Some("Platform 2"));
    }

    #[test]
    fn test_generic_object_needs_confidence() {
        let engine = DecisionEngine::default();
        let alert = engine
            .decide(&[tracked("cup", 0.5), tracked("chair", 0.51)], None, &[])
            .unwrap();
        assert_eq!(alert.category, AlertCategory::Object);
        assert_eq!(alert.message, "Object: chair");
    }

    #[test]
    fn test_ranging_warning_is_last_resort() {
        let engine = DecisionEngine::default();
        let alert = engine
            .decide(&[tracked("cup", 0.2)], Some(ranging(AlertLevel::Warning)), &[])
            .unwrap();
        assert_eq!(alert.category, AlertCategory::Obstacle);
        assert_eq!(alert.level, AlertLevel::Warning);

        let alert = engine
            .decide(&[tracked("chair", 0.9)], Some(ranging(AlertLevel::Warning)), &[])
            .unwrap();
        assert_eq!(alert.category, AlertCategory::Object);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("person"), "Person");
        assert_eq!(capitalize("traffic light"), "Traffic light");
        assert_eq!(capitalize("CAR"), "Car");
        assert_eq!(capitalize(""), "");
    }
}
