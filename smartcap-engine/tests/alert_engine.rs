mod common;

use async_trait::async_trait;
use common::{detection, frame, person, FixedRecognizer, FixedSensor, ScriptedDetector};
use mockall::mock;
use smartcap_cns::{HapticCommand, HapticConfig, HapticController, LogHapticDriver};
use smartcap_core::{AlertCategory, AlertLevel, Frame, TextSpan};
use smartcap_engine::{AlertEngine, EngineError, SmartCapConfig};
use smartcap_eye::{Detector, TextRecognizer, VisionError};
use smartcap_spk::{LogTtsEngine, SpeechConfig, VoiceOutput};
use std::sync::Arc;
use std::time::{Duration, Instant};

mock! {
    pub Vision {}

    #[async_trait]
    impl Detector for Vision {
        async fn detect(&self, frame: &Frame) -> Result<Vec<smartcap_core::Detection>, VisionError>;
    }
}

mock! {
    pub Ocr {}

    #[async_trait]
    impl TextRecognizer for Ocr {
        async fn recognize(&self, frame: &Frame) -> Result<Vec<TextSpan>, VisionError>;
    }
}

fn engine_with(detector: ScriptedDetector) -> AlertEngine {
    AlertEngine::builder()
        .detector(Arc::new(detector))
        .build()
        .unwrap()
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[tokio::test]
async fn test_empty_frame_without_ranging_gives_nothing() {
    let mut engine = engine_with(ScriptedDetector::new());
    let alert = engine.process(&frame(1), Some(0)).await.unwrap();
    assert!(alert.is_none());
    assert_eq!(engine.stats().frames_processed, 1);
    assert!(engine.last_dispatched().is_none());
}

#[tokio::test]
async fn test_very_close_ranging_is_critical() {
    let mut engine = engine_with(ScriptedDetector::new());
    let alert = engine.process(&frame(1), Some(250)).await.unwrap().unwrap();
    assert_eq!(alert.category, AlertCategory::Obstacle);
    assert_eq!(alert.level, AlertLevel::Critical);
    assert_eq!(alert.message, "CRITICAL: Obstacle 25cm ahead");
}

#[tokio::test]
async fn test_ranging_warning_band() {
    let mut engine = engine_with(ScriptedDetector::new());
    let alert = engine.process(&frame(1), Some(700)).await.unwrap().unwrap();
    assert_eq!(alert.level, AlertLevel::Warning);
    assert_eq!(alert.message, "Warning: Object 70cm ahead");
}

#[tokio::test]
async fn test_critical_ranging_beats_person() {
    let detector = ScriptedDetector::new().with_frame(1, vec![person(100.0, 3.0)]);
    let mut engine = engine_with(detector);
    let alert = engine.process(&frame(1), Some(400)).await.unwrap().unwrap();
    assert_eq!(alert.category, AlertCategory::Obstacle);
    assert_eq!(alert.level, AlertLevel::Critical);
}

#[tokio::test]
async fn test_person_is_announced() {
    let detector = ScriptedDetector::new().with_frame(1, vec![detection("cup", 0.95), person(100.0, 3.0)]);
    let mut engine = engine_with(detector);
    let alert = engine.process(&frame(1), None).await.unwrap().unwrap();
    assert_eq!(alert.category, AlertCategory::MovingObject);
    assert_eq!(alert.message, "Person detected");
    assert_eq!(engine.track_count(), 2);
    assert_eq!(engine.stats().detections_made, 2);
}

#[tokio::test]
async fn test_repeat_alert_suppressed_until_cooldown() {
    let detector = ScriptedDetector::new()
        .with_frame(1, vec![person(100.0, 3.0)])
        .with_frame(2, vec![person(102.0, 3.0)])
        .with_frame(3, vec![person(104.0, 3.0)]);
    let mut engine = engine_with(detector);
    let t0 = Instant::now();

    assert!(engine.process_at(&frame(1), None, t0).await.unwrap().is_some());
    assert!(engine.process_at(&frame(2), None, t0 + ms(200)).await.unwrap().is_none());
    let again = engine.process_at(&frame(3), None, t0 + ms(600)).await.unwrap();
    assert_eq!(again.map(|a| a.message), Some("Person detected".to_string()));

    let stats = engine.stats();
    assert_eq!(stats.alerts_dispatched, 2);
    assert_eq!(stats.alerts_suppressed, 1);
    assert_eq!(engine.track_count(), 1);
}

#[tokio::test]
async fn test_tracks_expire_after_timeout() {
    let detector = ScriptedDetector::new().with_frame(1, vec![person(100.0, 3.0)]);
    let mut engine = engine_with(detector);
    let t0 = Instant::now();

    engine.process_at(&frame(1), None, t0).await.unwrap();
    assert_eq!(engine.track_count(), 1);

    engine.process_at(&frame(2), None, t0 + ms(1500)).await.unwrap();
    assert_eq!(engine.track_count(), 1);

    engine.process_at(&frame(3), None, t0 + ms(2100)).await.unwrap();
    assert_eq!(engine.track_count(), 0);
}

#[tokio::test]
async fn test_text_recognized_for_signs() {
    let detector = ScriptedDetector::new().with_frame(1, vec![detection("sign", 0.9)]);
    let engine = AlertEngine::builder()
        .detector(Arc::new(detector))
        .text_recognizer(Arc::new(FixedRecognizer {
            spans: vec![TextSpan::new("  Platform \n 2 ", 0.9), TextSpan::new("x", 0.9)],
        }));
    let mut engine = engine.build().unwrap();

    let alert = engine.process(&frame(1), None).await.unwrap().unwrap();
    assert_eq!(alert.category, AlertCategory::Text);
    assert_eq!(alert.level, AlertLevel::Safe);
    assert_eq!(alert.message, "Sign: Platform 2");
    assert_eq!(engine.stats().ocr_recognitions, 1);
}

#[tokio::test]
async fn test_recognizer_skipped_without_trigger() {
    let mut ocr = MockOcr::new();
    ocr.expect_recognize().times(0);

    let detector = ScriptedDetector::new().with_frame(1, vec![detection("chair", 0.9)]);
    let mut engine = AlertEngine::builder()
        .detector(Arc::new(detector))
        .text_recognizer(Arc::new(ocr))
        .build()
        .unwrap();

    let alert = engine.process(&frame(1), None).await.unwrap().unwrap();
    assert_eq!(alert.message, "Object: chair");
}

#[tokio::test]
async fn test_recognizer_failure_means_no_text() {
    let mut ocr = MockOcr::new();
    ocr.expect_recognize()
        .times(1)
        .returning(|_| Err(VisionError::Recognizer("model missing".to_string())));

    let detector = ScriptedDetector::new().with_frame(1, vec![detection("sign", 0.3)]);
    let mut engine = AlertEngine::builder()
        .detector(Arc::new(detector))
        .text_recognizer(Arc::new(ocr))
        .build()
        .unwrap();

    assert!(engine.process(&frame(1), None).await.unwrap().is_none());
}

#[tokio::test]
async fn test_detector_failure_continues_cycle() {
    let mut vision = MockVision::new();
    vision
        .expect_detect()
        .returning(|_| Err(VisionError::Detector("camera unplugged".to_string())));

    let mut engine = AlertEngine::builder()
        .detector(Arc::new(vision))
        .build()
        .unwrap();

    let alert = engine.process(&frame(1), Some(250)).await.unwrap().unwrap();
    assert_eq!(alert.level, AlertLevel::Critical);
    assert_eq!(engine.track_count(), 0);
}

#[tokio::test]
async fn test_ranging_sensor_polled_when_frame_has_no_reading() {
    let mut engine = AlertEngine::builder()
        .detector(Arc::new(ScriptedDetector::new()))
        .ranging_sensor(Arc::new(FixedSensor { reading: Some(250) }))
        .build()
        .unwrap();
    let alert = engine.process(&frame(1), None).await.unwrap().unwrap();
    assert_eq!(alert.level, AlertLevel::Critical);

    let mut engine = AlertEngine::builder()
        .detector(Arc::new(ScriptedDetector::new()))
        .ranging_sensor(Arc::new(FixedSensor { reading: None }))
        .build()
        .unwrap();
    assert!(engine.process(&frame(1), None).await.unwrap().is_none());
}

#[tokio::test]
async fn test_invalid_frame_rejected() {
    let mut engine = engine_with(ScriptedDetector::new());
    let result = engine.process(&Frame::new(1, 0, 480), Some(250)).await;
    assert!(matches!(result, Err(EngineError::InvalidFrame(_))));
}

#[test]
fn test_builder_requires_detector() {
    let result = AlertEngine::builder().build();
    assert!(matches!(result, Err(EngineError::Config(_))));
}

#[test]
fn test_builder_rejects_invalid_config() {
    let mut config = SmartCapConfig::default();
    config.hazard.warning_distance_m = 0.1;
    let result = AlertEngine::builder()
        .config(config)
        .detector(Arc::new(ScriptedDetector::new()))
        .build();
    assert!(matches!(result, Err(EngineError::Config(_))));
}

#[tokio::test]
async fn test_dispatch_reaches_voice_and_haptics() {
    let tts = LogTtsEngine::new();
    let motor = LogHapticDriver::new();
    let voice = VoiceOutput::spawn(Arc::new(tts.clone()), SpeechConfig::default()).unwrap();
    let haptic = HapticController::spawn(Arc::new(motor.clone()), HapticConfig::default()).unwrap();

    let mut engine = AlertEngine::builder()
        .detector(Arc::new(ScriptedDetector::new()))
        .voice(Arc::new(voice))
        .haptic(Arc::new(haptic))
        .build()
        .unwrap();

    engine.process(&frame(1), Some(250)).await.unwrap();

    for _ in 0..100 {
        if !tts.transcript().is_empty() && !motor.commands().is_empty() {
            break;
        }
        tokio::time::sleep(ms(5)).await;
    }

    assert_eq!(tts.transcript(), vec!["CRITICAL: Obstacle 25cm ahead"]);
    assert_eq!(motor.commands()[0], HapticCommand::pulse(255, 50));

    engine.shutdown().await;
    assert_eq!(motor.commands().last(), Some(&HapticCommand::stop()));
}

#[tokio::test]
async fn test_safe_alert_is_spoken_without_vibration() {
    let tts = LogTtsEngine::new();
    let motor = LogHapticDriver::new();
    let voice = VoiceOutput::spawn(Arc::new(tts.clone()), SpeechConfig::default()).unwrap();
    let haptic = HapticController::spawn(Arc::new(motor.clone()), HapticConfig::default()).unwrap();

    let detector = ScriptedDetector::new().with_frame(1, vec![detection("chair", 0.9)]);
    let mut engine = AlertEngine::builder()
        .detector(Arc::new(detector))
        .voice(Arc::new(voice))
        .haptic(Arc::new(haptic))
        .build()
        .unwrap();

    let alert = engine.process(&frame(1), None).await.unwrap().unwrap();
    assert_eq!(alert.level, AlertLevel::Safe);

    for _ in 0..100 {
        if !tts.transcript().is_empty() {
            break;
        }
        tokio::time::sleep(ms(5)).await;
    }
    assert_eq!(tts.transcript(), vec!["Object: chair"]);
    assert!(motor.commands().is_empty());
}
