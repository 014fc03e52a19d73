use async_trait::async_trait;
use proptest::prelude::*;
use smartcap_core::{BBox, Detection, Direction, Frame};
use smartcap_eye::processing::{MotionSample, MovementClassifier};
use smartcap_eye::{Detector, DetectionEnricher, ObjectTracker, VisionError};
use std::time::{Duration, Instant};

struct FixedDetector {
    detections: Vec<Detection>,
}

#[async_trait]
impl Detector for FixedDetector {
    async fn detect(&self, _frame: &Frame) -> Result<Vec<Detection>, VisionError> {
        Ok(self.detections.clone())
    }
}

#[test]
fn test_detector_output_flows_through_tracker() {
    let detector = FixedDetector {
        detections: vec![
            Detection::new("chair", 0.7, BBox::new(500.0, 100.0, 600.0, 300.0)),
            Detection::new("person", 0.9, BBox::new(10.0, 40.0, 110.0, 440.0)),
        ],
    };
    assert_eq!(detector.name(), "detector");

    let frame = Frame::new(1, 640, 480);
    let raw = tokio_test::block_on(detector.detect(&frame)).unwrap();

    let enricher = DetectionEnricher::default();
    let enriched = enricher.enrich_all(raw, frame.width, frame.height);
    assert_eq!(enriched[0].class_name, "person");

    let mut tracker = ObjectTracker::default();
    let tracked = tracker.update(enriched, frame.width, Instant::now());
    assert_eq!(tracked.len(), 2);
    assert_eq!(tracked[0].class_name(), "person");
    assert_eq!(tracked[0].track_id, 1);
    assert_eq!(tracked[1].track_id, 2);
    assert!(tracked.iter().all(|t| t.movement.direction == Direction::New));
}

#[test]
fn test_walking_person_keeps_identity() {
    let mut tracker = ObjectTracker::default();
    let t0 = Instant::now();
    let mut ids = Vec::new();

    for step in 0..20u64 {
        let x = 100.0 + step as f32 * 8.0;
        let det = Detection::new("person", 0.9, BBox::new(x, 50.0, x + 80.0, 400.0))
            .with_distance(5.0 - step as f32 * 0.2);
        let tracked = tracker.update(vec![det], 640, t0 + Duration::from_millis(step * 100));
        ids.push(tracked[0].track_id);
        if step > 0 {
            assert_eq!(tracked[0].movement.approaching, Some(true));
        }
    }

    assert!(ids.iter().all(|id| *id == 1));
    assert_eq!(tracker.track_count(), 1);
}

proptest! {
    #[test]
    fn prop_movement_speed_non_negative(
        x0 in -1000.0f32..1000.0,
        x1 in -1000.0f32..1000.0,
        d0 in proptest::option::of(0.0f32..20.0),
        d1 in proptest::option::of(0.0f32..20.0),
    ) {
        let classifier = MovementClassifier::default();
        let now = Instant::now();
        let prev = MotionSample { center: (x0, 0.0), distance_m: d0, time: now };
        let cur = MotionSample { center: (x1, 0.0), distance_m: d1, time: now };
        let movement = classifier.classify(&prev, &cur);

        prop_assert!(movement.speed >= 0.0);
        if movement.approaching.is_none() {
            prop_assert_eq!(movement.speed, 0.0);
        }
        if (x1 - x0).abs() <= 15.0 && movement.approaching.is_none() {
            prop_assert_eq!(movement.direction, Direction::Stationary);
        }
    }

    #[test]
    fn prop_small_shift_keeps_track(dx in -5.0f32..5.0, dy in -5.0f32..5.0) {
        let mut tracker = ObjectTracker::default();
        let t0 = Instant::now();
        let first = tracker.update(
            vec![Detection::new("car", 0.8, BBox::new(100.0, 100.0, 200.0, 200.0))],
            640,
            t0,
        );
        let second = tracker.update(
            vec![Detection::new("car", 0.8, BBox::new(100.0 + dx, 100.0 + dy, 200.0 + dx, 200.0 + dy))],
            640,
            t0 + Duration::from_millis(50),
        );
        prop_assert_eq!(first[0].track_id, second[0].track_id);
        prop_assert_eq!(tracker.track_count(), 1);
    }
}
