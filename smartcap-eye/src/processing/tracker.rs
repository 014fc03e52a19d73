//! Multi-object tracking

use crate::config::TrackerConfig;
use crate::processing::movement::{MotionSample, MovementClassifier};
use smartcap_core::{BBox, Detection, Movement, Position, TrackedDetection};
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::time::Instant;
use tracing::debug;

/// Object identity kept across frames
#[derive(Debug, Clone)]
pub struct Track {
    pub id: u64,
    pub class_name: String,
    pub bbox: BBox,
    pub last_seen: Instant,
    pub history: VecDeque<MotionSample>,
}

/// Greedy IoU tracker.
///
/// Tracks are keyed by id in ascending order so equal-IoU candidates resolve
/// to the oldest track.
pub struct ObjectTracker {
    config: TrackerConfig,
    classifier: MovementClassifier,
    tracks: BTreeMap<u64, Track>,
    next_id: u64,
}

impl ObjectTracker {
    /// Create a new object tracker
    pub fn new(config: TrackerConfig) -> Self {
        let classifier = MovementClassifier::new(&config);
        Self {
            config,
            classifier,
            tracks: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Update tracker with the detections of one frame.
    ///
    /// Returns one tracked detection per input, in input order. When
    /// `frame_width` is non-zero the horizontal position bucket is refreshed
    /// from the bbox center.
    pub fn update(
        &mut self,
        detections: Vec<Detection>,
        frame_width: u32,
        now: Instant,
    ) -> Vec<TrackedDetection> {
        self.expire(now);

        let mut matched: HashSet<u64> = HashSet::with_capacity(detections.len());
        let mut output = Vec::with_capacity(detections.len());

        for mut detection in detections {
            let center = detection.bbox.center();
            if frame_width > 0 && center.0.is_finite() {
                detection.position = Position::from_relative_x(center.0 / frame_width as f32);
            }

            let sample = MotionSample {
                center,
                distance_m: detection.distance_m.filter(|d| d.is_finite()),
                time: now,
            };

            let (track_id, movement) = match self.best_match(&detection, &matched) {
                Some(track_id) => {
                    let movement = self.continue_track(track_id, &detection, sample);
                    (track_id, movement)
                }
                None => (self.start_track(&detection, sample), Movement::new_track()),
            };
            matched.insert(track_id);

            output.push(TrackedDetection {
                detection,
                track_id,
                movement,
            });
        }

        debug!("Tracking {} objects", self.tracks.len());
        output
    }

    /// Number of live tracks
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Snapshot of all live tracks
    pub fn tracks(&self) -> Vec<Track> {
        self.tracks.values().cloned().collect()
    }

    /// Drop every track. Ids are not reused afterwards.
    pub fn reset(&mut self) {
        self.tracks.clear();
    }

    fn expire(&mut self, now: Instant) {
        let timeout = self.config.track_timeout();
        let before = self.tracks.len();
        self.tracks
            .retain(|_, track| now.saturating_duration_since(track.last_seen) <= timeout);
        let expired = before - self.tracks.len();
        if expired > 0 {
            debug!("Expired {} stale tracks", expired);
        }
    }

    fn best_match(&self, detection: &Detection, matched: &HashSet<u64>) -> Option<u64> {
        let mut best: Option<(u64, f32)> = None;

        for (track_id, track) in &self.tracks {
            if matched.contains(track_id) || track.class_name != detection.class_name {
                continue;
            }

            let iou = detection.bbox.iou(&track.bbox);
            if iou > self.config.iou_threshold {
                match best {
                    Some((_, best_iou)) if iou <= best_iou => {}
                    _ => best = Some((*track_id, iou)),
                }
            }
        }

        best.map(|(track_id, _)| track_id)
    }

    fn continue_track(&mut self, track_id: u64, detection: &Detection, sample: MotionSample) -> Movement {
        let max_history = self.config.max_history;
        match self.tracks.get_mut(&track_id) {
            Some(track) => {
                track.bbox = detection.bbox;
                track.last_seen = sample.time;
                track.history.push_back(sample);
                while track.history.len() > max_history {
                    track.history.pop_front();
                }
                self.classifier.classify_history(&track.history)
            }
            None => Movement::stationary(),
        }
    }

    fn start_track(&mut self, detection: &Detection, sample: MotionSample) -> u64 {
        if self.tracks.len() >= self.config.max_tracks {
            self.evict_least_recent();
        }

        let track_id = self.next_id;
        self.next_id += 1;

        let mut history = VecDeque::with_capacity(self.config.max_history);
        history.push_back(sample);

        self.tracks.insert(
            track_id,
            Track {
                id: track_id,
                class_name: detection.class_name.clone(),
                bbox: detection.bbox,
                last_seen: sample.time,
                history,
            },
        );
        track_id
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .tracks
            .values()
            .min_by_key(|track| (track.last_seen, track.id))
            .map(|track| track.id);
        if let Some(track_id) = oldest {
            debug!("Track limit reached, evicting track {}", track_id);
            self.tracks.remove(&track_id);
        }
    }
}

impl Default for ObjectTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}
