//! Motion intent from consecutive track samples

use crate::config::TrackerConfig;
use smartcap_core::{Direction, Lateral, Movement};
use std::collections::VecDeque;
use std::time::Instant;

/// One observation of a tracked object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    pub center: (f32, f32),
    pub distance_m: Option<f32>,
    pub time: Instant,
}

/// Classifies lateral and depth motion between two samples
#[derive(Debug, Clone)]
pub struct MovementClassifier {
    movement_threshold_px: f32,
    approach_threshold_m: f32,
}

impl MovementClassifier {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            movement_threshold_px: config.movement_threshold_px,
            approach_threshold_m: config.approach_threshold_m,
        }
    }

    /// Movement between the two most recent samples; fewer than two is stationary
    pub fn classify_history(&self, history: &VecDeque<MotionSample>) -> Movement {
        let len = history.len();
        if len < 2 {
            return Movement::stationary();
        }
        self.classify(&history[len - 2], &history[len - 1])
    }

    pub fn classify(&self, previous: &MotionSample, current: &MotionSample) -> Movement {
        let dx = current.center.0 - previous.center.0;
        let lateral = if dx.is_finite() && dx.abs() > self.movement_threshold_px {
            if dx < 0.0 {
                Some(Lateral::MovingLeft)
            } else {
                Some(Lateral::MovingRight)
            }
        } else {
            None
        };

        let mut approaching = None;
        let mut speed = 0.0;
        if let (Some(prev), Some(cur)) = (previous.distance_m, current.distance_m) {
            let delta = prev - cur;
            if delta.is_finite() {
                if delta > self.approach_threshold_m {
                    approaching = Some(true);
                    speed = delta.abs();
                } else if delta < -self.approach_threshold_m {
                    approaching = Some(false);
                    speed = delta.abs();
                }
            }
        }

        Movement {
            direction: combine(approaching, lateral),
            approaching,
            lateral,
            speed,
        }
    }
}

impl Default for MovementClassifier {
    fn default() -> Self {
        Self::new(&TrackerConfig::default())
    }
}

fn combine(approaching: Option<bool>, lateral: Option<Lateral>) -> Direction {
    match (approaching, lateral) {
        (Some(true), Some(Lateral::MovingLeft)) => Direction::ApproachingLeft,
        (Some(true), Some(Lateral::MovingRight)) => Direction::ApproachingRight,
        (Some(false), Some(Lateral::MovingLeft)) => Direction::RecedingLeft,
        (Some(false), Some(Lateral::MovingRight)) => Direction::RecedingRight,
        (Some(true), None) => Direction::Approaching,
        (Some(false), None) => Direction::Receding,
        (None, Some(Lateral::MovingLeft)) => Direction::MovingLeft,
        (None, Some(Lateral::MovingRight)) => Direction::MovingRight,
        (None, None) => Direction::Stationary,
    }
}
