//! Bounded frame ring buffer between ingestion and processing

use crate::source::FrameInput;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

/// Fixed-capacity FIFO; pushing into a full buffer evicts the oldest frame
pub struct FrameBuffer {
    frames: Mutex<VecDeque<FrameInput>>,
    capacity: usize,
    dropped: AtomicU64,
}

impl FrameBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            frames: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            dropped: AtomicU64::new(0),
        }
    }

    /// Append a frame, returning the evicted one if the buffer was full
    pub fn push(&self, input: FrameInput) -> Option<FrameInput> {
        let mut frames = self.frames.lock();
        let evicted = if frames.len() >= self.capacity {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            frames.pop_front()
        } else {
            None
        };
        frames.push_back(input);
        evicted
    }

    /// Take the oldest frame
    pub fn pop(&self) -> Option<FrameInput> {
        self.frames.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.frames.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Frames evicted so far
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        self.frames.lock().clear();
    }
}
