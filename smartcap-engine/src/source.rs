//! Frame sources feeding the pipeline

use crate::error::EngineError;
use async_trait::async_trait;
use smartcap_core::Frame;
use tokio::sync::mpsc;

/// A frame together with the ranging reading taken alongside it
#[derive(Debug, Clone)]
pub struct FrameInput {
    pub frame: Frame,
    /// Proximity reading in millimetres; `None` when the sensor gave nothing
    pub ranging_mm: Option<i32>,
}

impl FrameInput {
    pub fn new(frame: Frame, ranging_mm: Option<i32>) -> Self {
        Self { frame, ranging_mm }
    }
}

/// Transport delivering frames to the pipeline
#[async_trait]
pub trait FrameSource: Send {
    /// Next frame, or `Ok(None)` once the stream has ended
    async fn next_frame(&mut self) -> Result<Option<FrameInput>, EngineError>;
}

/// Source backed by a channel, for transports that push frames
pub struct ChannelFrameSource {
    receiver: mpsc::Receiver<FrameInput>,
}

impl ChannelFrameSource {
    pub fn new(receiver: mpsc::Receiver<FrameInput>) -> Self {
        Self { receiver }
    }

    /// Create a source and the sender that feeds it
    pub fn channel(capacity: usize) -> (mpsc::Sender<FrameInput>, Self) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (sender, Self::new(receiver))
    }
}

#[async_trait]
impl FrameSource for ChannelFrameSource {
    async fn next_frame(&mut self) -> Result<Option<FrameInput>, EngineError> {
        Ok(self.receiver.recv().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_source_ends_when_sender_dropped() {
        let (sender, mut source) = ChannelFrameSource::channel(4);
        sender
            .send(FrameInput::new(Frame::new(7, 640, 480), Some(900)))
            .await
            .unwrap();
        drop(sender);

        let input = source.next_frame().await.unwrap().unwrap();
        assert_eq!(input.frame.id, 7);
        assert_eq!(input.ranging_mm, Some(900));
        assert!(source.next_frame().await.unwrap().is_none());
    }
}
