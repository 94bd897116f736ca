use crate::buffer::display::DisplayBuffer;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{FramefoldError, FramefoldResult};

/// Configuration handed to a [`PresentSink`] before the first frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// Display width in pixels.
    pub width: u32,
    /// Display height in pixels.
    pub height: u32,
}

/// Presentation side of the frame loop.
///
/// Ordering contract: `present` is called once per composed frame, in strictly increasing
/// `FrameIndex` order, after the pass for that frame has finished writing the display buffer.
pub trait PresentSink {
    /// Called once before any frames are presented.
    fn begin(&mut self, cfg: SinkConfig) -> FramefoldResult<()>;
    /// Consume one composed frame.
    fn present(&mut self, idx: FrameIndex, frame: &DisplayBuffer) -> FramefoldResult<()>;
    /// Called once after the last frame.
    fn end(&mut self) -> FramefoldResult<()>;
}

/// Sink that discards frames.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl PresentSink for NullSink {
    fn begin(&mut self, _cfg: SinkConfig) -> FramefoldResult<()> {
        Ok(())
    }

    fn present(&mut self, _idx: FrameIndex, _frame: &DisplayBuffer) -> FramefoldResult<()> {
        Ok(())
    }

    fn end(&mut self) -> FramefoldResult<()> {
        Ok(())
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, DisplayBuffer)>,
    ended: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Presented frames in order.
    pub fn frames(&self) -> &[(FrameIndex, DisplayBuffer)] {
        &self.frames
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl PresentSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> FramefoldResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn present(&mut self, idx: FrameIndex, frame: &DisplayBuffer) -> FramefoldResult<()> {
        if let Some((last, _)) = self.frames.last()
            && idx <= *last
        {
            return Err(FramefoldError::present(
                "in-memory sink received out-of-order frame index",
            ));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> FramefoldResult<()> {
        self.ended = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::Extent;

    #[test]
    fn in_memory_sink_keeps_frames_in_order() {
        let mut sink = InMemorySink::new();
        sink.begin(SinkConfig {
            width: 1,
            height: 1,
        })
        .unwrap();
        let frame = DisplayBuffer::new(Extent::new(1, 1).unwrap());
        sink.present(FrameIndex(0), &frame).unwrap();
        sink.present(FrameIndex(1), &frame).unwrap();
        assert!(sink.present(FrameIndex(1), &frame).is_err());
        sink.end().unwrap();

        assert_eq!(sink.frames().len(), 2);
        assert_eq!(sink.config().map(|c| c.width), Some(1));
        assert!(sink.is_ended());
    }
}
