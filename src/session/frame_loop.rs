use std::sync::Arc;

use crate::buffer::source::BufferSource;
use crate::compose::compositor::{FrameCompositor, PassStats};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{FramefoldError, FramefoldResult};
use crate::present::sink::{PresentSink, SinkConfig};
use crate::session::trigger::{LoopControl, TriggerContext, TriggerPolicy, TriggerSignal};

/// Options for [`FrameLoop::run`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameLoopOpts {
    /// Stop after this many frames.
    pub frames: u64,
    /// Fire the trigger right after this frame is presented, as if an input arrived then.
    pub trigger_at: Option<FrameIndex>,
}

/// Result of a single [`FrameLoop::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickOutcome {
    pub frame: FrameIndex,
    pub pass: PassStats,
    /// Whether a pending trigger was handled at the end of this frame.
    pub triggered: bool,
    pub control: LoopControl,
}

/// Totals for a [`FrameLoop::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub frames: u64,
    pub blocks_recomputed: u64,
    pub blocks_skipped: u64,
    pub triggers: u64,
    /// The trigger policy ended the loop before `frames` was reached.
    pub stopped_by_trigger: bool,
}

/// Per-frame driver: compose, present, then react to the trigger.
///
/// The trigger is checked after presentation, so whatever the policy changes (for example which
/// buffer is active) shows up in the following frame.
pub struct FrameLoop {
    source: Arc<BufferSource>,
    compositor: FrameCompositor,
    policy: Box<dyn TriggerPolicy>,
    trigger: TriggerSignal,
}

impl FrameLoop {
    /// Tie a source to a compositor. Their display extent and scale must agree.
    pub fn new(
        source: Arc<BufferSource>,
        compositor: FrameCompositor,
        policy: Box<dyn TriggerPolicy>,
    ) -> FramefoldResult<Self> {
        let geometry = compositor.geometry();
        if source.display_extent() != geometry.display() {
            let (a, b) = (source.display_extent(), geometry.display());
            return Err(FramefoldError::validation(format!(
                "buffer source is {}x{} but compositor is {}x{}",
                a.width, a.height, b.width, b.height
            )));
        }
        if source.scale().get() != geometry.scale() {
            return Err(FramefoldError::validation(format!(
                "buffer source scale {} does not match compositor scale {}",
                source.scale().get(),
                geometry.scale()
            )));
        }
        Ok(Self {
            source,
            compositor,
            policy,
            trigger: TriggerSignal::new(),
        })
    }

    pub fn source(&self) -> &Arc<BufferSource> {
        &self.source
    }

    pub fn compositor(&self) -> &FrameCompositor {
        &self.compositor
    }

    /// A handle other threads can use to fire the trigger.
    pub fn trigger(&self) -> TriggerSignal {
        self.trigger.clone()
    }

    /// Run one frame.
    pub fn tick(&mut self, sink: &mut dyn PresentSink) -> FramefoldResult<TickOutcome> {
        let frame = self.compositor.frame();
        let pass = self.compositor.compose(&self.source);
        sink.present(frame, self.compositor.display())?;

        let triggered = self.trigger.take();
        let control = if triggered {
            self.policy.on_trigger(TriggerContext {
                source: &self.source,
                compositor: &mut self.compositor,
            })
        } else {
            LoopControl::Continue
        };

        Ok(TickOutcome {
            frame,
            pass,
            triggered,
            control,
        })
    }

    /// Tick until `opts.frames` frames were presented or the trigger policy stops the loop.
    ///
    /// Calls `begin`/`end` on the sink around the frames.
    #[tracing::instrument(skip(self, sink))]
    pub fn run(
        &mut self,
        opts: &FrameLoopOpts,
        sink: &mut dyn PresentSink,
    ) -> FramefoldResult<LoopStats> {
        let extent = self.compositor.display().extent();
        sink.begin(SinkConfig {
            width: extent.width,
            height: extent.height,
        })?;

        let mut stats = LoopStats::default();
        for _ in 0..opts.frames {
            let frame = self.compositor.frame();
            if opts.trigger_at == Some(frame) {
                // Fired before the tick so it is handled at the end of this frame.
                self.trigger.fire();
            }

            let out = self.tick(sink)?;
            stats.frames += 1;
            stats.blocks_recomputed += out.pass.blocks_recomputed;
            stats.blocks_skipped += out.pass.blocks_skipped;
            if out.triggered {
                stats.triggers += 1;
            }
            if out.control == LoopControl::Stop {
                stats.stopped_by_trigger = true;
                break;
            }
        }

        sink.end()?;
        tracing::info!(
            frames = stats.frames,
            recomputed = stats.blocks_recomputed,
            skipped = stats.blocks_skipped,
            "frame loop finished"
        );
        Ok(stats)
    }
}

impl std::fmt::Debug for FrameLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameLoop")
            .field("source", &self.source)
            .field("compositor", &self.compositor)
            .finish_non_exhaustive()
    }
}
