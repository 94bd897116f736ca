use std::path::Path;
use std::sync::Arc;

use crate::buffer::source::BufferSource;
use crate::compose::compositor::{CompositorOpts, FrameCompositor};
use crate::foundation::core::{Extent, FrameIndex, Scale};
use crate::foundation::error::{FramefoldError, FramefoldResult};
use crate::session::frame_loop::{FrameLoop, FrameLoopOpts};
use crate::session::trigger::TriggerKind;

/// Session configuration, loadable from JSON. Missing fields take the defaults below.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Display width in pixels.
    pub width: u32,
    /// Display height in pixels.
    pub height: u32,
    /// Super-sampling factor per axis.
    pub scale: u32,
    /// Number of frames to run.
    pub frames: u64,
    /// Frame after which the trigger fires, if any.
    pub trigger_at: Option<u64>,
    /// What the trigger does.
    pub on_trigger: TriggerKind,
    #[serde(flatten)]
    pub compositor: CompositorOpts,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            scale: 1,
            frames: 60,
            trigger_at: None,
            on_trigger: TriggerKind::Redirect,
            compositor: CompositorOpts::default(),
        }
    }
}

impl SessionConfig {
    pub fn from_json_str(s: &str) -> FramefoldResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: &Path) -> FramefoldResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            FramefoldError::Other(anyhow::anyhow!(
                "read config '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&text)
    }

    /// Check sizes, including that the super-sampled buffer is addressable.
    pub fn validate(&self) -> FramefoldResult<()> {
        self.extent()?.scaled(self.scale()?)?;
        if self.frames == 0 {
            return Err(FramefoldError::validation("frames must be >= 1"));
        }
        if let Some(0) = self.compositor.threads {
            return Err(FramefoldError::validation("threads must be >= 1 when set"));
        }
        Ok(())
    }

    pub fn extent(&self) -> FramefoldResult<Extent> {
        Extent::new(self.width, self.height)
    }

    pub fn scale(&self) -> FramefoldResult<Scale> {
        Scale::new(self.scale)
    }

    /// Allocate the buffers and compositor this config describes and wire them into a loop.
    pub fn build_loop(&self) -> FramefoldResult<FrameLoop> {
        self.validate()?;
        let (extent, scale) = (self.extent()?, self.scale()?);
        let source = Arc::new(BufferSource::new(extent, scale)?);
        let compositor = FrameCompositor::new(extent, scale, &self.compositor)?;
        FrameLoop::new(source, compositor, self.on_trigger.into_policy())
    }

    pub fn loop_opts(&self) -> FrameLoopOpts {
        FrameLoopOpts {
            frames: self.frames,
            trigger_at: self.trigger_at.map(FrameIndex),
        }
    }
}
