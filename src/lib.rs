//! Framefold turns a super-sampled render buffer into a display buffer, one frame at a time,
//! skipping every block whose content did not change.
//!
//! - A producer writes into a [`RenderBuffer`] held by a [`BufferSource`], without locks
//! - A [`FrameCompositor`] fingerprints each `scale × scale` block, compares against the previous
//!   frame, and box-filters only the blocks that moved into its [`DisplayBuffer`]
//! - A [`FrameLoop`] drives compose → present → trigger once per frame
#![forbid(unsafe_code)]

mod foundation;

pub mod buffer;
pub mod compose;
pub mod config;
pub mod present;
pub mod produce;
pub mod session;

pub use crate::foundation::core::{CHANNELS, Extent, FrameIndex, Scale};
pub use crate::foundation::error::{FramefoldError, FramefoldResult};

pub use crate::buffer::display::DisplayBuffer;
pub use crate::buffer::render::{PixelSource, RenderBuffer};
pub use crate::buffer::source::{BufferSource, Slot};
pub use crate::compose::compositor::{CompositorOpts, FrameCompositor, PassStats};
pub use crate::compose::detect::{BlockChange, ChangeDetector};
pub use crate::compose::downsample::BlockDownsampler;
pub use crate::compose::hash::{BlockGeometry, BlockHasher};
pub use crate::config::SessionConfig;
pub use crate::present::png::PngSink;
pub use crate::present::sink::{InMemorySink, NullSink, PresentSink, SinkConfig};
pub use crate::produce::gradient::{Gradient, fill_gradient, spawn_gradient_producer};
pub use crate::session::frame_loop::{FrameLoop, FrameLoopOpts, LoopStats, TickOutcome};
pub use crate::session::trigger::{
    LoopControl, RedirectPolicy, ResetPolicy, StopPolicy, TogglePolicy, TriggerContext,
    TriggerKind, TriggerPolicy, TriggerSignal,
};
