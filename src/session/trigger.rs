use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    buffer::source::{BufferSource, Slot},
    compose::compositor::FrameCompositor,
};

/// Edge-triggered external signal (a key press, a timer, another thread).
///
/// Cloning shares the same flag. `fire` may be called from any thread; the frame loop consumes it
/// with `take` once per frame, so several fires between two frames count as one.
#[derive(Clone, Debug, Default)]
pub struct TriggerSignal(Arc<AtomicBool>);

impl TriggerSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_pending(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Clear the flag and report whether it was set.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

/// What the frame loop should do after a trigger was handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop,
}

/// State a [`TriggerPolicy`] may act on.
pub struct TriggerContext<'a> {
    pub source: &'a BufferSource,
    pub compositor: &'a mut FrameCompositor,
}

/// Reaction to a fired [`TriggerSignal`].
pub trait TriggerPolicy: Send {
    fn on_trigger(&mut self, ctx: TriggerContext<'_>) -> LoopControl;
}

/// Point the compositor at the swap buffer. Firing again is a no-op.
#[derive(Clone, Copy, Debug, Default)]
pub struct RedirectPolicy;

impl TriggerPolicy for RedirectPolicy {
    fn on_trigger(&mut self, ctx: TriggerContext<'_>) -> LoopControl {
        ctx.source.redirect(Slot::Swap);
        tracing::info!("trigger: redirected to swap buffer");
        LoopControl::Continue
    }
}

/// Flip between the primary and swap buffers on every trigger.
#[derive(Clone, Copy, Debug, Default)]
pub struct TogglePolicy;

impl TriggerPolicy for TogglePolicy {
    fn on_trigger(&mut self, ctx: TriggerContext<'_>) -> LoopControl {
        let slot = ctx.source.toggle();
        tracing::info!(?slot, "trigger: toggled buffer");
        LoopControl::Continue
    }
}

/// Drop all fingerprints so the next pass recomputes every block.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResetPolicy;

impl TriggerPolicy for ResetPolicy {
    fn on_trigger(&mut self, ctx: TriggerContext<'_>) -> LoopControl {
        ctx.compositor.invalidate();
        tracing::info!("trigger: fingerprints reset");
        LoopControl::Continue
    }
}

/// End the frame loop.
#[derive(Clone, Copy, Debug, Default)]
pub struct StopPolicy;

impl TriggerPolicy for StopPolicy {
    fn on_trigger(&mut self, _ctx: TriggerContext<'_>) -> LoopControl {
        tracing::info!("trigger: stopping");
        LoopControl::Stop
    }
}

/// Built-in policies, selectable from config and the command line.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    #[default]
    Redirect,
    Toggle,
    Reset,
    Stop,
}

impl TriggerKind {
    pub fn into_policy(self) -> Box<dyn TriggerPolicy> {
        match self {
            Self::Redirect => Box::new(RedirectPolicy),
            Self::Toggle => Box::new(TogglePolicy),
            Self::Reset => Box::new(ResetPolicy),
            Self::Stop => Box::new(StopPolicy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        compose::compositor::CompositorOpts,
        foundation::core::{Extent, Scale},
    };

    fn setup() -> (BufferSource, FrameCompositor) {
        let e = Extent::new(2, 2).unwrap();
        let s = Scale::ONE;
        (
            BufferSource::new(e, s).unwrap(),
            FrameCompositor::new(e, s, &CompositorOpts::default()).unwrap(),
        )
    }

    #[test]
    fn signal_take_clears() {
        let sig = TriggerSignal::new();
        let other = sig.clone();
        assert!(!sig.take());
        other.fire();
        other.fire();
        assert!(sig.is_pending());
        assert!(sig.take());
        assert!(!sig.take());
    }

    #[test]
    fn redirect_is_idempotent() {
        let (source, mut comp) = setup();
        let mut p = RedirectPolicy;
        for _ in 0..2 {
            let ctl = p.on_trigger(TriggerContext {
                source: &source,
                compositor: &mut comp,
            });
            assert_eq!(ctl, LoopControl::Continue);
            assert_eq!(source.active_slot(), Slot::Swap);
        }
    }

    #[test]
    fn toggle_flips_back() {
        let (source, mut comp) = setup();
        let mut p = TogglePolicy;
        p.on_trigger(TriggerContext {
            source: &source,
            compositor: &mut comp,
        });
        p.on_trigger(TriggerContext {
            source: &source,
            compositor: &mut comp,
        });
        assert_eq!(source.active_slot(), Slot::Primary);
    }

    #[test]
    fn stop_policy_stops() {
        let (source, mut comp) = setup();
        let ctl = TriggerKind::Stop.into_policy().on_trigger(TriggerContext {
            source: &source,
            compositor: &mut comp,
        });
        assert_eq!(ctl, LoopControl::Stop);
    }

    #[test]
    fn kind_parses_from_json() {
        let k: TriggerKind = serde_json::from_str("\"reset\"").unwrap();
        assert_eq!(k, TriggerKind::Reset);
        assert_eq!(TriggerKind::default(), TriggerKind::Redirect);
    }
}
