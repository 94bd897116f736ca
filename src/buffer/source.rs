use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use crate::{
    buffer::render::RenderBuffer,
    foundation::{
        core::{Extent, Scale},
        error::{FramefoldError, FramefoldResult},
    },
};

/// One of the two render buffers a [`BufferSource`] can point the compositor at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The buffer the compositor reads at startup.
    Primary,
    /// The alternate buffer a trigger can redirect to.
    Swap,
}

impl Slot {
    fn index(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Swap => 1,
        }
    }

    fn from_index(i: usize) -> Self {
        if i == 0 { Self::Primary } else { Self::Swap }
    }

    /// The other slot.
    pub fn other(self) -> Self {
        match self {
            Self::Primary => Self::Swap,
            Self::Swap => Self::Primary,
        }
    }
}

/// Producer-side pair of render buffers plus the index of the one the compositor reads.
///
/// Redirecting is a single atomic store. It is not coordinated with producer writes or with a
/// pass already in flight: the compositor resolves [`BufferSource::current`] once at the start of
/// each pass, so a redirect becomes visible at the next frame boundary.
#[derive(Debug)]
pub struct BufferSource {
    display: Extent,
    scale: Scale,
    slots: [Arc<RenderBuffer>; 2],
    active: AtomicUsize,
}

impl BufferSource {
    /// Allocate both slots, zeroed, sized for a `display` extent at `scale`.
    pub fn new(display: Extent, scale: Scale) -> FramefoldResult<Self> {
        let hi_res = display.scaled(scale)?;
        Ok(Self {
            display,
            scale,
            slots: [
                Arc::new(RenderBuffer::new(hi_res)),
                Arc::new(RenderBuffer::new(hi_res)),
            ],
            active: AtomicUsize::new(Slot::Primary.index()),
        })
    }

    /// Wrap two existing buffers. Both must have the super-sampled size of `display` at `scale`.
    pub fn from_buffers(
        display: Extent,
        scale: Scale,
        primary: Arc<RenderBuffer>,
        swap: Arc<RenderBuffer>,
    ) -> FramefoldResult<Self> {
        let hi_res = display.scaled(scale)?;
        for (name, buf) in [("primary", &primary), ("swap", &swap)] {
            if buf.extent() != hi_res {
                return Err(FramefoldError::validation(format!(
                    "{name} render buffer is {}x{}, expected {}x{}",
                    buf.extent().width,
                    buf.extent().height,
                    hi_res.width,
                    hi_res.height
                )));
            }
        }
        Ok(Self {
            display,
            scale,
            slots: [primary, swap],
            active: AtomicUsize::new(Slot::Primary.index()),
        })
    }

    pub fn display_extent(&self) -> Extent {
        self.display
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// The buffer in `slot`, for a producer to write into.
    pub fn buffer(&self, slot: Slot) -> &Arc<RenderBuffer> {
        &self.slots[slot.index()]
    }

    pub fn active_slot(&self) -> Slot {
        Slot::from_index(self.active.load(Ordering::Acquire))
    }

    /// Handle to the buffer the compositor should read from now.
    pub fn current(&self) -> Arc<RenderBuffer> {
        Arc::clone(&self.slots[self.active.load(Ordering::Acquire)])
    }

    /// Point the compositor at `slot` from its next pass on.
    pub fn redirect(&self, slot: Slot) {
        self.active.store(slot.index(), Ordering::Release);
    }

    /// Flip to the other slot and return the newly active one.
    pub fn toggle(&self) -> Slot {
        let prev = self.active.fetch_xor(1, Ordering::AcqRel);
        Slot::from_index(prev ^ 1)
    }
}
