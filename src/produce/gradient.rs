use std::{sync::Arc, thread::JoinHandle};

use crate::{
    buffer::{
        render::RenderBuffer,
        source::{BufferSource, Slot},
    },
    foundation::core::Extent,
};

/// Test-card gradients used to stand in for a real renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Gradient {
    /// Red ramps left to right, green top to bottom.
    Warm,
    /// Same ramps with red moved into blue.
    Cool,
}

impl Gradient {
    /// Colour at source pixel `(x, y)` of a buffer of `extent` pixels.
    pub fn pixel_at(self, x: u32, y: u32, extent: Extent) -> [u8; 4] {
        let ramp = |v: u32, len: u32| (255 * u64::from(v) / u64::from(len)) as u8;
        let h = ramp(x, extent.width);
        let v = ramp(y, extent.height);
        match self {
            Self::Warm => [h, v, 0, 255],
            Self::Cool => [0, v, h, 255],
        }
    }
}

/// Paint `gradient` into `target`, top row first.
pub fn fill_gradient(target: &RenderBuffer, gradient: Gradient) {
    let extent = target.extent();
    for y in 0..extent.height {
        for x in 0..extent.width {
            target.store_pixel(x, y, gradient.pixel_at(x, y, extent));
        }
    }
}

/// Start a background thread that paints [`Gradient::Warm`] into the primary slot and
/// [`Gradient::Cool`] into the swap slot, row by row, then exits.
///
/// Nothing waits on it. The compositor picks up rows as they land.
pub fn spawn_gradient_producer(source: &BufferSource) -> std::io::Result<JoinHandle<()>> {
    let primary = Arc::clone(source.buffer(Slot::Primary));
    let swap = Arc::clone(source.buffer(Slot::Swap));
    std::thread::Builder::new()
        .name("framefold-producer".to_string())
        .spawn(move || {
            let extent = primary.extent();
            for y in 0..extent.height {
                for x in 0..extent.width {
                    primary.store_pixel(x, y, Gradient::Warm.pixel_at(x, y, extent));
                    swap.store_pixel(x, y, Gradient::Cool.pixel_at(x, y, extent));
                }
            }
            tracing::debug!(
                width = extent.width,
                height = extent.height,
                "gradient producer finished"
            );
        })
}
