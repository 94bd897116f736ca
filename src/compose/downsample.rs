use crate::{
    buffer::{display::DisplayBuffer, render::PixelSource},
    compose::hash::BlockGeometry,
    foundation::core::CHANNELS,
};

/// Box filter: one display pixel is the per-channel floor mean of its `scale²` source pixels.
///
/// Channels are averaged as stored; there is no gamma handling.
#[derive(Clone, Copy, Debug)]
pub struct BlockDownsampler {
    geometry: BlockGeometry,
    area: u64,
}

impl BlockDownsampler {
    pub fn new(geometry: BlockGeometry) -> Self {
        Self {
            geometry,
            area: geometry.block_area(),
        }
    }

    pub fn downsample<S: PixelSource + ?Sized>(&self, src: &S, x: u32, y: u32) -> [u8; 4] {
        if self.area == 1 {
            return src.pixel(self.geometry.pixel_offsets(x, y).next().unwrap_or(0));
        }

        let mut sums = [0u64; CHANNELS];
        for offset in self.geometry.pixel_offsets(x, y) {
            let px = src.pixel(offset);
            for c in 0..CHANNELS {
                sums[c] += u64::from(px[c]);
            }
        }
        sums.map(|s| (s / self.area) as u8)
    }

    /// Downsample block `(x, y)` straight into its slot in `dst`.
    pub fn write_into<S: PixelSource + ?Sized>(
        &self,
        src: &S,
        x: u32,
        y: u32,
        dst: &mut DisplayBuffer,
    ) {
        let rgba = self.downsample(src, x, y);
        dst.write_block(self.geometry.block_index(x, y), rgba);
    }
}
