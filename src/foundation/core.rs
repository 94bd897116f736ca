use std::num::NonZeroU32;

use crate::foundation::error::{FramefoldError, FramefoldResult};

/// Bytes per RGBA8 pixel.
pub const CHANNELS: usize = 4;

/// Absolute 0-based index of a presented frame.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    /// The frame after this one.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Display-resolution size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Extent {
    /// Width in display pixels.
    pub width: u32,
    /// Height in display pixels.
    pub height: u32,
}

impl Extent {
    /// Create a validated extent with both sides >= 1.
    pub fn new(width: u32, height: u32) -> FramefoldResult<Self> {
        if width == 0 || height == 0 {
            return Err(FramefoldError::validation(format!(
                "extent must be non-empty, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Number of display pixels, which is also the number of blocks.
    pub fn pixel_count(self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Byte length of an RGBA8 buffer of this extent.
    pub fn byte_len(self) -> usize {
        self.pixel_count() * CHANNELS
    }

    /// Extent of the super-sampled buffer feeding this display extent.
    ///
    /// Fails when the scaled size does not fit in `u32` or in addressable memory.
    pub fn scaled(self, scale: Scale) -> FramefoldResult<Self> {
        let s = scale.get();
        let width = self.width.checked_mul(s);
        let height = self.height.checked_mul(s);
        let (Some(width), Some(height)) = (width, height) else {
            return Err(FramefoldError::validation(format!(
                "scaled extent overflows: {}x{} at scale {s}",
                self.width, self.height
            )));
        };
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(CHANNELS))
            .ok_or_else(|| FramefoldError::validation("render buffer size overflow"))?;
        Ok(Self { width, height })
    }
}

/// Per-axis super-sampling factor: `scale × scale` source pixels fold into one display pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Scale(NonZeroU32);

impl Scale {
    /// The identity scale.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a validated scale (>= 1).
    pub fn new(scale: u32) -> FramefoldResult<Self> {
        NonZeroU32::new(scale)
            .map(Self)
            .ok_or_else(|| FramefoldError::validation("scale must be >= 1"))
    }

    /// The factor as a plain integer.
    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Source pixels per block (`scale²`).
    pub fn block_area(self) -> u64 {
        u64::from(self.get()) * u64::from(self.get())
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::ONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_rejects_zero_sides() {
        assert!(Extent::new(0, 4).is_err());
        assert!(Extent::new(4, 0).is_err());
        assert_eq!(Extent::new(3, 2).unwrap().byte_len(), 24);
    }

    #[test]
    fn scale_rejects_zero() {
        assert!(Scale::new(0).is_err());
        assert_eq!(Scale::new(3).unwrap().block_area(), 9);
        assert_eq!(Scale::default(), Scale::ONE);
    }

    #[test]
    fn block_area_does_not_overflow_for_large_scales() {
        let s = Scale::new(65536).unwrap();
        assert!(Extent::new(1, 1).unwrap().scaled(s).is_ok());
        assert_eq!(s.block_area(), 1 << 32);
    }

    #[test]
    fn scaled_extent_multiplies_both_axes() {
        let e = Extent::new(5, 3).unwrap().scaled(Scale::new(4).unwrap()).unwrap();
        assert_eq!((e.width, e.height), (20, 12));
    }

    #[test]
    fn scaled_extent_detects_overflow() {
        let e = Extent::new(u32::MAX, 1).unwrap();
        assert!(e.scaled(Scale::new(2).unwrap()).is_err());
    }
}
