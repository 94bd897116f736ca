use crate::foundation::core::{CHANNELS, Extent};

/// Display-resolution RGBA8 pixels, row-major, tightly packed.
///
/// Only the compositor writes it; presentation reads [`DisplayBuffer::as_bytes`] between frames.
/// The allocation is made once and never resized, so the byte region stays put for the lifetime
/// of the compositor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayBuffer {
    extent: Extent,
    data: Vec<u8>,
}

impl DisplayBuffer {
    /// Allocate a zeroed buffer.
    pub fn new(extent: Extent) -> Self {
        Self {
            extent,
            data: vec![0; extent.byte_len()],
        }
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn width(&self) -> u32 {
        self.extent.width
    }

    pub fn height(&self) -> u32 {
        self.extent.height
    }

    /// The pixel bytes, suitable for a texture upload.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Read the pixel at display coordinate `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.offset(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    pub(crate) fn write_block(&mut self, block_index: usize, rgba: [u8; 4]) {
        let i = block_index * CHANNELS;
        self.data[i..i + CHANNELS].copy_from_slice(&rgba);
    }

    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.extent.width && y < self.extent.height,
            "display coordinate ({x}, {y}) out of range"
        );
        ((y as usize) * (self.extent.width as usize) + (x as usize)) * CHANNELS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_block_addresses_row_major_index() {
        let mut d = DisplayBuffer::new(Extent::new(3, 2).unwrap());
        d.write_block(4, [1, 2, 3, 4]);
        assert_eq!(d.pixel(1, 1), [1, 2, 3, 4]);
        assert_eq!(d.pixel(0, 0), [0, 0, 0, 0]);
        assert_eq!(d.as_bytes().len(), 24);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn pixel_out_of_range_panics() {
        let d = DisplayBuffer::new(Extent::new(2, 2).unwrap());
        let _ = d.pixel(2, 0);
    }
}
