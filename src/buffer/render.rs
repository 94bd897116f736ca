use std::sync::atomic::{AtomicU8, Ordering};

use crate::foundation::core::{CHANNELS, Extent};

/// Read access to tightly packed RGBA8 bytes.
///
/// Hashing and downsampling only need to fetch whole pixels by byte offset, so they are written
/// against this trait and run on both the shared [`RenderBuffer`] and plain slices.
pub trait PixelSource {
    /// Total length in bytes.
    fn byte_len(&self) -> usize;

    /// The 4 channel bytes starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics when `offset + 4` exceeds [`PixelSource::byte_len`].
    fn pixel(&self, offset: usize) -> [u8; 4];
}

impl PixelSource for [u8] {
    fn byte_len(&self) -> usize {
        self.len()
    }

    fn pixel(&self, offset: usize) -> [u8; 4] {
        let px = &self[offset..offset + CHANNELS];
        [px[0], px[1], px[2], px[3]]
    }
}

impl PixelSource for Vec<u8> {
    fn byte_len(&self) -> usize {
        self.len()
    }

    fn pixel(&self, offset: usize) -> [u8; 4] {
        self.as_slice().pixel(offset)
    }
}

/// Super-sampled RGBA8 buffer shared between one producer and the compositor.
///
/// There is no lock. Every byte is an [`AtomicU8`] accessed with relaxed ordering, so single bytes
/// never tear, but a reader can see a pixel or a block half-way through a producer write. The
/// compositor tolerates that: a torn block either hashes differently (and gets recomputed) or
/// collides (and gets fixed on a later frame once the producer is done with it).
pub struct RenderBuffer {
    extent: Extent,
    bytes: Box<[AtomicU8]>,
}

impl RenderBuffer {
    /// Allocate a zeroed buffer of `extent` pixels (the super-sampled size).
    pub fn new(extent: Extent) -> Self {
        let bytes = (0..extent.byte_len()).map(|_| AtomicU8::new(0)).collect();
        Self { extent, bytes }
    }

    /// Build a buffer from existing bytes.
    ///
    /// Returns `None` when `bytes.len()` does not match `extent`.
    pub fn from_bytes(extent: Extent, bytes: &[u8]) -> Option<Self> {
        if bytes.len() != extent.byte_len() {
            return None;
        }
        let bytes = bytes.iter().map(|&b| AtomicU8::new(b)).collect();
        Some(Self { extent, bytes })
    }

    /// Size in source pixels.
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Bytes per row.
    pub fn row_stride(&self) -> usize {
        (self.extent.width as usize) * CHANNELS
    }

    pub fn load(&self, offset: usize) -> u8 {
        self.bytes[offset].load(Ordering::Relaxed)
    }

    pub fn store(&self, offset: usize, value: u8) {
        self.bytes[offset].store(value, Ordering::Relaxed);
    }

    /// Write one pixel at source coordinate `(x, y)`.
    pub fn store_pixel(&self, x: u32, y: u32, rgba: [u8; 4]) {
        let offset = (y as usize) * self.row_stride() + (x as usize) * CHANNELS;
        for (c, v) in rgba.into_iter().enumerate() {
            self.store(offset + c, v);
        }
    }

    /// Overwrite every pixel with `rgba`.
    pub fn fill(&self, rgba: [u8; 4]) {
        for (i, b) in self.bytes.iter().enumerate() {
            b.store(rgba[i % CHANNELS], Ordering::Relaxed);
        }
    }

    /// Copy the current contents out. Like every read, this is not a consistent snapshot while a
    /// producer is writing.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.iter().map(|b| b.load(Ordering::Relaxed)).collect()
    }
}

impl PixelSource for RenderBuffer {
    fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    fn pixel(&self, offset: usize) -> [u8; 4] {
        [
            self.load(offset),
            self.load(offset + 1),
            self.load(offset + 2),
            self.load(offset + 3),
        ]
    }
}

impl std::fmt::Debug for RenderBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderBuffer")
            .field("extent", &self.extent)
            .finish_non_exhaustive()
    }
}
