use crate::{
    buffer::render::PixelSource,
    foundation::core::{CHANNELS, Extent, Scale},
};

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// Maps a display coordinate to its `scale × scale` block in the super-sampled buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockGeometry {
    display: Extent,
    scale: u32,
    area: u64,
    row_stride: usize,
}

impl BlockGeometry {
    pub fn new(display: Extent, scale: Scale) -> Self {
        let area = scale.block_area();
        let scale = scale.get();
        Self {
            display,
            scale,
            area,
            row_stride: (display.width as usize) * (scale as usize) * CHANNELS,
        }
    }

    pub fn display(&self) -> Extent {
        self.display
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Source pixels per block (`scale²`).
    pub fn block_area(&self) -> u64 {
        self.area
    }

    /// Bytes per row of the super-sampled buffer.
    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    /// Required byte length of the super-sampled buffer.
    pub fn source_byte_len(&self) -> usize {
        self.row_stride * (self.display.height as usize) * (self.scale as usize)
    }

    pub fn block_index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.display.width as usize) + (x as usize)
    }

    /// Byte offsets of the block's source pixels, row-major within the block.
    pub fn pixel_offsets(&self, x: u32, y: u32) -> impl Iterator<Item = usize> + '_ {
        let s = self.scale as usize;
        let (x, y) = (x as usize, y as usize);
        (0..s).flat_map(move |ys| {
            let row_start = (y * s + ys) * self.row_stride + x * s * CHANNELS;
            (0..s).map(move |xs| row_start + xs * CHANNELS)
        })
    }
}

/// FNV-1a (64-bit) fingerprint of one block of source pixels.
///
/// Not collision resistant. A collision means a changed block is skipped for a frame, which the
/// compositor accepts.
#[derive(Clone, Copy, Debug)]
pub struct BlockHasher {
    geometry: BlockGeometry,
}

impl BlockHasher {
    pub fn new(geometry: BlockGeometry) -> Self {
        Self { geometry }
    }

    pub fn hash<S: PixelSource + ?Sized>(&self, src: &S, x: u32, y: u32) -> u64 {
        let mut h = Fnv1a64::new();
        for offset in self.geometry.pixel_offsets(x, y) {
            h.write_bytes(&src.pixel(offset));
        }
        h.finish()
    }
}

#[derive(Clone, Copy)]
struct Fnv1a64(u64);

impl Fnv1a64 {
    fn new() -> Self {
        Self(FNV_OFFSET_BASIS)
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= b as u64;
            h = h.wrapping_mul(FNV_PRIME);
        }
        self.0 = h;
    }

    fn finish(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(w: u32, h: u32, scale: u32) -> BlockGeometry {
        BlockGeometry::new(Extent::new(w, h).unwrap(), Scale::new(scale).unwrap())
    }

    fn patterned(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 37 % 251) as u8).collect()
    }

    #[test]
    fn constants_are_standard_fnv1a_64() {
        assert_eq!(FNV_OFFSET_BASIS, 14695981039346656037);
        assert_eq!(FNV_PRIME, 1099511628211);
    }

    #[test]
    fn known_vector_for_single_pixel() {
        // FNV-1a 64 of the bytes "abcd".
        let g = geometry(1, 1, 1);
        let src = b"abcd".to_vec();
        assert_eq!(BlockHasher::new(g).hash(&src, 0, 0), 0xfc179f83ee0724dd);
    }

    #[test]
    fn offsets_walk_block_row_major() {
        let g = geometry(2, 2, 2);
        let offs: Vec<usize> = g.pixel_offsets(1, 1).collect();
        // row stride = 2 * 2 * 4 = 16 bytes; block (1,1) starts at row 2, column 2.
        assert_eq!(offs, vec![40, 44, 56, 60]);
        assert_eq!(g.source_byte_len(), 64);
        assert_eq!(g.block_area(), 4);
    }

    #[test]
    fn hash_is_deterministic() {
        let g = geometry(3, 2, 2);
        let src = patterned(g.source_byte_len());
        let hasher = BlockHasher::new(g);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(hasher.hash(&src, x, y), hasher.hash(&src, x, y));
            }
        }
    }

    #[test]
    fn single_bit_flip_in_any_channel_changes_hash() {
        let g = geometry(2, 2, 2);
        let src = patterned(g.source_byte_len());
        let hasher = BlockHasher::new(g);
        let base = hasher.hash(&src, 1, 0);
        for offset in g.pixel_offsets(1, 0).collect::<Vec<_>>() {
            for channel in 0..CHANNELS {
                for bit in 0..8 {
                    let mut flipped = src.clone();
                    flipped[offset + channel] ^= 1 << bit;
                    assert_ne!(hasher.hash(&flipped, 1, 0), base);
                }
            }
        }
    }

    #[test]
    fn bytes_outside_block_do_not_affect_hash() {
        let g = geometry(2, 1, 2);
        let src = patterned(g.source_byte_len());
        let hasher = BlockHasher::new(g);
        let base = hasher.hash(&src, 0, 0);
        let mut other = src.clone();
        for offset in g.pixel_offsets(1, 0).collect::<Vec<_>>() {
            other[offset] ^= 0xff;
        }
        assert_eq!(hasher.hash(&other, 0, 0), base);
    }
}
