use rayon::prelude::*;

use crate::{
    buffer::{display::DisplayBuffer, render::PixelSource, source::BufferSource},
    compose::{
        detect::{BlockChange, ChangeDetector, observe_slot},
        downsample::BlockDownsampler,
        hash::{BlockGeometry, BlockHasher},
    },
    foundation::{
        core::{CHANNELS, Extent, FrameIndex, Scale},
        error::{FramefoldError, FramefoldResult},
    },
};

/// How a [`FrameCompositor`] schedules its per-block work.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CompositorOpts {
    /// Process display rows on a rayon pool instead of the calling thread.
    #[serde(default)]
    pub parallel: bool,
    /// Pool size when `parallel` is set. `None` lets rayon decide.
    #[serde(default)]
    pub threads: Option<usize>,
}

/// Block counts for one composition pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassStats {
    pub blocks_total: u64,
    pub blocks_recomputed: u64,
    pub blocks_skipped: u64,
}

impl PassStats {
    fn merge(self, other: Self) -> Self {
        Self {
            blocks_total: self.blocks_total + other.blocks_total,
            blocks_recomputed: self.blocks_recomputed + other.blocks_recomputed,
            blocks_skipped: self.blocks_skipped + other.blocks_skipped,
        }
    }

    fn record(&mut self, change: BlockChange) {
        self.blocks_total += 1;
        match change {
            BlockChange::Changed => self.blocks_recomputed += 1,
            BlockChange::Unchanged => self.blocks_skipped += 1,
        }
    }
}

/// Turns the super-sampled render buffer into the display buffer, one pass per frame.
///
/// Every display coordinate is visited exactly once per pass. A block is fingerprinted, compared
/// against the previous pass, and only downsampled when its fingerprint moved. Unchanged blocks
/// keep whatever the display buffer already holds.
///
/// The display buffer and both fingerprint tables are owned here and live as long as the
/// compositor.
pub struct FrameCompositor {
    geometry: BlockGeometry,
    hasher: BlockHasher,
    downsampler: BlockDownsampler,
    detector: ChangeDetector,
    display: DisplayBuffer,
    pool: Option<rayon::ThreadPool>,
    frame: FrameIndex,
}

impl FrameCompositor {
    pub fn new(display: Extent, scale: Scale, opts: &CompositorOpts) -> FramefoldResult<Self> {
        // Reject sizes whose super-sampled buffer could not exist.
        display.scaled(scale)?;

        let geometry = BlockGeometry::new(display, scale);
        let pool = if opts.parallel {
            Some(build_thread_pool(opts.threads)?)
        } else {
            None
        };

        Ok(Self {
            geometry,
            hasher: BlockHasher::new(geometry),
            downsampler: BlockDownsampler::new(geometry),
            detector: ChangeDetector::new(display.pixel_count()),
            display: DisplayBuffer::new(display),
            pool,
            frame: FrameIndex(0),
        })
    }

    pub fn geometry(&self) -> BlockGeometry {
        self.geometry
    }

    pub fn display(&self) -> &DisplayBuffer {
        &self.display
    }

    pub fn detector(&self) -> &ChangeDetector {
        &self.detector
    }

    /// Number of passes run so far.
    pub fn frame(&self) -> FrameIndex {
        self.frame
    }

    /// Make the next pass recompute every block.
    pub fn invalidate(&mut self) {
        self.detector.invalidate();
    }

    /// Run one pass against whichever buffer `source` designates right now.
    ///
    /// The designated buffer is resolved once, up front; a redirect that lands during the pass
    /// takes effect on the next one.
    ///
    /// # Panics
    ///
    /// Panics if `source` was built for a different display extent or scale.
    pub fn compose(&mut self, source: &BufferSource) -> PassStats {
        assert!(
            source.display_extent() == self.geometry.display()
                && source.scale().get() == self.geometry.scale(),
            "buffer source does not match compositor geometry"
        );
        let buffer = source.current();
        self.compose_buffer(buffer.as_ref())
    }

    /// Run one pass against an explicit super-sampled buffer.
    ///
    /// # Panics
    ///
    /// Panics if `src` is not exactly `width·scale × height·scale` RGBA8 pixels.
    #[tracing::instrument(skip_all, fields(frame = self.frame.0))]
    pub fn compose_buffer<S: PixelSource + Sync + ?Sized>(&mut self, src: &S) -> PassStats {
        assert_eq!(
            src.byte_len(),
            self.geometry.source_byte_len(),
            "render buffer size does not match compositor geometry"
        );

        let stats = match self.pool.take() {
            Some(pool) => {
                let stats = pool.install(|| self.pass_rows_parallel(src));
                self.pool = Some(pool);
                stats
            }
            None => self.pass_sequential(src),
        };

        tracing::debug!(
            recomputed = stats.blocks_recomputed,
            skipped = stats.blocks_skipped,
            "composition pass"
        );
        self.frame = self.frame.next();
        stats
    }

    fn pass_sequential<S: PixelSource + ?Sized>(&mut self, src: &S) -> PassStats {
        let extent = self.geometry.display();
        let mut stats = PassStats::default();
        for y in 0..extent.height {
            for x in 0..extent.width {
                let block = self.geometry.block_index(x, y);
                let hash = self.hasher.hash(src, x, y);
                let change = self.detector.observe(block, hash);
                if change == BlockChange::Changed {
                    self.downsampler.write_into(src, x, y, &mut self.display);
                }
                stats.record(change);
            }
        }
        stats
    }

    fn pass_rows_parallel<S: PixelSource + Sync + ?Sized>(&mut self, src: &S) -> PassStats {
        let width = self.geometry.display().width as usize;
        let hasher = self.hasher;
        let downsampler = self.downsampler;
        let (previous, current) = self.detector.tables_mut();

        self.display
            .bytes_mut()
            .par_chunks_mut(width * CHANNELS)
            .zip(previous.par_chunks_mut(width))
            .zip(current.par_chunks_mut(width))
            .enumerate()
            .map(|(y, ((row, prev), cur))| {
                let y = y as u32;
                let mut stats = PassStats::default();
                for (x, (p, c)) in prev.iter_mut().zip(cur.iter_mut()).enumerate() {
                    let hash = hasher.hash(src, x as u32, y);
                    let change = observe_slot(p, c, hash);
                    if change == BlockChange::Changed {
                        let rgba = downsampler.downsample(src, x as u32, y);
                        row[x * CHANNELS..(x + 1) * CHANNELS].copy_from_slice(&rgba);
                    }
                    stats.record(change);
                }
                stats
            })
            .reduce(PassStats::default, PassStats::merge)
    }
}

impl std::fmt::Debug for FrameCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameCompositor")
            .field("geometry", &self.geometry)
            .field("parallel", &self.pool.is_some())
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

fn build_thread_pool(threads: Option<usize>) -> FramefoldResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(FramefoldError::validation(
            "compositor 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("framefold-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder.build().map_err(|e| {
        FramefoldError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}"))
    })
}
