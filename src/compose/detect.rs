/// Outcome of comparing a block's fingerprint against the previous frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockChange {
    /// Fingerprint differs; the block must be downsampled again.
    Changed,
    /// Fingerprint matches; the display pixel stays as it is.
    Unchanged,
}

/// Per-block fingerprint tables, indexed by `y * width + x`.
///
/// `current` holds the fingerprints computed during the latest pass, `previous` the ones each
/// block is compared against. After a full pass the two are equal. Both tables are allocated once
/// and never resized.
#[derive(Clone, Debug)]
pub struct ChangeDetector {
    previous: Vec<u64>,
    current: Vec<u64>,
}

impl ChangeDetector {
    /// Fresh tables for `blocks` blocks. Everything starts at zero, so the first pass recomputes
    /// every block whose fingerprint is not zero.
    pub fn new(blocks: usize) -> Self {
        Self {
            previous: vec![0; blocks],
            current: vec![0; blocks],
        }
    }

    pub fn len(&self) -> usize {
        self.previous.len()
    }

    pub fn is_empty(&self) -> bool {
        self.previous.is_empty()
    }

    /// Record `hash` for `block_index` and report whether it changed.
    ///
    /// On [`BlockChange::Changed`] the previous fingerprint is replaced immediately, whether or
    /// not the caller goes on to downsample.
    pub fn observe(&mut self, block_index: usize, hash: u64) -> BlockChange {
        observe_slot(
            &mut self.previous[block_index],
            &mut self.current[block_index],
            hash,
        )
    }

    /// Forget all previous fingerprints so the next pass recomputes every block.
    pub fn invalidate(&mut self) {
        self.previous.fill(0);
    }

    pub fn previous(&self) -> &[u64] {
        &self.previous
    }

    pub fn current(&self) -> &[u64] {
        &self.current
    }

    pub(crate) fn tables_mut(&mut self) -> (&mut [u64], &mut [u64]) {
        (self.previous.as_mut_slice(), self.current.as_mut_slice())
    }
}

/// The comparison for one block, on borrowed table slots so row-parallel passes can share it.
pub(crate) fn observe_slot(previous: &mut u64, current: &mut u64, hash: u64) -> BlockChange {
    *current = hash;
    if *previous == hash {
        return BlockChange::Unchanged;
    }
    *previous = hash;
    BlockChange::Changed
}
