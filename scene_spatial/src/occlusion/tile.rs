/// Occlusion tile — the per-tile depth/coverage approximation.
///
/// A tile covers `TILE_WIDTH` x `TILE_HEIGHT` pixels. Coverage is one
/// `u32` per row (bit `c` = column `c`, LSB leftmost). Two depth layers:
/// - `z0`: everything behind it is hidden across the whole tile
/// - `z1`: farthest depth of the partial occluders recorded in `mask`
///
/// Depth is post-projection z/w in [0, 1], smaller = nearer.

/// Tile width in pixels (one `u32` per row).
pub const TILE_WIDTH: u32 = 32;

/// Tile height in rows.
pub const TILE_HEIGHT: u32 = 8;

/// Row mask with every column set.
pub const FULL_ROW: u32 = u32::MAX;

/// Mask with columns `first..=last` set (`first <= last < TILE_WIDTH`).
pub const fn span_mask(first: u32, last: u32) -> u32 {
    (FULL_ROW >> (TILE_WIDTH - 1 - last)) & (FULL_ROW << first)
}

/// Fields are only written by the merge rules below, which keep
/// `z1 < z0` whenever the working layer holds coverage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    mask: [u32; TILE_HEIGHT as usize],
    z0: f32,
    z1: f32,
    fully_covered: bool,
}

impl Default for Tile {
    fn default() -> Self {
        Self::CLEARED
    }
}

impl Tile {
    /// Nothing known: no coverage, far plane depth.
    pub const CLEARED: Tile = Tile {
        mask: [0; TILE_HEIGHT as usize],
        z0: 1.0,
        z1: 0.0,
        fully_covered: false,
    };

    /// Working-layer coverage, one word per row.
    pub fn mask(&self) -> &[u32; TILE_HEIGHT as usize] {
        &self.mask
    }

    /// Reference depth: with `is_fully_covered`, everything behind it is hidden.
    pub fn z0(&self) -> f32 {
        self.z0
    }

    /// Farthest depth of the coverage recorded in `mask`.
    pub fn z1(&self) -> f32 {
        self.z1
    }

    pub fn is_fully_covered(&self) -> bool {
        self.fully_covered
    }

    pub fn is_mask_full(&self) -> bool {
        self.mask.iter().all(|&row| row == FULL_ROW)
    }

    pub fn is_mask_empty(&self) -> bool {
        self.mask.iter().all(|&row| row == 0)
    }

    /// Farthest depth that still proves a box hidden when it covers the
    /// whole tile.
    pub fn max_depth(&self) -> f32 {
        self.z0.max(self.z1)
    }

    fn reset_working_layer(&mut self) {
        self.mask = [0; TILE_HEIGHT as usize];
        self.z1 = 0.0;
    }

    /// Record a triangle covering every pixel center of the tile.
    ///
    /// Returns whether the tile changed.
    pub fn apply_full(&mut self, depth: f32) -> bool {
        if !(depth < self.z0) {
            return false;
        }
        self.z0 = depth;
        self.reset_working_layer();
        self.fully_covered = true;
        true
    }

    /// Merge partial coverage at `depth` into the working layer.
    ///
    /// A working layer whose history spans more depth than the gap to
    /// `z0` is discarded first. A mask that becomes full is promoted to
    /// `z0`. Returns whether the tile changed.
    ///
    /// Merging is idempotent and commutes for occluders of equal depth.
    /// Across depths the discard makes the result order dependent: every
    /// order stays conservative, but a different order may prove less.
    pub fn merge_partial(&mut self, coverage: &[u32; TILE_HEIGHT as usize], depth: f32) -> bool {
        if !(depth < self.z0) {
            return false;
        }
        if self.z1 - depth > self.z0 - self.z1 {
            self.reset_working_layer();
        }
        self.z1 = self.z1.max(depth);
        for (row, bits) in self.mask.iter_mut().zip(coverage) {
            *row |= bits;
        }
        if self.is_mask_full() {
            self.z0 = self.z1;
            self.reset_working_layer();
            self.fully_covered = true;
        }
        true
    }
}
