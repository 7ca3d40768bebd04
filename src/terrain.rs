//! Terrain state: a height grid plus its lazily derived slope grid.

use crate::grid::Grid;

/// Owns one height grid and a slope grid derived from it on request.
///
/// The slope grid is gradient magnitude via central differences, with the
/// out-of-bounds neighbor treated as zero at the edges. A dirty flag tracks
/// staleness; recomputation only happens through `refresh_slope`.
#[derive(Clone, Debug)]
pub struct TerrainState {
    heights: Grid<f32>,
    slope: Grid<f32>,
    slope_dirty: bool,
}

impl TerrainState {
    pub fn new(heights: Grid<f32>) -> Self {
        let slope = Grid::new_with(heights.width, heights.height, 0.0);
        Self {
            heights,
            slope,
            slope_dirty: true,
        }
    }

    pub fn heights(&self) -> &Grid<f32> {
        &self.heights
    }

    /// Mutable access to the heights; marks the slope grid stale.
    pub fn heights_mut(&mut self) -> &mut Grid<f32> {
        self.slope_dirty = true;
        &mut self.heights
    }

    /// Replace the height grid wholesale (same dimensions expected by
    /// convention; the slope grid is rebuilt on next refresh either way).
    pub fn replace_heights(&mut self, heights: Grid<f32>) {
        self.slope = Grid::new_with(heights.width, heights.height, 0.0);
        self.heights = heights;
        self.slope_dirty = true;
    }

    /// The slope grid as of the last refresh; may be stale.
    pub fn slope(&self) -> &Grid<f32> {
        &self.slope
    }

    pub fn slope_is_dirty(&self) -> bool {
        self.slope_dirty
    }

    /// Recompute the slope grid from the current heights.
    pub fn refresh_slope(&mut self) {
        let w = self.heights.width;
        let h = self.heights.height;
        for y in 0..h {
            for x in 0..w {
                let zero = 0.0f32;
                let left = if x > 0 { *self.heights.get(x - 1, y) } else { zero };
                let right = if x + 1 < w { *self.heights.get(x + 1, y) } else { zero };
                let up = if y > 0 { *self.heights.get(x, y - 1) } else { zero };
                let down = if y + 1 < h { *self.heights.get(x, y + 1) } else { zero };

                let gx = (right - left) * 0.5;
                let gy = (down - up) * 0.5;
                self.slope.set(x, y, (gx * gx + gy * gy).sqrt());
            }
        }
        self.slope_dirty = false;
    }
}
