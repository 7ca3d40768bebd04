/// A dense 2D grid with row-major storage and clamped edges.
///
/// Dimensions are fixed for the lifetime of the grid; contents may be
/// rewritten in place but the buffer is never resized.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone> Grid<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Build a grid from an already-flattened row-major buffer.
    /// Returns `None` if the buffer length does not match the dimensions.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Option<Self> {
        if data.len() != width * height {
            return None;
        }
        Some(Self { width, height, data })
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let idx = self.index(x, y);
        &mut self.data[idx]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Lookup with signed coordinates, saturating at the edges.
    /// Out-of-range reads never panic.
    pub fn get_clamped(&self, x: i64, y: i64) -> &T {
        let cx = x.clamp(0, self.width as i64 - 1) as usize;
        let cy = y.clamp(0, self.height as i64 - 1) as usize;
        self.get(cx, cy)
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate over `(x, y, &value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, v)| (i % width, i / width, v))
    }

    /// Expose the flattened row-major buffer (for snapshot export).
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

impl Grid<f32> {
    /// Sample at a fractional position using bilinear interpolation.
    /// Coordinates outside `[0, dim-1]` saturate before interpolating.
    pub fn sample_bilinear(&self, x: f32, y: f32) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let (x0, y0, x1, y1, fx, fy) = self.cell_fractions(x, y);

        let h00 = *self.get(x0, y0);
        let h10 = *self.get(x1, y0);
        let h01 = *self.get(x0, y1);
        let h11 = *self.get(x1, y1);

        let h0 = h00 * (1.0 - fx) + h10 * fx;
        let h1 = h01 * (1.0 - fx) + h11 * fx;
        h0 * (1.0 - fy) + h1 * fy
    }

    /// Like `sample_bilinear` but with smoothstep-eased interpolation weights,
    /// which hides cell boundaries when a grid is sampled at coarser resolution.
    pub fn sample_smooth(&self, x: f32, y: f32) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let (x0, y0, x1, y1, fx, fy) = self.cell_fractions(x, y);
        let fx = smoothstep(fx);
        let fy = smoothstep(fy);

        let h00 = *self.get(x0, y0);
        let h10 = *self.get(x1, y0);
        let h01 = *self.get(x0, y1);
        let h11 = *self.get(x1, y1);

        let h0 = h00 * (1.0 - fx) + h10 * fx;
        let h1 = h01 * (1.0 - fx) + h11 * fx;
        h0 * (1.0 - fy) + h1 * fy
    }

    /// Sample by progress coordinates in `[0,1]` across each axis.
    pub fn sample_normalized(&self, u: f32, v: f32) -> f32 {
        let x = u * (self.width.max(1) - 1) as f32;
        let y = v * (self.height.max(1) - 1) as f32;
        self.sample_bilinear(x, y)
    }

    fn cell_fractions(&self, x: f32, y: f32) -> (usize, usize, usize, usize, f32, f32) {
        let x = x.clamp(0.0, (self.width - 1) as f32);
        let y = y.clamp(0.0, (self.height - 1) as f32);

        let x0 = x.floor() as usize;
        let y0 = y.floor() as usize;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        (x0, y0, x1, y1, x.fract(), y.fract())
    }

    pub fn min_max(&self) -> (f32, f32) {
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for &v in &self.data {
            if v < min {
                min = v;
            }
            if v > max {
                max = v;
            }
        }
        (min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_addressing() {
        let mut grid = Grid::new_with(3, 2, 0.0f32);
        grid.set(2, 1, 5.0);
        assert_eq!(*grid.get(2, 1), 5.0);
        assert_eq!(grid.as_slice()[5], 5.0);
    }

    #[test]
    fn test_clamped_lookup_saturates() {
        let mut grid = Grid::new_with(4, 4, 1.0f32);
        grid.set(0, 0, 9.0);
        grid.set(3, 3, 7.0);
        assert_eq!(*grid.get_clamped(-10, -10), 9.0);
        assert_eq!(*grid.get_clamped(100, 100), 7.0);
    }

    #[test]
    fn test_bilinear_midpoint() {
        let mut grid = Grid::new_with(2, 1, 0.0f32);
        grid.set(1, 0, 1.0);
        let mid = grid.sample_bilinear(0.5, 0.0);
        assert!((mid - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_sample_outside_bounds_saturates() {
        let grid = Grid::new_with(4, 4, 0.25f32);
        assert_eq!(grid.sample_bilinear(-5.0, 2.0), 0.25);
        assert_eq!(grid.sample_bilinear(50.0, 50.0), 0.25);
    }

    #[test]
    fn test_normalized_sampling_corners() {
        let mut grid = Grid::new_with(5, 5, 0.0f32);
        grid.set(4, 4, 1.0);
        assert_eq!(grid.sample_normalized(0.0, 0.0), 0.0);
        assert!((grid.sample_normalized(1.0, 1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_from_vec_rejects_bad_length() {
        assert!(Grid::from_vec(3, 3, vec![0.0f32; 8]).is_none());
        assert!(Grid::from_vec(3, 3, vec![0.0f32; 9]).is_some());
    }

    #[test]
    fn test_zero_size_grid() {
        let grid: Grid<f32> = Grid::new(0, 0);
        assert!(grid.is_empty());
        assert_eq!(grid.iter().count(), 0);
    }
}
