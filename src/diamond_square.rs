//! Diamond-Square midpoint-displacement terrain generation.
//!
//! Operates on `(2^n + 1)` square grids. All randomness comes from one
//! ChaCha8 stream consumed in a fixed order: the four corners first, then
//! for each pass every diamond step in row-major chunk order followed by
//! every square step in row-major chunk order. Identical `(power,
//! roughness, seed)` therefore reproduce the grid bit for bit.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::grid::Grid;

/// Roughness halves after each pass but never drops below this.
const MIN_ROUGHNESS: f32 = 0.001;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiamondSquareParams {
    /// Grid size exponent: the map is `(2^power + 1)` cells on a side.
    pub power: u32,
    /// Initial random perturbation magnitude.
    pub roughness: f32,
    pub seed: u64,
}

impl Default for DiamondSquareParams {
    fn default() -> Self {
        Self {
            power: 7,
            roughness: 0.6,
            seed: 0,
        }
    }
}

/// Generate a `(2^power + 1)` square heightmap with values in `[0, 1]`.
pub fn generate(params: &DiamondSquareParams) -> Grid<f32> {
    let size = (1usize << params.power) + 1;
    let mut map = Grid::new_with(size, size, 0.0f32);
    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);

    // Corners: top-left, top-right, bottom-left, bottom-right.
    for &(x, y) in &[(0, 0), (size - 1, 0), (0, size - 1), (size - 1, size - 1)] {
        map.set(x, y, rng.gen_range(0.0..=1.0));
    }

    let mut chunk = size - 1;
    let mut roughness = params.roughness.max(0.0);

    while chunk > 1 {
        let half = chunk / 2;

        // Diamond step: chunk centers from their four corners.
        for cy in (half..size).step_by(chunk) {
            for cx in (half..size).step_by(chunk) {
                let mut sum = 0.0;
                let mut count = 0;
                for &(dx, dy) in &[(-1i64, -1i64), (1, -1), (-1, 1), (1, 1)] {
                    let nx = cx as i64 + dx * half as i64;
                    let ny = cy as i64 + dy * half as i64;
                    if in_bounds(nx, ny, size) {
                        sum += *map.get(nx as usize, ny as usize);
                        count += 1;
                    }
                }
                let value = sum / count as f32 + rng.gen_range(-roughness..=roughness);
                map.set(cx, cy, value.clamp(0.0, 1.0));
            }
        }

        // Square step: edge midpoints from their available axis neighbors,
        // row-major over the interleaved lattice.
        for sy in (0..size).step_by(half) {
            let x_start = if (sy / half) % 2 == 0 { half } else { 0 };
            for sx in (x_start..size).step_by(chunk) {
                let mut sum = 0.0;
                let mut count = 0;
                for &(dx, dy) in &[(0i64, -1i64), (-1, 0), (1, 0), (0, 1)] {
                    let nx = sx as i64 + dx * half as i64;
                    let ny = sy as i64 + dy * half as i64;
                    if in_bounds(nx, ny, size) {
                        sum += *map.get(nx as usize, ny as usize);
                        count += 1;
                    }
                }
                let value = sum / count as f32 + rng.gen_range(-roughness..=roughness);
                map.set(sx, sy, value.clamp(0.0, 1.0));
            }
        }

        chunk /= 2;
        roughness = (roughness * 0.5).max(MIN_ROUGHNESS);
    }

    map
}

fn in_bounds(x: i64, y: i64, size: usize) -> bool {
    x >= 0 && y >= 0 && x < size as i64 && y < size as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_is_power_of_two_plus_one() {
        for power in 1..=5 {
            let map = generate(&DiamondSquareParams {
                power,
                roughness: 0.5,
                seed: 1,
            });
            let expected = (1usize << power) + 1;
            assert_eq!(map.width, expected);
            assert_eq!(map.height, expected);
        }
    }

    #[test]
    fn test_values_stay_in_unit_range() {
        let map = generate(&DiamondSquareParams {
            power: 5,
            roughness: 3.0,
            seed: 99,
        });
        let (min, max) = map.min_max();
        assert!(min >= 0.0 && max <= 1.0);
    }

    #[test]
    fn test_power_two_roughness_three_seed_seven_reproduces() {
        let params = DiamondSquareParams {
            power: 2,
            roughness: 3.0,
            seed: 7,
        };
        let a = generate(&params);
        let b = generate(&params);

        assert_eq!(a.width, 5);
        assert_eq!(a.height, 5);
        assert_eq!(a.as_slice().len(), 25);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = generate(&DiamondSquareParams {
            power: 4,
            roughness: 0.8,
            seed: 1,
        });
        let b = generate(&DiamondSquareParams {
            power: 4,
            roughness: 0.8,
            seed: 2,
        });
        assert_ne!(a, b);
    }

    #[test]
    fn test_every_cell_written() {
        // With zero roughness everything is pure averaging of the corners;
        // no interior cell may remain at its initial zero unless the
        // corners themselves average to it.
        let map = generate(&DiamondSquareParams {
            power: 3,
            roughness: 0.0,
            seed: 13,
        });
        let (min, _) = map.min_max();
        let corner_min = [
            *map.get(0, 0),
            *map.get(8, 0),
            *map.get(0, 8),
            *map.get(8, 8),
        ]
        .into_iter()
        .fold(f32::MAX, f32::min);
        // Interior averages can dip slightly below corner values only via
        // the (floored) noise term.
        assert!(min >= corner_min - MIN_ROUGHNESS * 8.0);
    }
}
