//! Cellular (Worley) noise: distance field to the nearest of a scattered set
//! of feature points, normalized and optionally inverted.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{DistanceMetric, NoiseSource};

/// Worley noise over an explicit set of feature points.
///
/// Points are scattered uniformly over `extent` when the noise is seeded;
/// the draw order is one `(x, y)` pair per point, in point order, from a
/// single ChaCha8 stream. Values grow with distance to the nearest point
/// (or shrink, when `inverse` is set) and saturate at `max_distance`.
pub struct CellularNoise {
    points: Vec<(f64, f64)>,
    point_count: usize,
    extent: (f64, f64),
    metric: DistanceMetric,
    inverse: bool,
    max_distance: f64,
}

impl CellularNoise {
    pub fn new(
        seed: u64,
        point_count: usize,
        extent: (f64, f64),
        metric: DistanceMetric,
        inverse: bool,
    ) -> Self {
        let max_distance = metric.evaluate(extent.0, extent.1).max(f64::MIN_POSITIVE);
        let mut noise = Self {
            points: Vec::new(),
            point_count,
            extent,
            metric,
            inverse,
            max_distance,
        };
        noise.reseed(seed);
        noise
    }

    /// Override the normalization distance (clamped to stay positive).
    pub fn with_max_distance(mut self, max_distance: f64) -> Self {
        self.max_distance = max_distance.max(f64::MIN_POSITIVE);
        self
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Normalized nearest-point distance in `[0, 1]`.
    pub fn distance_at(&self, x: f64, y: f64) -> f64 {
        let mut nearest = f64::MAX;
        for &(px, py) in &self.points {
            let d = self.metric.evaluate(x - px, y - py);
            if d < nearest {
                nearest = d;
            }
        }
        if nearest == f64::MAX {
            // No feature points: a flat field.
            nearest = self.max_distance;
        }
        (nearest / self.max_distance).clamp(0.0, 1.0)
    }
}

impl NoiseSource for CellularNoise {
    fn sample1d(&self, x: f64) -> f64 {
        self.sample2d(x, 0.0)
    }

    fn sample2d(&self, x: f64, y: f64) -> f64 {
        let mut d = self.distance_at(x, y);
        if self.inverse {
            d = 1.0 - d;
        }
        d * 2.0 - 1.0
    }

    fn sample3d(&self, x: f64, y: f64, _z: f64) -> f64 {
        // Feature points live in the plane; the distance field is columnar.
        self.sample2d(x, y)
    }

    fn reseed(&mut self, seed: u64) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.points.clear();
        for _ in 0..self.point_count {
            let px = rng.gen_range(0.0..self.extent.0.max(f64::MIN_POSITIVE));
            let py = rng.gen_range(0.0..self.extent.1.max(f64::MIN_POSITIVE));
            self.points.push((px, py));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::fractal::{FractalMode, NoiseFieldParams};
    use crate::noise::FractalField;

    #[test]
    fn test_value_zero_at_feature_point() {
        let noise = CellularNoise::new(11, 4, (16.0, 16.0), DistanceMetric::Euclidean, false);
        let (px, py) = noise.points()[0];
        assert_eq!(noise.distance_at(px, py), 0.0);
        assert_eq!(noise.sample2d(px, py), -1.0);
    }

    #[test]
    fn test_monotone_in_distance_single_point() {
        let noise = CellularNoise::new(3, 1, (32.0, 32.0), DistanceMetric::Euclidean, false);
        let (px, py) = noise.points()[0];
        let mut last = -1.0;
        for step in 0..20 {
            let d = noise.distance_at(px + step as f64, py);
            assert!(d >= last);
            last = d;
        }
    }

    #[test]
    fn test_inverse_flips_ordering() {
        let noise = CellularNoise::new(3, 1, (32.0, 32.0), DistanceMetric::Euclidean, true);
        let (px, py) = noise.points()[0];
        assert_eq!(noise.sample2d(px, py), 1.0);
        assert!(noise.sample2d(px + 10.0, py) < 1.0);
    }

    #[test]
    fn test_saturates_at_max_distance() {
        let noise = CellularNoise::new(5, 1, (8.0, 8.0), DistanceMetric::Euclidean, false)
            .with_max_distance(2.0);
        let (px, py) = noise.points()[0];
        assert_eq!(noise.distance_at(px + 100.0, py), 1.0);
    }

    #[test]
    fn test_no_points_is_flat_field() {
        let noise = CellularNoise::new(1, 0, (8.0, 8.0), DistanceMetric::Euclidean, false);
        assert_eq!(noise.distance_at(1.0, 1.0), 1.0);
        assert_eq!(noise.distance_at(7.0, 3.0), 1.0);
    }

    #[test]
    fn test_single_feature_point_map() {
        // One feature point over an 8x8 map: the cell containing the point
        // holds the grid minimum and the opposite corner cell the maximum.
        let noise = CellularNoise::new(21, 1, (8.0, 8.0), DistanceMetric::Euclidean, false);
        let (px, py) = noise.points()[0];

        let params = NoiseFieldParams {
            seed: 21,
            frequency: 1.0,
            octaves: 1,
            mode: FractalMode::Fbm,
            ..NoiseFieldParams::default()
        };
        let field = FractalField::new(noise, params);
        let map = field.generate_map(8, 8);

        let (min, max) = map.min_max();
        let at_point = *map.get(px as usize, py as usize);
        assert!((at_point - min).abs() < 1e-6);

        // Farthest corner cell from the feature point.
        let fx = if px < 4.0 { 7 } else { 0 };
        let fy = if py < 4.0 { 7 } else { 0 };
        assert!((*map.get(fx, fy) - max).abs() < 1e-6);
    }
}
