//! Island shaping: blends a heightmap against a radial falloff mask built
//! from one or more feature points.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::noise::DistanceMetric;

/// Where the falloff feature points come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeaturePointMode {
    /// One point at the exact map center.
    Center,
    /// One point drawn uniformly inside the margin.
    SingleRandom,
    /// N points drawn uniformly inside the margin, in order, x then y each.
    Random(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IslandParams {
    pub mode: FeaturePointMode,
    /// Fractional inset from the map edges that random points respect.
    pub margin: f32,
    /// Falloff extent in cells; beyond it the factor sits at `floor`.
    pub radius: f32,
    /// The falloff factor never drops below this.
    pub floor: f32,
    pub metric: DistanceMetric,
    /// Interpolation weight between original height and shaped height.
    pub strength: f32,
    pub seed: u64,
}

impl Default for IslandParams {
    fn default() -> Self {
        Self {
            mode: FeaturePointMode::Center,
            margin: 0.1,
            radius: 64.0,
            floor: 0.05,
            metric: DistanceMetric::Euclidean,
            strength: 1.0,
            seed: 0,
        }
    }
}

/// Generate the feature points for a map of the given dimensions.
/// Deterministic for a given `(params, width, height)`.
pub fn feature_points(params: &IslandParams, width: usize, height: usize) -> Vec<(f32, f32)> {
    let margin = params.margin.clamp(0.0, 0.49);
    let x_min = width as f32 * margin;
    let x_max = width as f32 * (1.0 - margin);
    let y_min = height as f32 * margin;
    let y_max = height as f32 * (1.0 - margin);

    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    let mut draw = |count: usize| -> Vec<(f32, f32)> {
        (0..count)
            .map(|_| {
                let x = rng.gen_range(x_min..=x_max);
                let y = rng.gen_range(y_min..=y_max);
                (x, y)
            })
            .collect()
    };

    match params.mode {
        FeaturePointMode::Center => {
            vec![(width as f32 * 0.5, height as f32 * 0.5)]
        }
        FeaturePointMode::SingleRandom => draw(1),
        FeaturePointMode::Random(n) => draw(n),
    }
}

/// Falloff factor at a cell: 1 at a feature point, `floor` at and beyond
/// `radius`, linear (in the chosen metric) in between.
pub fn falloff_at(params: &IslandParams, points: &[(f32, f32)], x: f32, y: f32) -> f32 {
    let radius = params.radius.max(f32::MIN_POSITIVE);
    let floor = params.floor.clamp(0.0, 1.0);

    let mut nearest = f32::MAX;
    for &(px, py) in points {
        let d = params
            .metric
            .evaluate((x - px) as f64, (y - py) as f64) as f32;
        if d < nearest {
            nearest = d;
        }
    }
    if nearest == f32::MAX {
        return floor;
    }

    let normalized = (nearest / radius).clamp(0.0, 1.0);
    (1.0 - normalized).max(floor)
}

/// Blend `heights` in place toward the radial falloff mask.
pub fn shape(heights: &mut Grid<f32>, params: &IslandParams) {
    let points = feature_points(params, heights.width, heights.height);
    let strength = params.strength.clamp(0.0, 1.0);

    for y in 0..heights.height {
        for x in 0..heights.width {
            let factor = falloff_at(params, &points, x as f32, y as f32);
            let original = *heights.get(x, y);
            let shaped = original * factor;
            heights.set(x, y, original + (shaped - original) * strength);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(radius: f32, floor: f32) -> IslandParams {
        IslandParams {
            mode: FeaturePointMode::Center,
            radius,
            floor,
            strength: 1.0,
            ..IslandParams::default()
        }
    }

    #[test]
    fn test_factor_is_one_at_feature_point() {
        let p = params(10.0, 0.1);
        let points = feature_points(&p, 21, 21);
        assert_eq!(falloff_at(&p, &points, 10.5, 10.5), 1.0);
    }

    #[test]
    fn test_factor_is_floor_beyond_radius() {
        let p = params(5.0, 0.2);
        let points = vec![(0.0, 0.0)];
        assert_eq!(falloff_at(&p, &points, 5.0, 0.0), 0.2);
        assert_eq!(falloff_at(&p, &points, 50.0, 50.0), 0.2);
    }

    #[test]
    fn test_factor_never_below_floor() {
        let p = params(8.0, 0.15);
        let points = feature_points(&p, 33, 33);
        for y in 0..33 {
            for x in 0..33 {
                let f = falloff_at(&p, &points, x as f32, y as f32);
                assert!(f >= 0.15 && f <= 1.0);
            }
        }
    }

    #[test]
    fn test_full_strength_blend_scales_heights() {
        let mut map = Grid::new_with(17, 17, 1.0f32);
        let p = params(4.0, 0.0);
        shape(&mut map, &p);
        // Near the center most height survives, far corners drop to the floor.
        assert!(*map.get(8, 8) > 0.8);
        assert!(*map.get(0, 0) < 0.05);
    }

    #[test]
    fn test_zero_strength_is_identity() {
        let mut map = Grid::new_with(9, 9, 0.7f32);
        let original = map.clone();
        let p = IslandParams {
            strength: 0.0,
            ..params(4.0, 0.0)
        };
        shape(&mut map, &p);
        assert_eq!(map, original);
    }

    #[test]
    fn test_random_points_respect_margin_and_seed() {
        let p = IslandParams {
            mode: FeaturePointMode::Random(6),
            margin: 0.25,
            seed: 41,
            ..IslandParams::default()
        };
        let a = feature_points(&p, 100, 80);
        let b = feature_points(&p, 100, 80);
        assert_eq!(a, b);
        for &(x, y) in &a {
            assert!(x >= 25.0 && x <= 75.0);
            assert!(y >= 20.0 && y <= 60.0);
        }
    }
}
