//! Noise sources for terrain synthesis.
//!
//! Three interchangeable sampling strategies (gradient, value, cellular)
//! behind one small capability trait, plus a fractal combiner that turns any
//! strategy into a heightmap generator. Strategies hold only their own seeded
//! state; two instances never share tables.

pub mod cellular;
pub mod fractal;
pub mod gradient;
pub mod value;

pub use cellular::CellularNoise;
pub use fractal::{DomainWarp, FractalField, FractalMode, NoiseFieldParams};
pub use gradient::GradientNoise;
pub use value::ValueNoise;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A deterministic scalar noise source.
///
/// Samples are in `[-1, 1]`. Reseeding is idempotent: the same seed always
/// restores bit-identical output, and seed 0 selects a fixed default table
/// where a strategy has one.
pub trait NoiseSource {
    fn sample1d(&self, x: f64) -> f64;
    fn sample2d(&self, x: f64, y: f64) -> f64;
    fn sample3d(&self, x: f64, y: f64, z: f64) -> f64;
    fn reseed(&mut self, seed: u64);
}

/// Distance metric used by cellular noise and the island shaper.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    #[default]
    Euclidean,
    EuclideanSquared,
    Manhattan,
    /// Chessboard distance; produces square/diagonal cell shapes.
    Chebyshev,
    /// Softened Euclidean with a rounded bottom near the feature point.
    Hyperboloid,
    /// Linear falloff saturating at distance 1.
    BumpLinear,
    /// Quadratic falloff saturating at distance 1.
    BumpQuadratic,
}

const HYPERBOLOID_OFFSET: f64 = 0.5;

impl DistanceMetric {
    pub fn evaluate(&self, dx: f64, dy: f64) -> f64 {
        let d2 = dx * dx + dy * dy;
        match self {
            Self::Euclidean => d2.sqrt(),
            Self::EuclideanSquared => d2,
            Self::Manhattan => dx.abs() + dy.abs(),
            Self::Chebyshev => dx.abs().max(dy.abs()),
            Self::Hyperboloid => {
                (d2 + HYPERBOLOID_OFFSET * HYPERBOLOID_OFFSET).sqrt() - HYPERBOLOID_OFFSET
            }
            Self::BumpLinear => d2.sqrt().min(1.0),
            Self::BumpQuadratic => d2.min(1.0),
        }
    }

    pub fn all() -> &'static [Self] {
        &[
            Self::Euclidean,
            Self::EuclideanSquared,
            Self::Manhattan,
            Self::Chebyshev,
            Self::Hyperboloid,
            Self::BumpLinear,
            Self::BumpQuadratic,
        ]
    }
}

impl std::fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Euclidean => "euclidean",
            Self::EuclideanSquared => "euclidean_squared",
            Self::Manhattan => "manhattan",
            Self::Chebyshev => "chebyshev",
            Self::Hyperboloid => "hyperboloid",
            Self::BumpLinear => "bump_linear",
            Self::BumpQuadratic => "bump_quadratic",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for DistanceMetric {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "euclidean" => Ok(Self::Euclidean),
            "euclidean_squared" => Ok(Self::EuclideanSquared),
            "manhattan" => Ok(Self::Manhattan),
            "chebyshev" => Ok(Self::Chebyshev),
            "hyperboloid" => Ok(Self::Hyperboloid),
            "bump_linear" => Ok(Self::BumpLinear),
            "bump_quadratic" => Ok(Self::BumpQuadratic),
            _ => Err(ConfigError::UnknownDistanceMetric(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_zero_distance_is_zero() {
        for metric in DistanceMetric::all() {
            assert_eq!(metric.evaluate(0.0, 0.0), 0.0, "{}", metric);
        }
    }

    #[test]
    fn test_metric_round_trip_names() {
        for metric in DistanceMetric::all() {
            let parsed: DistanceMetric = metric.to_string().parse().unwrap();
            assert_eq!(parsed, *metric);
        }
    }

    #[test]
    fn test_unknown_metric_is_config_error() {
        let err = "euclid".parse::<DistanceMetric>().unwrap_err();
        assert_eq!(err, ConfigError::UnknownDistanceMetric("euclid".into()));
    }

    #[test]
    fn test_bump_metrics_saturate() {
        assert_eq!(DistanceMetric::BumpLinear.evaluate(5.0, 5.0), 1.0);
        assert_eq!(DistanceMetric::BumpQuadratic.evaluate(2.0, 0.0), 1.0);
    }
}
