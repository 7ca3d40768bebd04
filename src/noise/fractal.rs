//! Fractal octave combination and heightmap generation over any noise source.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::grid::Grid;

use super::NoiseSource;

/// Octave counts are clamped into this range.
pub const MAX_OCTAVES: u32 = 10;

// Distinct z-slices keep the two warp components decorrelated.
const WARP_SLICE_X: f64 = 0.0;
const WARP_SLICE_Y: f64 = 37.0;

/// How octaves combine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FractalMode {
    /// Fractional Brownian motion: plain amplitude-weighted sum.
    #[default]
    Fbm,
    /// Ridged multifractal: `1 - |noise|` per octave, sharp ridgelines.
    Ridged,
}

impl std::fmt::Display for FractalMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fbm => write!(f, "fbm"),
            Self::Ridged => write!(f, "ridged"),
        }
    }
}

impl std::str::FromStr for FractalMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fbm" => Ok(Self::Fbm),
            "ridged" => Ok(Self::Ridged),
            _ => Err(ConfigError::UnknownFractalMode(s.to_string())),
        }
    }
}

/// Domain warping configuration: the sample coordinate is perturbed by a
/// second noise evaluation before the fractal sum.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DomainWarp {
    /// Displacement magnitude in sample-space units.
    pub strength: f64,
    /// Frequency of the warp field relative to the sample coordinate.
    pub scale: f64,
}

/// Value parameters for a fractal noise field. Plain data, no shared state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseFieldParams {
    pub seed: u64,
    /// Cell-to-sample-space scale (lower = larger features).
    pub frequency: f64,
    pub octaves: u32,
    /// Amplitude falloff per octave.
    pub persistence: f64,
    /// Frequency growth per octave.
    pub lacunarity: f64,
    pub offset: (f64, f64),
    pub mode: FractalMode,
    pub warp: Option<DomainWarp>,
}

impl Default for NoiseFieldParams {
    fn default() -> Self {
        Self {
            seed: 0,
            frequency: 0.05,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            offset: (0.0, 0.0),
            mode: FractalMode::Fbm,
            warp: None,
        }
    }
}

/// Fractal combination of a noise strategy into a heightmap generator.
pub struct FractalField<S: NoiseSource> {
    source: S,
    params: NoiseFieldParams,
}

impl<S: NoiseSource> FractalField<S> {
    pub fn new(mut source: S, params: NoiseFieldParams) -> Self {
        source.reseed(params.seed);
        Self { source, params }
    }

    pub fn params(&self) -> &NoiseFieldParams {
        &self.params
    }

    /// Octave-summed value at a sample-space coordinate, in `[-1, 1]`.
    ///
    /// The sum is normalized by the total amplitude used, so adding octaves
    /// never pushes the result out of range.
    pub fn octave_sum(&self, x: f64, y: f64) -> f64 {
        let octaves = self.params.octaves.clamp(1, MAX_OCTAVES);
        let persistence = self.params.persistence.clamp(0.0, 1.0);

        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut sum = 0.0;
        let mut norm = 0.0;

        for _ in 0..octaves {
            let n = self.source.sample2d(x * frequency, y * frequency);
            match self.params.mode {
                FractalMode::Fbm => sum += n * amplitude,
                FractalMode::Ridged => sum += (1.0 - n.abs()) * amplitude,
            }
            norm += amplitude;
            amplitude *= persistence;
            frequency *= self.params.lacunarity;
        }

        let v = sum / norm;
        match self.params.mode {
            FractalMode::Fbm => v,
            // Ridged accumulates in [0,1]; recentre to the common range.
            FractalMode::Ridged => v * 2.0 - 1.0,
        }
    }

    /// Generate a heightmap with values in `[0, 1]`.
    ///
    /// Grid coordinates map to sample space through `frequency` and
    /// `offset`; with warping enabled the coordinate is first displaced by
    /// two 3D noise evaluations taken on distinct z-slices.
    pub fn generate_map(&self, width: usize, height: usize) -> Grid<f32> {
        let mut map = Grid::new_with(width, height, 0.0f32);

        for y in 0..height {
            for x in 0..width {
                // Cells sample at their centers, so a cell straddling a
                // feature of the source field reads the feature's value
                // rather than a corner neighbour's.
                let mut sx = (x as f64 + 0.5) * self.params.frequency + self.params.offset.0;
                let mut sy = (y as f64 + 0.5) * self.params.frequency + self.params.offset.1;

                if let Some(warp) = self.params.warp {
                    let wx = self.source.sample3d(sx * warp.scale, sy * warp.scale, WARP_SLICE_X);
                    let wy = self.source.sample3d(sx * warp.scale, sy * warp.scale, WARP_SLICE_Y);
                    sx += wx * warp.strength;
                    sy += wy * warp.strength;
                }

                let v = self.octave_sum(sx, sy);
                map.set(x, y, (((v + 1.0) * 0.5) as f32).clamp(0.0, 1.0));
            }
        }

        map
    }
}
