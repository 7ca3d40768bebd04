//! Erosion simulation parameters and configuration

use serde::{Deserialize, Serialize};

/// Hard upper bound on erosion iterations.
pub const MAX_ITERATIONS: usize = 3000;

/// When rain is injected over the run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RainMode {
    /// One injection before the first iteration's flow step.
    Once,
    /// Injection at the start of every iteration.
    EveryIteration,
    /// Injection with this per-iteration probability.
    Probabilistic(f32),
}

/// How much water one injection adds per cell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RainIntensity {
    Fixed(f32),
    /// Uniformly random in `[0, cap]`, drawn once per injection.
    RandomUpTo(f32),
}

/// Erosion intensity preset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErosionPreset {
    /// No erosion - raw terrain
    None,
    /// Minimal erosion - subtle smoothing
    Minimal,
    /// Normal erosion - balanced
    #[default]
    Normal,
    /// Dramatic erosion - deep valleys and canyons
    Dramatic,
}

impl ErosionPreset {
    pub fn all() -> &'static [Self] {
        &[Self::None, Self::Minimal, Self::Normal, Self::Dramatic]
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::None => "No erosion (raw terrain)",
            Self::Minimal => "Subtle smoothing",
            Self::Normal => "Balanced erosion",
            Self::Dramatic => "Deep valleys and canyons",
        }
    }

    pub fn params(&self, seed: u64) -> ErosionParams {
        let base = ErosionParams {
            seed,
            ..ErosionParams::default()
        };
        match self {
            Self::None => ErosionParams {
                iterations: 0,
                ..base
            },
            Self::Minimal => ErosionParams {
                iterations: 80,
                abrasion: 0.02,
                ..base
            },
            Self::Normal => base,
            Self::Dramatic => ErosionParams {
                iterations: 900,
                abrasion: 0.12,
                rain: RainMode::EveryIteration,
                ..base
            },
        }
    }
}

impl std::fmt::Display for ErosionPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Minimal => write!(f, "minimal"),
            Self::Normal => write!(f, "normal"),
            Self::Dramatic => write!(f, "dramatic"),
        }
    }
}

/// Parameters for one hydraulic erosion run.
///
/// Constructed per run and discarded afterwards; the iteration count is
/// clamped to [`MAX_ITERATIONS`] when the run starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErosionParams {
    pub iterations: usize,
    pub rain: RainMode,
    pub rain_intensity: RainIntensity,
    /// Extra rain per unit of elevation (0 disables altitude scaling).
    pub altitude_rain_scaling: f32,

    /// Scales total outflow per cell after the water-availability clamp.
    pub flow_damping: f32,
    /// Sediment carrying capacity per unit of velocity and slope.
    pub solubility: f32,
    /// Erosion rate per unit of velocity and slope.
    pub abrasion: f32,
    /// Multiplicative water loss per iteration.
    pub evaporation: f32,
    /// Fraction of stored velocity lost per iteration.
    pub velocity_decay: f32,
    /// How strongly deep standing water suppresses erosion.
    pub deep_water_dampening: f32,
    /// Exponent applied to the normalized slope factor.
    pub slope_exponent: f32,

    /// Seed for the rain draws.
    pub seed: u64,
}

impl Default for ErosionParams {
    fn default() -> Self {
        Self {
            iterations: 300,
            rain: RainMode::Probabilistic(0.3),
            rain_intensity: RainIntensity::Fixed(0.01),
            altitude_rain_scaling: 0.0,
            flow_damping: 0.8,
            solubility: 0.6,
            abrasion: 0.06,
            evaporation: 0.02,
            velocity_decay: 0.1,
            deep_water_dampening: 4.0,
            slope_exponent: 1.5,
            seed: 0,
        }
    }
}
