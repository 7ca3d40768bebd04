//! Point placement: composable rules, spatial hashing and the scatter
//! engine that populates occupancy layers.

pub mod engine;
pub mod rules;
pub mod spatial_hash;

pub use engine::{scatter, LayerPlan, PlacementOutcome, PlacementParams};
pub use rules::{
    AltitudeBand, CompositeRule, ConstantRadius, LayerClearance, MoistureBand,
    MoistureGradedRadius, NoiseThreshold, PlacementRule, RadiusRule, SlopeBand, WaterProximity,
};
pub use spatial_hash::{PlacedPoint, SpatialHash};
