//! Hydraulic erosion over a heightmap.
//!
//! The authoritative entry point is the raw-grid form
//! [`simulator::erode`]: it mutates a caller-owned height grid in place
//! against an explicit sea level. [`erode_world`] is a thin adapter for
//! callers that already hold a [`WorldContext`].

pub mod params;
pub mod simulator;

pub use params::{ErosionParams, ErosionPreset, RainIntensity, RainMode, MAX_ITERATIONS};
pub use simulator::{erode, ErosionOutcome, IterationObserver};

use crate::cancel::CancelToken;
use crate::world::WorldContext;

/// Run erosion against a world context's terrain.
///
/// Marks the slope grid stale but does not refresh it; the caller decides
/// when to pay for that.
pub fn erode_world(
    world: &mut WorldContext,
    params: &ErosionParams,
    cancel: &CancelToken,
    observer: Option<IterationObserver<'_>>,
) -> ErosionOutcome {
    let sea_level = world.sea_level();
    erode(
        world.terrain_mut().heights_mut(),
        sea_level,
        params,
        cancel,
        observer,
    )
}
