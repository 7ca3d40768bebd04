//! Rule-driven blue-noise scattering over named occupancy layers.
//!
//! Each layer runs a dynamic dart-throwing scatter: grow outward from a
//! random valid start point, spawning candidates in the `[r, 2r]` annulus
//! around random active points, with a spatial hash enforcing the pairwise
//! spacing invariant. Later layers can be marked to overwrite earlier
//! layers' cells on conflict.
//!
//! All randomness for one run comes from a single ChaCha8 stream consumed
//! layer by layer: start-cell draws first, then for each placement attempt
//! the active-point index, then one angle and one distance per candidate.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::cancel::CancelToken;
use crate::error::ConfigError;
use crate::grid::Grid;
use crate::world::{OccupancyLayer, WorldContext};

use super::rules::{CompositeRule, PlacementRule, RadiusRule};
use super::spatial_hash::{PlacedPoint, SpatialHash};

/// One layer to scatter: identity, rules, spacing, conflict policy.
pub struct LayerPlan {
    pub id: String,
    pub name: Option<String>,
    pub rule: CompositeRule,
    pub radius: Box<dyn RadiusRule>,
    /// On conflict with an earlier layer's cell, clear that cell and place
    /// anyway. Without this, conflicting candidates are rejected.
    pub overwrite: bool,
}

impl LayerPlan {
    pub fn new(id: impl Into<String>, rule: CompositeRule, radius: Box<dyn RadiusRule>) -> Self {
        Self {
            id: id.into(),
            name: None,
            rule,
            radius,
            overwrite: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn overwriting(mut self) -> Self {
        self.overwrite = true;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlacementParams {
    /// Occupancy grid resolution relative to the terrain grid.
    pub frequency: f32,
    pub seed: u64,
    /// Candidates tried per active point before it is retired.
    pub candidate_attempts: usize,
    /// Random cells tried when looking for a layer's start point.
    pub start_attempts: usize,
}

impl Default for PlacementParams {
    fn default() -> Self {
        Self {
            frequency: 1.0,
            seed: 0,
            candidate_attempts: 16,
            start_attempts: 128,
        }
    }
}

/// The layers produced by a run. A cancelled run keeps the layers that
/// finished before the cancellation was observed.
#[derive(Debug)]
pub struct PlacementOutcome {
    pub layers: Vec<OccupancyLayer>,
    pub cancelled: bool,
}

/// Scatter every planned layer over the world.
///
/// Duplicate layer ids across the plans are a configuration error.
pub fn scatter(
    world: &WorldContext,
    plans: &[LayerPlan],
    params: &PlacementParams,
    cancel: &CancelToken,
) -> Result<PlacementOutcome, ConfigError> {
    for (i, plan) in plans.iter().enumerate() {
        if plans[..i].iter().any(|p| p.id == plan.id) {
            return Err(ConfigError::DuplicateLayerId(plan.id.clone()));
        }
    }

    if world.width() == 0 || world.height() == 0 {
        let layers = plans
            .iter()
            .map(|plan| {
                let mut layer = OccupancyLayer::new(plan.id.clone(), Grid::new_with(0, 0, false));
                layer.name = plan.name.clone();
                layer
            })
            .collect();
        return Ok(PlacementOutcome {
            layers,
            cancelled: false,
        });
    }

    let frequency = params.frequency.max(f32::MIN_POSITIVE);
    let grid_w = ((world.width() as f32 * frequency).round() as usize).max(1);
    let grid_h = ((world.height() as f32 * frequency).round() as usize).max(1);
    // Exact occupancy-to-terrain coordinate scale.
    let to_terrain = (
        world.width() as f32 / grid_w as f32,
        world.height() as f32 / grid_h as f32,
    );

    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    let mut layers: Vec<OccupancyLayer> = Vec::with_capacity(plans.len());
    let mut cancelled = false;

    for plan in plans {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }

        let cells = scatter_layer(
            world,
            plan,
            params,
            (grid_w, grid_h),
            to_terrain,
            &mut layers,
            &mut rng,
        );
        let mut layer = OccupancyLayer::new(plan.id.clone(), cells);
        layer.name = plan.name.clone();
        layers.push(layer);
    }

    Ok(PlacementOutcome { layers, cancelled })
}

fn scatter_layer(
    world: &WorldContext,
    plan: &LayerPlan,
    params: &PlacementParams,
    (grid_w, grid_h): (usize, usize),
    to_terrain: (f32, f32),
    earlier: &mut [OccupancyLayer],
    rng: &mut ChaCha8Rng,
) -> Grid<bool> {
    let mut cells = Grid::new_with(grid_w, grid_h, false);

    let terrain_pos = |x: f32, y: f32| (x * to_terrain.0, y * to_terrain.1);

    // Start point: random cells until one passes every check.
    let mut start = None;
    for _ in 0..params.start_attempts {
        let cx = rng.gen_range(0..grid_w);
        let cy = rng.gen_range(0..grid_h);
        let (px, py) = (cx as f32 + 0.5, cy as f32 + 0.5);
        let (tx, ty) = terrain_pos(px, py);
        if !plan.rule.allows(tx, ty, world) {
            continue;
        }
        if occupied_by_earlier(earlier, cx, cy).is_some() && !plan.overwrite {
            continue;
        }
        start = Some((px, py));
        break;
    }
    let Some((sx, sy)) = start else {
        return cells;
    };

    let (stx, sty) = terrain_pos(sx, sy);
    let start_radius = plan.radius.radius_at(stx, sty, world).max(0.0);
    let mut hash = SpatialHash::new(start_radius.max(1.0));

    place(&mut cells, earlier, sx, sy, plan.overwrite);
    hash.insert(PlacedPoint {
        x: sx,
        y: sy,
        radius: start_radius,
    });
    let mut active = vec![PlacedPoint {
        x: sx,
        y: sy,
        radius: start_radius,
    }];

    while !active.is_empty() {
        let idx = rng.gen_range(0..active.len());
        let anchor = active[idx];
        let r = anchor.radius.max(0.0);

        let mut accepted = false;
        for _ in 0..params.candidate_attempts {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let dist = rng.gen_range(r..=r * 2.0);
            let raw_x = anchor.x + angle.cos() * dist;
            let raw_y = anchor.y + angle.sin() * dist;

            if raw_x < 0.0 || raw_y < 0.0 || raw_x >= grid_w as f32 || raw_y >= grid_h as f32 {
                continue;
            }
            let cx = raw_x.floor() as usize;
            let cy = raw_y.floor() as usize;
            // Snap to the cell center so occupancy and spacing agree.
            let (px, py) = (cx as f32 + 0.5, cy as f32 + 0.5);

            if *cells.get(cx, cy) {
                continue;
            }
            let conflict = occupied_by_earlier(earlier, cx, cy).is_some();
            if conflict && !plan.overwrite {
                continue;
            }

            let (tx, ty) = terrain_pos(px, py);
            if !plan.rule.allows(tx, ty, world) {
                continue;
            }

            let candidate_radius = plan.radius.radius_at(tx, ty, world).max(0.0);
            if !hash.is_clear(px, py, candidate_radius) {
                continue;
            }

            place(&mut cells, earlier, px, py, plan.overwrite);
            let point = PlacedPoint {
                x: px,
                y: py,
                radius: candidate_radius,
            };
            hash.insert(point);
            active.push(point);
            accepted = true;
            break;
        }

        if !accepted {
            // Retired from the frontier but stays placed.
            active.swap_remove(idx);
        }
    }

    cells
}

fn occupied_by_earlier(earlier: &[OccupancyLayer], cx: usize, cy: usize) -> Option<usize> {
    earlier
        .iter()
        .position(|layer| *layer.cells.get(cx, cy))
}

/// Mark a cell occupied, clearing the same cell in whichever earlier layer
/// holds it when overwriting.
fn place(cells: &mut Grid<bool>, earlier: &mut [OccupancyLayer], px: f32, py: f32, overwrite: bool) {
    let cx = px.floor() as usize;
    let cy = py.floor() as usize;
    if overwrite {
        if let Some(i) = occupied_by_earlier(earlier, cx, cy) {
            earlier[i].cells.set(cx, cy, false);
        }
    }
    cells.set(cx, cy, true);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::rules::{AltitudeBand, ConstantRadius};
    use crate::terrain::TerrainState;

    fn flat_world(size: usize) -> WorldContext {
        WorldContext::new(TerrainState::new(Grid::new_with(size, size, 0.8f32)), 0.2)
    }

    fn occupied(cells: &Grid<bool>) -> Vec<(usize, usize)> {
        cells
            .iter()
            .filter(|(_, _, &v)| v)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    fn plan(id: &str, radius: f32) -> LayerPlan {
        LayerPlan::new(id, CompositeRule::new(), Box::new(ConstantRadius(radius)))
    }

    #[test]
    fn test_flat_map_constant_radius_spacing() {
        // Always-true rule, radius 3: no two occupied cells closer than 3.
        let world = flat_world(32);
        let params = PlacementParams {
            seed: 9,
            ..PlacementParams::default()
        };
        let outcome = scatter(&world, &[plan("trees", 3.0)], &params, &CancelToken::new()).unwrap();

        let cells = occupied(&outcome.layers[0].cells);
        assert!(cells.len() > 5, "expected a populated layer, got {}", cells.len());
        for (i, &(ax, ay)) in cells.iter().enumerate() {
            for &(bx, by) in &cells[i + 1..] {
                let dx = ax as f32 - bx as f32;
                let dy = ay as f32 - by as f32;
                let dist = (dx * dx + dy * dy).sqrt();
                assert!(dist >= 3.0, "cells {:?} and {:?} are {} apart", (ax, ay), (bx, by), dist);
            }
        }
    }

    #[test]
    fn test_run_is_deterministic() {
        let world = flat_world(24);
        let params = PlacementParams {
            seed: 31,
            ..PlacementParams::default()
        };
        let a = scatter(&world, &[plan("trees", 2.0)], &params, &CancelToken::new()).unwrap();
        let b = scatter(&world, &[plan("trees", 2.0)], &params, &CancelToken::new()).unwrap();
        assert_eq!(a.layers[0].cells, b.layers[0].cells);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let world = flat_world(8);
        let plans = [plan("trees", 2.0), plan("trees", 3.0)];
        let err = scatter(&world, &plans, &PlacementParams::default(), &CancelToken::new())
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateLayerId("trees".into()));
    }

    #[test]
    fn test_impassable_rule_yields_empty_layer() {
        let world = flat_world(16);
        let never = CompositeRule::new().with(AltitudeBand {
            min: 10.0,
            max: 20.0,
        });
        let plans = [LayerPlan::new("trees", never, Box::new(ConstantRadius(2.0)))];
        let outcome =
            scatter(&world, &plans, &PlacementParams::default(), &CancelToken::new()).unwrap();
        assert!(occupied(&outcome.layers[0].cells).is_empty());
    }

    #[test]
    fn test_non_overwrite_respects_earlier_layers() {
        let world = flat_world(24);
        let params = PlacementParams {
            seed: 3,
            ..PlacementParams::default()
        };
        let plans = [plan("first", 1.0), plan("second", 1.0)];
        let outcome = scatter(&world, &plans, &params, &CancelToken::new()).unwrap();

        let first = &outcome.layers[0].cells;
        let second = &outcome.layers[1].cells;
        for (x, y, &v) in second.iter() {
            if v {
                assert!(!*first.get(x, y), "cell ({}, {}) double-occupied", x, y);
            }
        }
    }

    #[test]
    fn test_overwrite_clears_earlier_layer() {
        let world = flat_world(24);
        let params = PlacementParams {
            seed: 3,
            ..PlacementParams::default()
        };
        let plans = [plan("first", 1.0), plan("second", 1.0).overwriting()];
        let outcome = scatter(&world, &plans, &params, &CancelToken::new()).unwrap();

        let first = &outcome.layers[0].cells;
        let second = &outcome.layers[1].cells;
        for (x, y, &v) in second.iter() {
            if v {
                assert!(!*first.get(x, y), "conflict at ({}, {}) not cleared", x, y);
            }
        }
    }

    #[test]
    fn test_cancelled_run_keeps_finished_layers() {
        let world = flat_world(16);
        let token = CancelToken::new();
        token.cancel();
        let plans = [plan("trees", 2.0)];
        let outcome = scatter(&world, &plans, &PlacementParams::default(), &token).unwrap();
        assert!(outcome.cancelled);
        assert!(outcome.layers.is_empty());
    }

    #[test]
    fn test_frequency_scales_occupancy_grid() {
        let world = flat_world(32);
        let params = PlacementParams {
            frequency: 0.5,
            seed: 12,
            ..PlacementParams::default()
        };
        let outcome = scatter(&world, &[plan("trees", 2.0)], &params, &CancelToken::new()).unwrap();
        assert_eq!(outcome.layers[0].cells.width, 16);
        assert_eq!(outcome.layers[0].cells.height, 16);
    }
}
