//! Grid-based hydraulic erosion.
//!
//! Maintains water, sediment and velocity buffers alongside the caller's
//! height grid. Each iteration: rain, velocity decay, 8-directional flow
//! routing, erosion/deposition, sediment transport, evaporation, and a
//! final clamp. The simulator owns the height buffer exclusively for the
//! duration of one run; nothing else may read it until the call returns.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::cancel::CancelToken;
use crate::grid::Grid;

use super::params::{ErosionParams, RainIntensity, RainMode, MAX_ITERATIONS};

/// Water below this depth does not flow.
const FLOW_THRESHOLD: f32 = 1e-4;

const DIAG_WEIGHT: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// Neighbor offsets with diagonal weighting, fixed processing order.
const NEIGHBORS: [(i64, i64, f32); 8] = [
    (-1, -1, DIAG_WEIGHT),
    (0, -1, 1.0),
    (1, -1, DIAG_WEIGHT),
    (-1, 0, 1.0),
    (1, 0, 1.0),
    (-1, 1, DIAG_WEIGHT),
    (0, 1, 1.0),
    (1, 1, DIAG_WEIGHT),
];

/// What an erosion run reports back.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ErosionOutcome {
    pub iterations_completed: usize,
    pub cancelled: bool,
    /// Total water injected as rain, summed over all cells.
    pub rain_injected: f64,
}

/// Observer invoked after each completed iteration with the current heights.
pub type IterationObserver<'a> = &'a mut dyn FnMut(usize, &Grid<f32>);

/// Run hydraulic erosion over `heights` in place.
///
/// Heights and `sea_level` are in `[0, 1]`. The observer, when present, is
/// called after every completed iteration; the algorithm never depends on
/// it. Cancellation is polled at iteration boundaries and truncates the
/// run, leaving the last completed iteration's state intact.
pub fn erode(
    heights: &mut Grid<f32>,
    sea_level: f32,
    params: &ErosionParams,
    cancel: &CancelToken,
    mut observer: Option<IterationObserver<'_>>,
) -> ErosionOutcome {
    let mut sim = Simulator::new(heights, sea_level, params);
    let iterations = params.iterations.min(MAX_ITERATIONS);
    let mut outcome = ErosionOutcome::default();

    for iteration in 0..iterations {
        if cancel.is_cancelled() {
            outcome.cancelled = true;
            break;
        }

        outcome.rain_injected += sim.rain(iteration);
        sim.decay_velocity();
        sim.route_flow();
        sim.erode_and_deposit();
        sim.transport_sediment();
        sim.evaporate();
        sim.clamp();

        outcome.iterations_completed = iteration + 1;
        if let Some(ref mut obs) = observer {
            obs(iteration, sim.heights);
        }
    }

    outcome
}

struct Simulator<'a> {
    heights: &'a mut Grid<f32>,
    sea_level: f32,
    params: &'a ErosionParams,
    rng: ChaCha8Rng,

    water: Grid<f32>,
    sediment: Grid<f32>,
    vel_x: Grid<f32>,
    vel_y: Grid<f32>,

    /// Per-cell outflow to each of the 8 neighbors, this iteration.
    outflow: Vec<[f32; 8]>,
    /// Water volume each cell held when flow was routed.
    flow_water: Grid<f32>,
    /// Cells whose height changed this iteration (for the sea re-clamp).
    height_changed: Grid<bool>,
}

impl<'a> Simulator<'a> {
    fn new(heights: &'a mut Grid<f32>, sea_level: f32, params: &'a ErosionParams) -> Self {
        let w = heights.width;
        let h = heights.height;

        // Submerged cells start with water up to the sea surface.
        let mut water = Grid::new_with(w, h, 0.0f32);
        for y in 0..h {
            for x in 0..w {
                water.set(x, y, (sea_level - *heights.get(x, y)).max(0.0));
            }
        }

        Self {
            heights,
            sea_level,
            params,
            rng: ChaCha8Rng::seed_from_u64(params.seed),
            water,
            sediment: Grid::new_with(w, h, 0.0),
            vel_x: Grid::new_with(w, h, 0.0),
            vel_y: Grid::new_with(w, h, 0.0),
            outflow: vec![[0.0; 8]; w * h],
            flow_water: Grid::new_with(w, h, 0.0),
            height_changed: Grid::new_with(w, h, false),
        }
    }

    /// Inject rain per the configured mode; returns the injected volume.
    /// Draw order per iteration: probability first, then intensity.
    fn rain(&mut self, iteration: usize) -> f64 {
        let inject = match self.params.rain {
            RainMode::Once => iteration == 0,
            RainMode::EveryIteration => true,
            RainMode::Probabilistic(p) => self.rng.gen::<f32>() < p.clamp(0.0, 1.0),
        };
        if !inject {
            return 0.0;
        }

        let intensity = match self.params.rain_intensity {
            RainIntensity::Fixed(v) => v.max(0.0),
            RainIntensity::RandomUpTo(cap) => self.rng.gen_range(0.0..=cap.max(0.0)),
        };
        if intensity == 0.0 {
            return 0.0;
        }

        let scaling = self.params.altitude_rain_scaling.max(0.0);
        let mut total = 0.0f64;
        for y in 0..self.water.height {
            for x in 0..self.water.width {
                let amount = intensity * (1.0 + scaling * *self.heights.get(x, y));
                *self.water.get_mut(x, y) += amount;
                total += amount as f64;
            }
        }
        total
    }

    fn decay_velocity(&mut self) {
        let keep = 1.0 - self.params.velocity_decay.clamp(0.0, 1.0);
        for y in 0..self.vel_x.height {
            for x in 0..self.vel_x.width {
                *self.vel_x.get_mut(x, y) *= keep;
                *self.vel_y.get_mut(x, y) *= keep;
            }
        }
    }

    /// Route water downhill along positive height+water differentials.
    fn route_flow(&mut self) {
        let w = self.heights.width;
        let h = self.heights.height;
        let damping = self.params.flow_damping.clamp(0.0, 1.0);

        for cell in self.outflow.iter_mut() {
            *cell = [0.0; 8];
        }
        let mut water_delta = Grid::new_with(w, h, 0.0f32);

        for y in 0..h {
            for x in 0..w {
                let water = *self.water.get(x, y);
                self.flow_water.set(x, y, water);
                let height = *self.heights.get(x, y);
                if height < self.sea_level || water <= FLOW_THRESHOLD {
                    continue;
                }

                let level = height + water;
                let mut diffs = [0.0f32; 8];
                let mut total_diff = 0.0f32;
                for (i, &(dx, dy, weight)) in NEIGHBORS.iter().enumerate() {
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
                        continue;
                    }
                    let (nx, ny) = (nx as usize, ny as usize);
                    let neighbor_level = *self.heights.get(nx, ny) + *self.water.get(nx, ny);
                    let diff = (level - neighbor_level) * weight;
                    if diff > 0.0 {
                        diffs[i] = diff;
                        total_diff += diff;
                    }
                }
                if total_diff <= 0.0 {
                    continue;
                }

                // Never move more water than the cell holds.
                let out_total = (total_diff * 0.5).min(water) * damping;
                let mut vx = 0.0f32;
                let mut vy = 0.0f32;
                for (i, &(dx, dy, weight)) in NEIGHBORS.iter().enumerate() {
                    if diffs[i] <= 0.0 {
                        continue;
                    }
                    let amount = out_total * diffs[i] / total_diff;
                    let nx = (x as i64 + dx) as usize;
                    let ny = (y as i64 + dy) as usize;
                    self.outflow[y * w + x][i] = amount;
                    *water_delta.get_mut(nx, ny) += amount;
                    vx += dx as f32 * weight * amount;
                    vy += dy as f32 * weight * amount;
                }
                *water_delta.get_mut(x, y) -= out_total;
                *self.vel_x.get_mut(x, y) += vx;
                *self.vel_y.get_mut(x, y) += vy;
            }
        }

        for y in 0..h {
            for x in 0..w {
                let updated = *self.water.get(x, y) + *water_delta.get(x, y);
                self.water.set(x, y, updated.max(0.0));
            }
        }
    }

    /// Erode height into sediment up to capacity; return excess to height.
    fn erode_and_deposit(&mut self) {
        let w = self.heights.width;
        let h = self.heights.height;
        self.height_changed.fill(false);

        for y in 0..h {
            for x in 0..w {
                let height = *self.heights.get(x, y);
                if height < self.sea_level {
                    continue;
                }

                // Steepest descent to any neighbor, normalized and shaped.
                let mut max_drop = 0.0f32;
                for &(dx, dy, _) in NEIGHBORS.iter() {
                    let drop = height - *self.heights.get_clamped(x as i64 + dx, y as i64 + dy);
                    if drop > max_drop {
                        max_drop = drop;
                    }
                }
                let slope = max_drop
                    .clamp(0.0, 1.0)
                    .powf(self.params.slope_exponent.max(0.0));

                let vx = *self.vel_x.get(x, y);
                let vy = *self.vel_y.get(x, y);
                let vel_mag = (vx * vx + vy * vy).sqrt();

                let capacity = self.params.solubility * vel_mag * slope;
                let sediment = *self.sediment.get(x, y);

                if sediment < capacity {
                    // Erosion rate falls off in deep standing water.
                    let depth_damp =
                        1.0 / (1.0 + self.params.deep_water_dampening * *self.water.get(x, y));
                    let eroded = (self.params.abrasion * vel_mag * slope * depth_damp)
                        .min(capacity - sediment)
                        .min(height);
                    if eroded > 0.0 {
                        self.heights.set(x, y, height - eroded);
                        self.sediment.set(x, y, sediment + eroded);
                        self.height_changed.set(x, y, true);
                    }
                } else if sediment > capacity {
                    let excess = sediment - capacity;
                    self.heights.set(x, y, height + excess);
                    self.sediment.set(x, y, capacity);
                    self.height_changed.set(x, y, true);
                }
            }
        }
    }

    /// Move sediment with the water that left each cell this iteration.
    fn transport_sediment(&mut self) {
        let w = self.heights.width;
        let h = self.heights.height;
        let mut delta = Grid::new_with(w, h, 0.0f32);

        for y in 0..h {
            for x in 0..w {
                let flows = &self.outflow[y * w + x];
                let out_total: f32 = flows.iter().sum();
                if out_total <= 0.0 {
                    continue;
                }
                let available = *self.flow_water.get(x, y);
                if available <= 0.0 {
                    continue;
                }
                let sediment = *self.sediment.get(x, y);
                let moved = sediment * (out_total / available).min(1.0);
                if moved <= 0.0 {
                    continue;
                }

                for (i, &(dx, dy, _)) in NEIGHBORS.iter().enumerate() {
                    if flows[i] <= 0.0 {
                        continue;
                    }
                    let nx = (x as i64 + dx) as usize;
                    let ny = (y as i64 + dy) as usize;
                    *delta.get_mut(nx, ny) += moved * flows[i] / out_total;
                }
                *delta.get_mut(x, y) -= moved;
            }
        }

        for y in 0..h {
            for x in 0..w {
                let updated = *self.sediment.get(x, y) + *delta.get(x, y);
                self.sediment.set(x, y, updated.max(0.0));
            }
        }
    }

    fn evaporate(&mut self) {
        let keep = 1.0 - self.params.evaporation.clamp(0.0, 1.0);
        for y in 0..self.water.height {
            for x in 0..self.water.width {
                *self.water.get_mut(x, y) *= keep;
            }
        }
    }

    /// Keep heights in range; refill water where erosion pushed a cell
    /// below the sea surface this iteration.
    fn clamp(&mut self) {
        for y in 0..self.heights.height {
            for x in 0..self.heights.width {
                let height = self.heights.get(x, y).clamp(0.0, 1.0);
                self.heights.set(x, y, height);

                if *self.height_changed.get(x, y) && height < self.sea_level {
                    let minimum = self.sea_level - height;
                    if *self.water.get(x, y) < minimum {
                        self.water.set(x, y, minimum);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(width: usize, height: usize, level: f32) -> Grid<f32> {
        Grid::new_with(width, height, level)
    }

    fn no_rain_params(iterations: usize) -> ErosionParams {
        ErosionParams {
            iterations,
            rain: RainMode::Once,
            rain_intensity: RainIntensity::Fixed(0.0),
            ..ErosionParams::default()
        }
    }

    #[test]
    fn test_flat_land_with_no_rain_is_inert() {
        let mut heights = flat(12, 12, 0.8);
        let before = heights.clone();
        let outcome = erode(
            &mut heights,
            0.3,
            &no_rain_params(50),
            &CancelToken::new(),
            None,
        );
        assert_eq!(outcome.iterations_completed, 50);
        assert_eq!(outcome.rain_injected, 0.0);
        assert_eq!(heights, before);
    }

    #[test]
    fn test_submerged_flat_map_height_unchanged_one_iteration() {
        // RainMode::Once with zero intensity, entirely below sea level:
        // height must stay exact; water only evaporates.
        let mut heights = flat(8, 8, 0.2);
        let before = heights.clone();
        let params = no_rain_params(1);
        let outcome = erode(&mut heights, 0.6, &params, &CancelToken::new(), None);
        assert_eq!(outcome.iterations_completed, 1);
        assert_eq!(heights, before);
    }

    #[test]
    fn test_submerged_water_decays_only_by_evaporation() {
        let mut heights = flat(4, 4, 0.2);
        let params = no_rain_params(1);
        let mut sim = Simulator::new(&mut heights, 0.6, &params);
        let initial = *sim.water.get(2, 2);
        assert!((initial - 0.4).abs() < 1e-6);

        sim.decay_velocity();
        sim.route_flow();
        sim.erode_and_deposit();
        sim.transport_sediment();
        sim.evaporate();
        sim.clamp();

        let expected = initial * (1.0 - params.evaporation);
        assert!((*sim.water.get(2, 2) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_rain_on_slope_erodes_and_conserves_direction() {
        // A ramp with heavy rain should lose height somewhere uphill and
        // gain (or hold) downhill; total mass (height+sediment) may only
        // leave through the clamp.
        let mut heights = Grid::new_with(16, 16, 0.0f32);
        for y in 0..16 {
            for x in 0..16 {
                heights.set(x, y, 0.3 + x as f32 * 0.04);
            }
        }
        let before = heights.clone();
        let params = ErosionParams {
            iterations: 100,
            rain: RainMode::EveryIteration,
            rain_intensity: RainIntensity::Fixed(0.02),
            ..ErosionParams::default()
        };
        erode(&mut heights, 0.1, &params, &CancelToken::new(), None);
        assert_ne!(heights, before);

        let (min, max) = heights.min_max();
        assert!(min >= 0.0 && max <= 1.0);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let base = Grid::new_with(10, 10, 0.5f32);
        let params = ErosionParams {
            iterations: 40,
            rain: RainMode::Probabilistic(0.5),
            rain_intensity: RainIntensity::RandomUpTo(0.05),
            seed: 77,
            ..ErosionParams::default()
        };

        let mut a = base.clone();
        let mut b = base.clone();
        erode(&mut a, 0.3, &params, &CancelToken::new(), None);
        erode(&mut b, 0.3, &params, &CancelToken::new(), None);
        assert_eq!(a, b);
    }

    #[test]
    fn test_cancellation_truncates_run() {
        let mut heights = Grid::new_with(8, 8, 0.5f32);
        let params = ErosionParams {
            iterations: 100,
            ..ErosionParams::default()
        };
        let token = CancelToken::new();

        let mut seen = 0usize;
        let cancel_after = 5usize;
        let token_inner = token.clone();
        let mut observer = |iteration: usize, _heights: &Grid<f32>| {
            seen = iteration + 1;
            if iteration + 1 == cancel_after {
                token_inner.cancel();
            }
        };
        let outcome = erode(&mut heights, 0.3, &params, &token, Some(&mut observer));

        assert!(outcome.cancelled);
        assert_eq!(outcome.iterations_completed, cancel_after);
        assert_eq!(seen, cancel_after);
    }

    #[test]
    fn test_iteration_bound_is_enforced() {
        let mut heights = Grid::new_with(4, 4, 0.5f32);
        let params = ErosionParams {
            iterations: MAX_ITERATIONS + 500,
            rain: RainMode::Once,
            rain_intensity: RainIntensity::Fixed(0.0),
            ..ErosionParams::default()
        };
        let outcome = erode(&mut heights, 0.3, &params, &CancelToken::new(), None);
        assert_eq!(outcome.iterations_completed, MAX_ITERATIONS);
    }

    #[test]
    fn test_observer_sees_every_iteration() {
        let mut heights = Grid::new_with(6, 6, 0.7f32);
        let params = no_rain_params(7);
        let mut count = 0usize;
        let mut observer = |_: usize, grid: &Grid<f32>| {
            count += 1;
            assert_eq!(grid.width, 6);
        };
        erode(&mut heights, 0.2, &params, &CancelToken::new(), Some(&mut observer));
        assert_eq!(count, 7);
    }
}
