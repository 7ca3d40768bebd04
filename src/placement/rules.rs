//! Placement rule contracts and the built-in rule vocabulary.
//!
//! A `PlacementRule` is a predicate over a terrain-space position and the
//! world; rules AND together in a `CompositeRule`. A `RadiusRule` yields
//! the minimum spacing (in occupancy cells) required around a point, and
//! may vary spatially.

use crate::noise::{FractalField, NoiseSource};
use crate::world::WorldContext;

/// Predicate deciding whether a point may be placed at a position.
/// Positions are terrain-space fractional coordinates.
pub trait PlacementRule {
    fn allows(&self, x: f32, y: f32, world: &WorldContext) -> bool;
}

/// Spatially-varying minimum spacing between placed points.
pub trait RadiusRule {
    fn radius_at(&self, x: f32, y: f32, world: &WorldContext) -> f32;
}

/// Logical AND over a rule list. An empty list is always permissive.
#[derive(Default)]
pub struct CompositeRule {
    rules: Vec<Box<dyn PlacementRule>>,
}

impl CompositeRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, rule: impl PlacementRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn push(&mut self, rule: Box<dyn PlacementRule>) {
        self.rules.push(rule);
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl PlacementRule for CompositeRule {
    fn allows(&self, x: f32, y: f32, world: &WorldContext) -> bool {
        self.rules.iter().all(|rule| rule.allows(x, y, world))
    }
}

/// Height above sea level within `[min, max]`.
pub struct AltitudeBand {
    pub min: f32,
    pub max: f32,
}

impl PlacementRule for AltitudeBand {
    fn allows(&self, x: f32, y: f32, world: &WorldContext) -> bool {
        let above = world.height_at(x, y) - world.sea_level();
        above >= self.min && above <= self.max
    }
}

/// Slope magnitude within `[min, max]`.
pub struct SlopeBand {
    pub min: f32,
    pub max: f32,
}

impl PlacementRule for SlopeBand {
    fn allows(&self, x: f32, y: f32, world: &WorldContext) -> bool {
        let slope = world.slope_at(x, y);
        slope >= self.min && slope <= self.max
    }
}

/// Moisture within `[min, max]` (0 where the world has no moisture field).
pub struct MoistureBand {
    pub min: f32,
    pub max: f32,
}

impl PlacementRule for MoistureBand {
    fn allows(&self, x: f32, y: f32, world: &WorldContext) -> bool {
        let moisture = world.moisture_at(x, y);
        moisture >= self.min && moisture <= self.max
    }
}

/// Passes where a noise field (remapped to `[0,1]`) clears a threshold.
/// Useful for breaking layers into organic patches.
pub struct NoiseThreshold<S: NoiseSource> {
    pub field: FractalField<S>,
    pub threshold: f32,
}

impl<S: NoiseSource> PlacementRule for NoiseThreshold<S> {
    fn allows(&self, x: f32, y: f32, world: &WorldContext) -> bool {
        let _ = world;
        let params = self.field.params();
        let sx = x as f64 * params.frequency + params.offset.0;
        let sy = y as f64 * params.frequency + params.offset.1;
        let v = (self.field.octave_sum(sx, sy) + 1.0) * 0.5;
        v as f32 >= self.threshold
    }
}

/// Rejects positions within `radius` (terrain cells) of any occupied cell
/// in the named layer. Unknown layer ids are treated as empty layers.
pub struct LayerClearance {
    pub layer_id: String,
    pub radius: f32,
}

impl PlacementRule for LayerClearance {
    fn allows(&self, x: f32, y: f32, world: &WorldContext) -> bool {
        let layer = match world.layer(&self.layer_id) {
            Some(layer) => layer,
            None => return true,
        };
        let cells = &layer.cells;
        if cells.is_empty() || world.width() == 0 {
            return true;
        }

        // Layer grids may be scaled relative to the terrain.
        let scale = cells.width as f32 / world.width() as f32;
        let lx = x * scale;
        let ly = y * scale;
        let radius = self.radius * scale;
        let reach = radius.ceil() as i64;

        let cx = lx.floor() as i64;
        let cy = ly.floor() as i64;
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let nx = cx + dx;
                let ny = cy + dy;
                if nx < 0 || ny < 0 || nx >= cells.width as i64 || ny >= cells.height as i64 {
                    continue;
                }
                if !*cells.get(nx as usize, ny as usize) {
                    continue;
                }
                let dist_x = nx as f32 + 0.5 - lx;
                let dist_y = ny as f32 + 0.5 - ly;
                if (dist_x * dist_x + dist_y * dist_y).sqrt() <= radius {
                    return false;
                }
            }
        }
        true
    }
}

/// Passes only when some cell within `radius` (terrain cells) is below sea
/// level.
pub struct WaterProximity {
    pub radius: f32,
}

impl PlacementRule for WaterProximity {
    fn allows(&self, x: f32, y: f32, world: &WorldContext) -> bool {
        let reach = self.radius.ceil() as i64;
        let cx = x.floor() as i64;
        let cy = y.floor() as i64;
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let nx = cx + dx;
                let ny = cy + dy;
                if nx < 0 || ny < 0 || nx >= world.width() as i64 || ny >= world.height() as i64 {
                    continue;
                }
                let dist = ((dx * dx + dy * dy) as f32).sqrt();
                if dist > self.radius {
                    continue;
                }
                if world.is_underwater(nx as f32, ny as f32) {
                    return true;
                }
            }
        }
        false
    }
}

/// Fixed spacing everywhere.
pub struct ConstantRadius(pub f32);

impl RadiusRule for ConstantRadius {
    fn radius_at(&self, _x: f32, _y: f32, _world: &WorldContext) -> f32 {
        self.0
    }
}

/// Spacing graded by moisture: `near` where moisture is 1 (at water),
/// `far` where it is 0. Denser growth near water when `near < far`.
pub struct MoistureGradedRadius {
    pub near: f32,
    pub far: f32,
}

impl RadiusRule for MoistureGradedRadius {
    fn radius_at(&self, x: f32, y: f32, world: &WorldContext) -> f32 {
        let moisture = world.moisture_at(x, y).clamp(0.0, 1.0);
        self.far + (self.near - self.far) * moisture
    }
}
