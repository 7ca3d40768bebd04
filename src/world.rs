//! World context: the read-only facade rules and algorithms consume.

use crate::error::ConfigError;
use crate::grid::Grid;
use crate::terrain::TerrainState;

/// A named boolean occupancy layer (trees, rocks, ...).
#[derive(Clone, Debug)]
pub struct OccupancyLayer {
    /// Stable identifier used by rules and snapshots.
    pub id: String,
    /// Optional human-facing name; falls back to the id.
    pub name: Option<String>,
    pub cells: Grid<bool>,
}

impl OccupancyLayer {
    pub fn new(id: impl Into<String>, cells: Grid<bool>) -> Self {
        Self {
            id: id.into(),
            name: None,
            cells,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Read-only world state handed to placement rules and adapters.
///
/// Owns the terrain, the sea level, zero or more occupancy layers (all of
/// identical dimensions, enforced at insertion), and an optional moisture
/// field. It owns no generation algorithm; generators receive it.
#[derive(Clone, Debug)]
pub struct WorldContext {
    terrain: TerrainState,
    sea_level: f32,
    layers: Vec<OccupancyLayer>,
    moisture: Option<Grid<f32>>,
}

impl WorldContext {
    pub fn new(terrain: TerrainState, sea_level: f32) -> Self {
        Self {
            terrain,
            sea_level: sea_level.clamp(0.0, 1.0),
            layers: Vec::new(),
            moisture: None,
        }
    }

    pub fn terrain(&self) -> &TerrainState {
        &self.terrain
    }

    pub fn terrain_mut(&mut self) -> &mut TerrainState {
        &mut self.terrain
    }

    pub fn sea_level(&self) -> f32 {
        self.sea_level
    }

    pub fn width(&self) -> usize {
        self.terrain.heights().width
    }

    pub fn height(&self) -> usize {
        self.terrain.heights().height
    }

    /// Terrain height sampled at a fractional position.
    pub fn height_at(&self, x: f32, y: f32) -> f32 {
        self.terrain.heights().sample_bilinear(x, y)
    }

    /// Slope magnitude sampled at a fractional position (as of the last
    /// slope refresh).
    pub fn slope_at(&self, x: f32, y: f32) -> f32 {
        self.terrain.slope().sample_bilinear(x, y)
    }

    pub fn is_underwater(&self, x: f32, y: f32) -> bool {
        self.height_at(x, y) < self.sea_level
    }

    pub fn layers(&self) -> &[OccupancyLayer] {
        &self.layers
    }

    pub fn layer(&self, id: &str) -> Option<&OccupancyLayer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Insert a layer. All layers in one context must share dimensions;
    /// a mismatch is reported, never silently resized.
    pub fn insert_layer(&mut self, layer: OccupancyLayer) -> Result<(), ConfigError> {
        if let Some(first) = self.layers.first() {
            let expected = (first.cells.width, first.cells.height);
            let found = (layer.cells.width, layer.cells.height);
            if expected != found {
                return Err(ConfigError::LayerDimensionMismatch { expected, found });
            }
        }
        if self.layers.iter().any(|l| l.id == layer.id) {
            return Err(ConfigError::DuplicateLayerId(layer.id));
        }
        self.layers.push(layer);
        Ok(())
    }

    pub fn remove_layer(&mut self, id: &str) -> Option<OccupancyLayer> {
        let idx = self.layers.iter().position(|l| l.id == id)?;
        Some(self.layers.remove(idx))
    }

    pub fn moisture(&self) -> Option<&Grid<f32>> {
        self.moisture.as_ref()
    }

    pub fn set_moisture(&mut self, moisture: Grid<f32>) {
        self.moisture = Some(moisture);
    }

    /// Moisture at a fractional position; 0 when no moisture field exists.
    pub fn moisture_at(&self, x: f32, y: f32) -> f32 {
        self.moisture
            .as_ref()
            .map(|m| m.sample_bilinear(x, y))
            .unwrap_or(0.0)
    }

    /// Derive a moisture field from proximity to water: 1 at or below sea
    /// level, decaying linearly to 0 at `reach` cells from the nearest
    /// water cell. Multi-source BFS over the 4-neighborhood.
    pub fn derive_moisture(&mut self, reach: usize) {
        let w = self.width();
        let h = self.height();
        let reach = reach.max(1);
        let heights = self.terrain.heights();

        let mut distance = Grid::new_with(w, h, usize::MAX);
        let mut queue = std::collections::VecDeque::new();
        for y in 0..h {
            for x in 0..w {
                if *heights.get(x, y) < self.sea_level {
                    distance.set(x, y, 0);
                    queue.push_back((x, y));
                }
            }
        }

        while let Some((x, y)) = queue.pop_front() {
            let d = *distance.get(x, y);
            if d >= reach {
                continue;
            }
            let neighbors = [
                (x.wrapping_sub(1), y),
                (x + 1, y),
                (x, y.wrapping_sub(1)),
                (x, y + 1),
            ];
            for (nx, ny) in neighbors {
                if nx < w && ny < h && *distance.get(nx, ny) > d + 1 {
                    distance.set(nx, ny, d + 1);
                    queue.push_back((nx, ny));
                }
            }
        }

        let mut moisture = Grid::new_with(w, h, 0.0f32);
        for y in 0..h {
            for x in 0..w {
                let d = *distance.get(x, y);
                let value = if d == usize::MAX {
                    0.0
                } else {
                    1.0 - d as f32 / reach as f32
                };
                moisture.set(x, y, value.max(0.0));
            }
        }
        self.moisture = Some(moisture);
    }
}
