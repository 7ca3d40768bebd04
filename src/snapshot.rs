//! Serialized world snapshots.
//!
//! Flattened row-major buffers plus dimensions, suitable for an external
//! persistence collaborator. The generation-configuration blob travels as
//! opaque JSON; the core never interprets it. Round-trips are exact.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::grid::Grid;
use crate::terrain::TerrainState;
use crate::world::{OccupancyLayer, WorldContext};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerSnapshot {
    pub id: String,
    /// Optional human-facing name, kept distinct from the id.
    #[serde(default)]
    pub name: Option<String>,
    pub cells: Vec<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub width: usize,
    pub height: usize,
    pub sea_level: f32,
    /// Row-major heights, `width * height` entries.
    pub heights: Vec<f32>,
    pub layer_width: usize,
    pub layer_height: usize,
    pub layers: Vec<LayerSnapshot>,
    /// Opaque generation configuration, passed through untouched.
    #[serde(default)]
    pub config: serde_json::Value,
}

impl WorldSnapshot {
    /// Capture a context into its flattened form.
    pub fn capture(world: &WorldContext, config: serde_json::Value) -> Self {
        let heights = world.terrain().heights();
        let (layer_width, layer_height) = world
            .layers()
            .first()
            .map(|l| (l.cells.width, l.cells.height))
            .unwrap_or((0, 0));

        Self {
            width: heights.width,
            height: heights.height,
            sea_level: world.sea_level(),
            heights: heights.as_slice().to_vec(),
            layer_width,
            layer_height,
            layers: world
                .layers()
                .iter()
                .map(|layer| LayerSnapshot {
                    id: layer.id.clone(),
                    name: layer.name.clone(),
                    cells: layer.cells.as_slice().to_vec(),
                })
                .collect(),
            config,
        }
    }

    /// Reconstruct a context. Buffer lengths are validated against the
    /// stated dimensions; a mismatch is a configuration error.
    pub fn restore(&self) -> Result<WorldContext, ConfigError> {
        let heights = Grid::from_vec(self.width, self.height, self.heights.clone()).ok_or(
            ConfigError::SnapshotLengthMismatch {
                expected: self.width * self.height,
                found: self.heights.len(),
            },
        )?;

        let mut world = WorldContext::new(TerrainState::new(heights), self.sea_level);
        for layer in &self.layers {
            let cells = Grid::from_vec(self.layer_width, self.layer_height, layer.cells.clone())
                .ok_or(ConfigError::SnapshotLengthMismatch {
                    expected: self.layer_width * self.layer_height,
                    found: layer.cells.len(),
                })?;
            let mut restored = OccupancyLayer::new(layer.id.clone(), cells);
            restored.name = layer.name.clone();
            world.insert_layer(restored)?;
        }
        Ok(world)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_world() -> WorldContext {
        let mut heights = Grid::new_with(6, 4, 0.0f32);
        for y in 0..4 {
            for x in 0..6 {
                heights.set(x, y, (x * 4 + y) as f32 / 24.0);
            }
        }
        let mut world = WorldContext::new(TerrainState::new(heights), 0.35);

        let mut trees = Grid::new(6, 4);
        trees.set(1, 1, true);
        trees.set(4, 2, true);
        world
            .insert_layer(OccupancyLayer::new("trees", trees))
            .unwrap();
        world
    }

    #[test]
    fn test_round_trip_is_exact() {
        let world = sample_world();
        let config = serde_json::json!({"generator": "fbm", "seed": 42});
        let snapshot = WorldSnapshot::capture(&world, config.clone());

        let json = snapshot.to_json().unwrap();
        let parsed = WorldSnapshot::from_json(&json).unwrap();
        assert_eq!(parsed, snapshot);

        let restored = parsed.restore().unwrap();
        assert_eq!(restored.terrain().heights(), world.terrain().heights());
        assert_eq!(restored.sea_level(), world.sea_level());
        assert_eq!(
            restored.layer("trees").unwrap().cells,
            world.layer("trees").unwrap().cells
        );
        assert_eq!(parsed.config, config);
    }

    #[test]
    fn test_layer_display_name_survives_round_trip() {
        let mut world = sample_world();
        let rocks = OccupancyLayer::new("rocks", Grid::new(6, 4)).with_name("Mossy rocks");
        world.insert_layer(rocks).unwrap();

        let snapshot = WorldSnapshot::capture(&world, serde_json::Value::Null);
        let restored = WorldSnapshot::from_json(&snapshot.to_json().unwrap())
            .unwrap()
            .restore()
            .unwrap();

        assert_eq!(restored.layer("rocks").unwrap().display_name(), "Mossy rocks");
        // A layer without a display name keeps falling back to its id.
        assert_eq!(restored.layer("trees").unwrap().display_name(), "trees");
    }

    #[test]
    fn test_config_blob_is_opaque_passthrough() {
        let world = sample_world();
        let config = serde_json::json!({"anything": [1, 2, {"nested": true}]});
        let snapshot = WorldSnapshot::capture(&world, config.clone());
        let again = WorldSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(again.config, config);
    }

    #[test]
    fn test_bad_height_length_is_rejected() {
        let world = sample_world();
        let mut snapshot = WorldSnapshot::capture(&world, serde_json::Value::Null);
        snapshot.heights.pop();
        let err = snapshot.restore().unwrap_err();
        assert_eq!(
            err,
            ConfigError::SnapshotLengthMismatch {
                expected: 24,
                found: 23,
            }
        );
    }

    #[test]
    fn test_bad_layer_length_is_rejected() {
        let world = sample_world();
        let mut snapshot = WorldSnapshot::capture(&world, serde_json::Value::Null);
        snapshot.layers[0].cells.push(true);
        assert!(snapshot.restore().is_err());
    }
}
