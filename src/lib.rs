//! Island map generation library: heightmap synthesis, erosion, radial
//! shaping and rule-driven point placement.

pub mod cancel;
pub mod diamond_square;
pub mod erosion;
pub mod error;
pub mod export;
pub mod grid;
pub mod island;
pub mod noise;
pub mod placement;
pub mod seeds;
pub mod snapshot;
pub mod terrain;
pub mod world;

pub use cancel::CancelToken;
pub use error::ConfigError;
pub use grid::Grid;
pub use terrain::TerrainState;
pub use world::{OccupancyLayer, WorldContext};
