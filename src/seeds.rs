//! Seed management for map generation.
//!
//! Each generation stage gets its own seed, derived from a master seed by
//! default, so one stage can be varied while the others stay frozen.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Seeds for every generation stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapSeeds {
    /// Master seed (used for display/reference)
    pub master: u64,
    /// Base heightmap synthesis (noise or diamond-square)
    pub heightmap: u64,
    /// Island falloff feature points
    pub island: u64,
    /// Hydraulic erosion rain draws
    pub erosion: u64,
    /// Point placement scatter
    pub placement: u64,
}

impl MapSeeds {
    /// Derive all stage seeds deterministically from a master seed.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            heightmap: derive_seed(master, "heightmap"),
            island: derive_seed(master, "island"),
            erosion: derive_seed(master, "erosion"),
            placement: derive_seed(master, "placement"),
        }
    }
}

fn derive_seed(master: u64, stage: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    master.hash(&mut hasher);
    stage.hash(&mut hasher);
    hasher.finish()
}
