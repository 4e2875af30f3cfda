//! World configuration: size, shape and build parallelism

use std::path::Path;

use glam::IVec3;
use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::voxel::predicate::{Checkerboard, Sphere, Terrain, TiledSpheres, Uniform, VoxelPredicate};
use crate::voxel::svo::builder::{DEFAULT_PARALLEL_DEPTH, MAX_SIZE};

/// Default world edge length
pub const WORLD_SIZE: u32 = 32;

/// Procedural world shape
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorldShape {
    /// Single solid sphere
    Sphere { center: [i32; 3], radius: i32 },
    /// Sphere repeated every `period` cells on all axes
    TiledSpheres { period: i32, radius: i32 },
    /// Alternating occupied/empty cells
    Checkerboard,
    /// Noise height field
    Terrain { seed: u32, scale: f32, height: f32 },
    /// Every cell occupied
    Solid,
    /// No cell occupied
    Empty,
}

impl WorldShape {
    /// Shape by name with parameters fitted to a world of edge `size`.
    ///
    /// Names: `sphere`, `tiled`, `checkerboard`, `terrain`, `solid`, `empty`.
    pub fn from_name(name: &str, size: u32) -> Result<Self> {
        let s = size as i32;
        let shape = match name {
            "sphere" => {
                let r = (s / 2 - 1).max(1);
                WorldShape::Sphere { center: [r; 3], radius: r }
            }
            "tiled" => {
                let period = (s / 2).max(2);
                WorldShape::TiledSpheres { period, radius: period / 2 - 1 }
            }
            "checkerboard" => WorldShape::Checkerboard,
            "terrain" => WorldShape::Terrain {
                seed: 12345,
                scale: size as f32,
                height: size as f32 / 2.0,
            },
            "solid" => WorldShape::Solid,
            "empty" => WorldShape::Empty,
            other => return Err(Error::Config(format!("Unknown world shape '{}'", other))),
        };
        Ok(shape)
    }

    /// Create the occupancy predicate for this shape
    pub fn predicate(&self) -> Box<dyn VoxelPredicate> {
        match *self {
            WorldShape::Sphere { center, radius } => {
                Box::new(Sphere::new(IVec3::from_array(center), radius))
            }
            WorldShape::TiledSpheres { period, radius } => Box::new(TiledSpheres::new(period, radius)),
            WorldShape::Checkerboard => Box::new(Checkerboard),
            WorldShape::Terrain { seed, scale, height } => Box::new(Terrain::new(seed, scale, height)),
            WorldShape::Solid => Box::new(Uniform(true)),
            WorldShape::Empty => Box::new(Uniform(false)),
        }
    }
}

impl Default for WorldShape {
    fn default() -> Self {
        WorldShape::Sphere { center: [15; 3], radius: 15 }
    }
}

/// Configuration for one world build
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World edge length in cells (power of 2)
    pub size: u32,
    /// Occupancy shape
    pub shape: WorldShape,
    /// Tree levels whose octants are built in parallel
    pub parallel_depth: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            size: WORLD_SIZE,
            shape: WorldShape::default(),
            parallel_depth: DEFAULT_PARALLEL_DEPTH,
        }
    }
}

impl WorldConfig {
    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Occupancy predicate for the configured shape
    pub fn predicate(&self) -> Box<dyn VoxelPredicate> {
        self.shape.predicate()
    }

    /// Save as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Check the config before handing it to the builder, which panics on
    /// a bad size.
    pub fn validate(&self) -> Result<()> {
        if !self.size.is_power_of_two() {
            return Err(Error::Config(format!(
                "World size must be a nonzero power of 2, got {}",
                self.size
            )));
        }
        if self.size > MAX_SIZE {
            return Err(Error::Config(format!(
                "World size {} exceeds maximum {}",
                self.size, MAX_SIZE
            )));
        }

        match self.shape {
            WorldShape::TiledSpheres { period, .. } if period <= 0 => Err(Error::Config(format!(
                "Tile period must be positive, got {}",
                period
            ))),
            WorldShape::Terrain { scale, .. } if scale <= 0.0 => Err(Error::Config(format!(
                "Terrain scale must be positive, got {}",
                scale
            ))),
            _ => Ok(()),
        }
    }
}
