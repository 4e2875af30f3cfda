//! World generation: predicate → octree → flat node buffer

pub mod config;

pub use config::{WorldConfig, WorldShape, WORLD_SIZE};

use crate::core::Result;
use crate::voxel::predicate::Sphere;
use crate::voxel::svo::{FlatNode, FlatOctree, OctreeBuilder};

/// Build and flatten the world described by `config`.
///
/// The intermediate pointer tree is dropped once flattened.
pub fn generate(config: &WorldConfig) -> Result<FlatOctree> {
    config.validate()?;

    let start = std::time::Instant::now();
    let predicate = config.predicate();
    let builder = OctreeBuilder::new(config.size).with_parallel_depth(config.parallel_depth);
    let root = builder.build_world(predicate.as_ref());
    let flat = FlatOctree::from_tree(root.as_ref(), config.size);

    if flat.is_empty() {
        log::warn!("World {:?} ({}^3) is empty", config.shape, config.size);
    }
    log::info!(
        "Generated {}^3 world: {} nodes ({} KB) in {:.1}ms",
        config.size,
        flat.len(),
        flat.as_bytes().len() / 1024,
        start.elapsed().as_secs_f64() * 1000.0
    );

    Ok(flat)
}

/// Flat nodes of the reference world: a radius-15 sphere in a 32³ world.
pub fn get_voxels() -> Vec<FlatNode> {
    let root = OctreeBuilder::new(WORLD_SIZE).build_world(&Sphere::reference());
    FlatOctree::from_tree(root.as_ref(), WORLD_SIZE).into_nodes()
}
