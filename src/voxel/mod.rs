//! Voxel occupancy and octree data structures

pub mod predicate;
pub mod svo;

pub use predicate::{VoxelPredicate, Sphere, TiledSpheres, Checkerboard, Uniform, Terrain, DenseGrid};
pub use svo::{OctreeBuilder, OctreeNode, FlatNode, FlatOctree};
