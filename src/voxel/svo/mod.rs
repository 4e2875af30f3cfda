//! Sparse Voxel Octree construction and linearization

pub mod node;
pub mod builder;
pub mod flat;

pub use node::{OctreeNode, OCTANT_COUNT, octant_index, octant_offset};
pub use builder::{OctreeBuilder, RegionClass, classify_region};
pub use flat::{FlatNode, FlatOctree, FlatStats, FLAT_NODE_STRIDE, NO_CHILD, flatten};
