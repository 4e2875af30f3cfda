//! Sparsevox - sparse voxel octree construction for GPU ray marching
//!
//! A [`voxel::VoxelPredicate`] describes the world, [`voxel::OctreeBuilder`]
//! turns it into a tree that collapses uniform regions, and
//! [`voxel::svo::flatten`] linearizes that tree into fixed-size records ready
//! for a storage buffer.

pub mod core;
pub mod voxel;
pub mod world;
pub mod render;
