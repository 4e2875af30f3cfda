//! Octree construction from a voxel predicate

use std::time::Instant;

use glam::IVec3;
use rayon::prelude::*;

use super::node::{octant_offset, OctreeNode, OCTANT_COUNT};
use crate::voxel::predicate::VoxelPredicate;

/// Largest supported world edge; keeps every region inside `i32` coordinates.
pub const MAX_SIZE: u32 = 1 << 30;

/// Number of top levels built in parallel by default
pub const DEFAULT_PARALLEL_DEPTH: u32 = 2;

/// Occupancy class of a lattice region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionClass {
    /// No occupied cell
    Empty,
    /// Every cell occupied
    Solid,
    /// At least one occupied and one empty cell
    Mixed,
}

/// True if `origin + size` fits in `i32` on every axis.
pub fn region_in_range(origin: IVec3, size: u32) -> bool {
    let Ok(s) = i32::try_from(size) else {
        return false;
    };
    origin.to_array().iter().all(|c| c.checked_add(s).is_some())
}

/// Classify the cube `[origin, origin + size)³` by sampling every cell.
///
/// Stops as soon as both an occupied and an empty cell have been seen.
/// Panics if the region extends past `i32::MAX`.
pub fn classify_region<P: VoxelPredicate + ?Sized>(
    predicate: &P,
    origin: IVec3,
    size: u32,
) -> RegionClass {
    assert!(
        region_in_range(origin, size),
        "Region at {} of size {} exceeds i32 coordinates",
        origin,
        size
    );
    let s = size as i32;
    let mut any_occupied = false;
    let mut any_empty = false;

    for z in origin.z..origin.z + s {
        for y in origin.y..origin.y + s {
            for x in origin.x..origin.x + s {
                if predicate.occupied(IVec3::new(x, y, z)) {
                    any_occupied = true;
                } else {
                    any_empty = true;
                }
                if any_occupied && any_empty {
                    return RegionClass::Mixed;
                }
            }
        }
    }

    if any_occupied {
        RegionClass::Solid
    } else {
        RegionClass::Empty
    }
}

/// Builder for sparse voxel octrees over a cubic world `[0, size)³`.
///
/// Uniform regions collapse: empty ones to no node, solid ones to a single
/// leaf. Mixed regions subdivide down to unit cells, so the tree represents
/// the predicate exactly.
///
/// The 8 children of a node cover disjoint regions and are built as
/// independent rayon tasks for the first `parallel_depth` levels; deeper
/// levels run sequentially inside the task that owns them.
#[derive(Clone, Debug)]
pub struct OctreeBuilder {
    /// Cubic world size (power of 2)
    size: u32,
    /// Levels (from the root) whose children are built in parallel
    parallel_depth: u32,
}

impl OctreeBuilder {
    /// Create a new builder for a cubic world of given size
    /// Size must be power of 2
    pub fn new(size: u32) -> Self {
        assert!(size.is_power_of_two(), "Size must be power of 2");
        assert!(size <= MAX_SIZE, "Size must be at most 2^30");
        Self { size, parallel_depth: DEFAULT_PARALLEL_DEPTH }
    }

    /// Set how many top levels fork their children onto the thread pool.
    /// Zero builds the whole tree on the calling thread.
    pub fn with_parallel_depth(mut self, parallel_depth: u32) -> Self {
        self.parallel_depth = parallel_depth;
        self
    }

    /// World size
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Maximum tree depth (log2 of the world size)
    pub fn max_depth(&self) -> u32 {
        self.size.trailing_zeros()
    }

    pub fn parallel_depth(&self) -> u32 {
        self.parallel_depth
    }

    /// Build the whole world `[0, size)³`. Returns `None` for an empty world.
    pub fn build_world<P: VoxelPredicate + ?Sized>(&self, predicate: &P) -> Option<OctreeNode> {
        self.build(predicate, IVec3::ZERO, self.size)
    }

    /// Build the region `[origin, origin + size)³`.
    ///
    /// Returns `None` when the region is empty (or `size` is zero).
    /// Panics if `size` is neither zero nor a power of two, or if the region
    /// extends past `i32::MAX`.
    pub fn build<P: VoxelPredicate + ?Sized>(
        &self,
        predicate: &P,
        origin: IVec3,
        size: u32,
    ) -> Option<OctreeNode> {
        assert!(
            size == 0 || size.is_power_of_two(),
            "Region size must be power of 2, got {}",
            size
        );
        assert!(size <= MAX_SIZE, "Region size must be at most 2^30");
        assert!(
            region_in_range(origin, size),
            "Region at {} of size {} exceeds i32 coordinates",
            origin,
            size
        );

        let start = Instant::now();
        let root = self.build_node(predicate, origin, size, 0);

        if !log::log_enabled!(log::Level::Debug) {
            return root;
        }
        match &root {
            Some(node) => log::debug!(
                "Built octree for {}^3 region at {}: {} nodes, {} leaves, depth {} in {:.2}ms",
                size,
                origin,
                node.node_count(),
                node.leaf_count(),
                node.depth(),
                start.elapsed().as_secs_f64() * 1000.0
            ),
            None => log::debug!("Region {}^3 at {} is empty", size, origin),
        }

        root
    }

    /// Recursively build a node
    fn build_node<P: VoxelPredicate + ?Sized>(
        &self,
        predicate: &P,
        origin: IVec3,
        size: u32,
        depth: u32,
    ) -> Option<OctreeNode> {
        if size == 0 {
            return None;
        }

        match classify_region(predicate, origin, size) {
            RegionClass::Empty => return None,
            RegionClass::Solid => return Some(OctreeNode::leaf()),
            RegionClass::Mixed => {}
        }

        // A single cell is never mixed
        debug_assert!(size > 1);

        let half = size / 2;
        let mut children: [Option<Box<OctreeNode>>; OCTANT_COUNT] = Default::default();

        // Each task writes only its own slot
        let build_child = |(index, slot): (usize, &mut Option<Box<OctreeNode>>)| {
            *slot = self
                .build_node(predicate, origin + octant_offset(index, half), half, depth + 1)
                .map(Box::new);
        };

        if depth < self.parallel_depth {
            children.par_iter_mut().enumerate().for_each(build_child);
        } else {
            children.iter_mut().enumerate().for_each(build_child);
        }

        Some(OctreeNode::internal(children))
    }
}
