//! Build-time sparse voxel octree node

use glam::IVec3;

/// Number of children per node
pub const OCTANT_COUNT: usize = 8;

/// Octant index for a child offset: `dz*4 + dy*2 + dx`.
pub const fn octant_index(dx: u32, dy: u32, dz: u32) -> usize {
    (dz * 4 + dy * 2 + dx) as usize
}

/// Origin offset of child `index` within a parent whose children have edge `half`.
pub fn octant_offset(index: usize, half: u32) -> IVec3 {
    debug_assert!(index < OCTANT_COUNT);
    let h = half as i32;
    IVec3::new(
        if index & 1 != 0 { h } else { 0 },
        if index & 2 != 0 { h } else { 0 },
        if index & 4 != 0 { h } else { 0 },
    )
}

/// Owned octree node.
///
/// A node is either a leaf (fully occupied region, no children) or internal
/// with at least one present child. Fully empty regions have no node at all;
/// the parent stores `None` in that slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OctreeNode {
    /// Children in octant order, `None` for empty octants
    pub children: [Option<Box<OctreeNode>>; OCTANT_COUNT],
    /// True for fully occupied, non-subdivided regions
    pub is_leaf: bool,
}

impl OctreeNode {
    /// Create a leaf node
    pub fn leaf() -> Self {
        Self { children: Default::default(), is_leaf: true }
    }

    /// Create an internal node from its children
    pub fn internal(children: [Option<Box<OctreeNode>>; OCTANT_COUNT]) -> Self {
        debug_assert!(children.iter().any(Option::is_some), "internal node without children");
        Self { children, is_leaf: false }
    }

    /// Child at octant `index`, if present
    pub fn child(&self, index: usize) -> Option<&OctreeNode> {
        self.children[index].as_deref()
    }

    /// Count of present children
    pub fn child_count(&self) -> usize {
        self.children.iter().filter(|c| c.is_some()).count()
    }

    /// Total nodes in this subtree, including self
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().flatten().map(|c| c.node_count()).sum::<usize>()
    }

    /// Leaves in this subtree
    pub fn leaf_count(&self) -> usize {
        if self.is_leaf {
            return 1;
        }
        self.children.iter().flatten().map(|c| c.leaf_count()).sum()
    }

    /// Subtree depth; a lone leaf has depth 0
    pub fn depth(&self) -> u32 {
        self.children
            .iter()
            .flatten()
            .map(|c| c.depth() + 1)
            .max()
            .unwrap_or(0)
    }
}
