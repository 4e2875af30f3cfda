//! Flat, GPU-facing octree records and pre-order linearization

use bytemuck::{Pod, Zeroable};
use glam::IVec3;

use super::node::{octant_offset, OctreeNode, OCTANT_COUNT};

/// Child index sentinel for an absent octant
pub const NO_CHILD: i32 = -1;

/// Byte stride of a [`FlatNode`] in the storage buffer
pub const FLAT_NODE_STRIDE: usize = 48;

/// Flattened octree node - exactly 48 bytes, 16-byte aligned
///
/// Layout (matches the shader's storage buffer struct):
/// - child_indices (32 bytes): 8 x i32, index into the node array or -1
/// - leaf (4 bytes): nonzero for a fully occupied leaf
/// - padding (12 bytes): pad to a 16-byte multiple
#[repr(C, align(16))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct FlatNode {
    /// Child index per octant (`dz*4 + dy*2 + dx`), [`NO_CHILD`] if absent
    pub child_indices: [i32; OCTANT_COUNT],
    /// 1 for leaves, 0 for internal nodes
    pub leaf: u32,
    _padding: [u32; 3],
}

impl FlatNode {
    /// Internal node with no children; used as the reserved placeholder
    pub const EMPTY: Self = Self {
        child_indices: [NO_CHILD; OCTANT_COUNT],
        leaf: 0,
        _padding: [0; 3],
    };

    /// Leaf record
    pub const LEAF: Self = Self {
        child_indices: [NO_CHILD; OCTANT_COUNT],
        leaf: 1,
        _padding: [0; 3],
    };

    pub const fn new(child_indices: [i32; OCTANT_COUNT], is_leaf: bool) -> Self {
        Self {
            child_indices,
            leaf: is_leaf as u32,
            _padding: [0; 3],
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.leaf != 0
    }

    /// Index of child at octant `index`, if present. Any negative index
    /// counts as absent.
    pub fn child(&self, index: usize) -> Option<usize> {
        usize::try_from(self.child_indices[index]).ok()
    }
}

impl Default for FlatNode {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Linearize a tree into pre-order records. The root, if any, lands at index 0.
///
/// Each node reserves its slot before its children are visited, so every
/// child index is greater than its parent's.
pub fn flatten(root: Option<&OctreeNode>) -> Vec<FlatNode> {
    let Some(root) = root else {
        return Vec::new();
    };

    let mut flat = Vec::with_capacity(root.node_count());
    flatten_node(root, &mut flat);
    flat
}

fn flatten_node(node: &OctreeNode, flat: &mut Vec<FlatNode>) -> i32 {
    let index = flat.len();
    flat.push(FlatNode::EMPTY); // placeholder

    let mut child_indices = [NO_CHILD; OCTANT_COUNT];
    for (slot, child) in child_indices.iter_mut().zip(node.children.iter()) {
        if let Some(child) = child {
            *slot = flatten_node(child, flat);
        }
    }

    flat[index] = FlatNode::new(child_indices, node.is_leaf);
    to_index(index)
}

fn to_index(index: usize) -> i32 {
    i32::try_from(index).unwrap_or_else(|_| panic!("Octree exceeds {} nodes", i32::MAX))
}

/// Summary of a flattened octree
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlatStats {
    pub node_count: usize,
    pub leaf_count: usize,
    pub internal_count: usize,
    pub byte_size: usize,
}

/// Flattened octree over a cubic world `[0, size)³`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlatOctree {
    nodes: Vec<FlatNode>,
    size: u32,
}

impl FlatOctree {
    /// Flatten a built tree for a world of edge `size`
    pub fn from_tree(root: Option<&OctreeNode>, size: u32) -> Self {
        let start = std::time::Instant::now();
        let nodes = flatten(root);
        log::debug!(
            "Flattened octree: {} nodes ({} bytes) in {:.2}ms",
            nodes.len(),
            nodes.len() * FLAT_NODE_STRIDE,
            start.elapsed().as_secs_f64() * 1000.0
        );
        Self { nodes, size }
    }

    pub fn nodes(&self) -> &[FlatNode] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<FlatNode> {
        self.nodes
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True for an empty world
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Raw bytes for upload, `len() * FLAT_NODE_STRIDE` long
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.nodes)
    }

    /// Occupancy at `pos`, found by descending child indices from the root.
    /// Positions outside the world are empty.
    pub fn is_occupied(&self, pos: IVec3) -> bool {
        let s = self.size as i64;
        let (x, y, z) = (pos.x as i64, pos.y as i64, pos.z as i64);
        if self.nodes.is_empty() || x < 0 || y < 0 || z < 0 || x >= s || y >= s || z >= s {
            return false;
        }

        let mut index = 0;
        let mut origin = IVec3::ZERO;
        let mut size = self.size;
        loop {
            let Some(node) = self.nodes.get(index) else {
                return false;
            };
            if node.is_leaf() {
                return true;
            }
            let half = size / 2;
            if half == 0 {
                return false;
            }

            let local = pos - origin;
            let h = half as i32;
            let octant = (local.z >= h) as usize * 4 + (local.y >= h) as usize * 2 + (local.x >= h) as usize;
            match node.child(octant) {
                Some(child) => {
                    index = child;
                    origin += octant_offset(octant, half);
                    size = half;
                }
                None => return false,
            }
        }
    }

    pub fn stats(&self) -> FlatStats {
        let leaf_count = self.nodes.iter().filter(|n| n.is_leaf()).count();
        FlatStats {
            node_count: self.nodes.len(),
            leaf_count,
            internal_count: self.nodes.len() - leaf_count,
            byte_size: self.nodes.len() * FLAT_NODE_STRIDE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::predicate::{Checkerboard, Sphere, TiledSpheres, Uniform, VoxelPredicate};
    use crate::voxel::svo::OctreeBuilder;

    fn build_flat<P: VoxelPredicate>(predicate: &P, size: u32) -> FlatOctree {
        let root = OctreeBuilder::new(size).build_world(predicate);
        FlatOctree::from_tree(root.as_ref(), size)
    }

    /// Monotonic indices, no dangling references, childless leaves
    fn assert_invariants(nodes: &[FlatNode]) {
        for (i, node) in nodes.iter().enumerate() {
            if node.is_leaf() {
                assert_eq!(node.child_indices, [NO_CHILD; 8], "leaf {} has children", i);
            }
            for &child in &node.child_indices {
                if child == NO_CHILD {
                    continue;
                }
                assert!(child >= 0, "node {} has negative child {}", i, child);
                assert!((child as usize) < nodes.len(), "node {} child {} dangles", i, child);
                assert!(child as usize > i, "node {} child {} not after parent", i, child);
            }
        }
    }

    #[test]
    fn test_size_and_alignment() {
        assert_eq!(std::mem::size_of::<FlatNode>(), FLAT_NODE_STRIDE);
        assert_eq!(std::mem::align_of::<FlatNode>(), 16);
    }

    #[test]
    fn test_byte_layout() {
        let mut indices = [NO_CHILD; 8];
        indices[0] = 1;
        indices[7] = 0x0102_0304;
        let node = FlatNode::new(indices, true);
        let bytes = bytemuck::bytes_of(&node);

        assert_eq!(&bytes[0..4], &1i32.to_le_bytes());
        assert_eq!(&bytes[4..8], &(-1i32).to_le_bytes());
        assert_eq!(&bytes[28..32], &0x0102_0304i32.to_le_bytes());
        assert_eq!(&bytes[32..36], &1u32.to_le_bytes());
        assert!(bytes[36..48].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_flatten_empty_world() {
        assert!(flatten(None).is_empty());

        let flat = build_flat(&Uniform(false), 2);
        assert!(flat.is_empty());
        assert!(flat.as_bytes().is_empty());
        assert!(!flat.is_occupied(IVec3::ZERO));
    }

    #[test]
    fn test_flatten_solid_world() {
        let flat = build_flat(&Uniform(true), 2);
        assert_eq!(flat.nodes(), &[FlatNode::LEAF]);
        assert!(flat.nodes()[0].is_leaf());
    }

    #[test]
    fn test_flatten_single_voxel() {
        let flat = build_flat(&|pos: IVec3| pos == IVec3::ZERO, 2);

        assert_eq!(flat.len(), 2);
        assert_eq!(flat.nodes()[0].child_indices, [1, -1, -1, -1, -1, -1, -1, -1]);
        assert!(!flat.nodes()[0].is_leaf());
        assert_eq!(flat.nodes()[1], FlatNode::LEAF);
    }

    #[test]
    fn test_flatten_checkerboard() {
        let flat = build_flat(&Checkerboard, 4);
        let stats = flat.stats();

        assert_eq!(stats.node_count, 41);
        assert_eq!(stats.internal_count, 9);
        assert_eq!(stats.leaf_count, 32);
        assert_eq!(stats.byte_size, 41 * 48);
        assert_invariants(flat.nodes());
    }

    #[test]
    fn test_preorder_layout() {
        // Octant 0 is a subtree, octant 7 a leaf: octant 0 descendants come first
        let predicate = |pos: IVec3| pos == IVec3::ZERO || pos.cmpge(IVec3::splat(2)).all();
        let flat = build_flat(&predicate, 4);
        let nodes = flat.nodes();

        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes[0].child_indices, [1, -1, -1, -1, -1, -1, -1, 3]);
        assert_eq!(nodes[1].child_indices, [2, -1, -1, -1, -1, -1, -1, -1]);
        assert_eq!(nodes[2], FlatNode::LEAF);
        assert_eq!(nodes[3], FlatNode::LEAF);
    }

    #[test]
    fn test_exactness_and_invariants() {
        let predicates: Vec<Box<dyn VoxelPredicate>> = vec![
            Box::new(Sphere::reference()),
            Box::new(TiledSpheres::new(8, 3)),
            Box::new(Checkerboard),
            Box::new(|pos: IVec3| pos.x + pos.y > pos.z * 2),
        ];

        for predicate in &predicates {
            let root = OctreeBuilder::new(32).build_world(predicate.as_ref());
            let flat = FlatOctree::from_tree(root.as_ref(), 32);
            assert_invariants(flat.nodes());

            for z in 0..32 {
                for y in 0..32 {
                    for x in 0..32 {
                        let pos = IVec3::new(x, y, z);
                        assert_eq!(flat.is_occupied(pos), predicate.occupied(pos), "Mismatch at {}", pos);
                    }
                }
            }
        }
    }

    #[test]
    fn test_negative_child_index_is_absent() {
        let mut indices = [NO_CHILD; 8];
        indices[0] = -2;
        indices[1] = i32::MIN;
        indices[2] = 1;
        let node = FlatNode::new(indices, false);

        assert_eq!(node.child(0), None);
        assert_eq!(node.child(1), None);
        assert_eq!(node.child(2), Some(1));
        assert_eq!(node.child(3), None);
    }

    #[test]
    fn test_malformed_indices_do_not_panic() {
        let mut indices = [NO_CHILD; 8];
        indices[0] = -2;
        indices[1] = 99;
        let flat = FlatOctree {
            nodes: vec![FlatNode::new(indices, false)],
            size: 2,
        };

        assert!(!flat.is_occupied(IVec3::ZERO));
        assert!(!flat.is_occupied(IVec3::X));
    }

    #[test]
    fn test_outside_world_is_empty() {
        let flat = build_flat(&Uniform(true), 4);
        assert!(flat.is_occupied(IVec3::splat(3)));
        assert!(!flat.is_occupied(IVec3::new(4, 0, 0)));
        assert!(!flat.is_occupied(IVec3::new(0, -1, 0)));
    }

    #[test]
    fn test_flatten_idempotent() {
        let root = OctreeBuilder::new(32).build_world(&Sphere::reference());
        let a = flatten(root.as_ref());
        let b = flatten(root.as_ref());
        assert_eq!(bytemuck::cast_slice::<FlatNode, u8>(&a), bytemuck::cast_slice::<FlatNode, u8>(&b));
        assert_eq!(a.len(), root.map_or(0, |r| r.node_count()));
    }
}
