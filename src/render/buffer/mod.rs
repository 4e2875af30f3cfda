//! GPU buffer management

pub mod octree_buffer;

pub use octree_buffer::{OctreeBuffer, OCTREE_NODES_BINDING, upload_records, checked_upload_size};
