//! GPU storage buffer for flattened octree nodes

use wgpu::util::DeviceExt;

use crate::core::{Error, Result};
use crate::voxel::svo::{FlatNode, FLAT_NODE_STRIDE};

/// Binding index of the node buffer in the ray-march shader
pub const OCTREE_NODES_BINDING: u32 = 0;

/// Bound in place of an empty world; storage bindings cannot be zero-sized.
static EMPTY_WORLD: [FlatNode; 1] = [FlatNode::EMPTY];

/// Records to upload for `nodes`: the nodes themselves, or a single empty
/// internal node when the world is empty.
pub fn upload_records(nodes: &[FlatNode]) -> &[FlatNode] {
    if nodes.is_empty() {
        &EMPTY_WORLD
    } else {
        nodes
    }
}

/// Byte size of `records`, or `Error::Gpu` if it exceeds `max_binding`.
pub fn checked_upload_size(records: &[FlatNode], max_binding: u64) -> Result<u64> {
    let size = (records.len() * FLAT_NODE_STRIDE) as u64;
    if size > max_binding {
        return Err(Error::Gpu(format!(
            "Octree of {} nodes ({} bytes) exceeds max storage binding size {}",
            records.len(),
            size,
            max_binding
        )));
    }
    Ok(size)
}

/// Storage buffer holding the flat octree, plus its bind group
pub struct OctreeBuffer {
    /// Storage buffer for flat nodes
    node_buffer: wgpu::Buffer,
    /// Bind group layout for accessing the buffer in shaders
    bind_group_layout: wgpu::BindGroupLayout,
    /// Bind group for buffer access
    bind_group: wgpu::BindGroup,
    /// Real node count (0 for an empty world even though one record is bound)
    node_count: u32,
}

impl OctreeBuffer {
    /// Upload `nodes` into a new storage buffer
    pub fn new(device: &wgpu::Device, nodes: &[FlatNode]) -> Result<Self> {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("octree_nodes_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: OCTREE_NODES_BINDING,
                visibility: wgpu::ShaderStages::COMPUTE | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(FLAT_NODE_STRIDE as u64),
                },
                count: None,
            }],
        });

        let node_buffer = Self::create_node_buffer(device, nodes)?;
        let bind_group = Self::create_bind_group(device, &bind_group_layout, &node_buffer);

        Ok(Self {
            node_buffer,
            bind_group_layout,
            bind_group,
            node_count: nodes.len() as u32,
        })
    }

    /// Replace the whole buffer with a newly generated world.
    ///
    /// On error the current buffer and bind group stay bound.
    pub fn replace(&mut self, device: &wgpu::Device, nodes: &[FlatNode]) -> Result<()> {
        let node_buffer = Self::create_node_buffer(device, nodes)?;
        let bind_group = Self::create_bind_group(device, &self.bind_group_layout, &node_buffer);

        let old_buffer = std::mem::replace(&mut self.node_buffer, node_buffer);
        self.bind_group = bind_group;
        self.node_count = nodes.len() as u32;
        old_buffer.destroy();
        Ok(())
    }

    fn create_node_buffer(device: &wgpu::Device, nodes: &[FlatNode]) -> Result<wgpu::Buffer> {
        let records = upload_records(nodes);
        let max_binding = device.limits().max_storage_buffer_binding_size as u64;
        let size = checked_upload_size(records, max_binding)?;

        if size > 256 * 1024 * 1024 {
            log::warn!("Octree node buffer size: {}MB", size / 1024 / 1024);
        }

        log::debug!("Uploading {} octree nodes ({} bytes)", nodes.len(), size);

        Ok(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("octree_nodes"),
            contents: bytemuck::cast_slice(records),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        }))
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        node_buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("octree_nodes_bind_group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: OCTREE_NODES_BINDING,
                resource: node_buffer.as_entire_binding(),
            }],
        })
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn node_buffer(&self) -> &wgpu::Buffer {
        &self.node_buffer
    }

    /// Number of real nodes; 0 means the shader should treat the world as empty
    pub fn node_count(&self) -> u32 {
        self.node_count
    }
}
