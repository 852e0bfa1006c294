//! Mapping from the cube's attribute regions and the instance buffer to
//! shader input locations.
//!
//! | Slot | Source              | Locations | Format    | Stride | Step     |
//! |------|---------------------|-----------|-----------|--------|----------|
//! | 0    | positions region    | 0         | Float32x4 | 16     | vertex   |
//! | 1    | normals region      | 1         | Float32x3 | 12     | vertex   |
//! | 2    | tex coords region   | 2         | Float32x2 | 8      | vertex   |
//! | 3    | instance transforms | 3, 4, 5, 6| Float32x4 | 64     | instance |

use std::mem;

use crate::renderer::cube::{CubeMesh, RegionLayout};
use crate::renderer::instances::{InstanceRaw, InstanceTransformBuffer};

pub const POSITION_LOCATION: u32 = 0;
pub const NORMAL_LOCATION: u32 = 1;
pub const TEX_COORD_LOCATION: u32 = 2;
/// First of four consecutive locations, one per matrix column.
pub const INSTANCE_MATRIX_LOCATION: u32 = 3;

const COLUMN_SIZE: wgpu::BufferAddress = mem::size_of::<[f32; 4]>() as wgpu::BufferAddress;

const POSITION_ATTRS: [wgpu::VertexAttribute; 1] =
    wgpu::vertex_attr_array![POSITION_LOCATION => Float32x4];
const NORMAL_ATTRS: [wgpu::VertexAttribute; 1] =
    wgpu::vertex_attr_array![NORMAL_LOCATION => Float32x3];
const TEX_COORD_ATTRS: [wgpu::VertexAttribute; 1] =
    wgpu::vertex_attr_array![TEX_COORD_LOCATION => Float32x2];
const INSTANCE_ATTRS: [wgpu::VertexAttribute; 4] = [
    instance_column(0),
    instance_column(1),
    instance_column(2),
    instance_column(3),
];

const fn instance_column(column: u32) -> wgpu::VertexAttribute {
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x4,
        offset: column as wgpu::BufferAddress * COLUMN_SIZE,
        shader_location: INSTANCE_MATRIX_LOCATION + column,
    }
}

/// Vertex buffer layouts for pipeline creation, one per binding slot.
pub struct AttributeLayout;

impl AttributeLayout {
    pub const SLOT_COUNT: usize = 4;

    pub fn buffers() -> [wgpu::VertexBufferLayout<'static>; Self::SLOT_COUNT] {
        [
            wgpu::VertexBufferLayout {
                array_stride: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &POSITION_ATTRS,
            },
            wgpu::VertexBufferLayout {
                array_stride: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &NORMAL_ATTRS,
            },
            wgpu::VertexBufferLayout {
                array_stride: mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &TEX_COORD_ATTRS,
            },
            // Stride comes from the matrix type, never from buffer size.
            wgpu::VertexBufferLayout {
                array_stride: InstanceRaw::SIZE,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &INSTANCE_ATTRS,
            },
        ]
    }
}

/// Immutable view over a mesh and an instance buffer it does not own.
///
/// Borrowing both keeps the referenced buffers alive for as long as the
/// binding exists. Different geometry needs a new binding. It holds no GPU
/// state of its own, so the renderer builds one per frame inside the pass
/// instead of keeping one from startup.
pub struct GeometryBinding<'a> {
    mesh: &'a CubeMesh,
    instances: &'a InstanceTransformBuffer,
    regions: RegionLayout,
}

impl<'a> GeometryBinding<'a> {
    pub fn new(mesh: &'a CubeMesh, instances: &'a InstanceTransformBuffer) -> Self {
        Self {
            mesh,
            instances,
            regions: mesh.layout(),
        }
    }

    /// Binds all four slots on `pass`.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        let vertices = self.mesh.buffer();
        pass.set_vertex_buffer(0, vertices.slice(self.regions.positions()));
        pass.set_vertex_buffer(1, vertices.slice(self.regions.normals()));
        pass.set_vertex_buffer(2, vertices.slice(self.regions.tex_coords()));
        pass.set_vertex_buffer(3, self.instances.buffer().slice(..));
    }

    /// One non-indexed draw of the whole mesh for every instance written by
    /// the last successful transform update.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        let instance_count = self.instances.instance_count();
        if instance_count == 0 {
            return;
        }
        pass.draw(0..self.mesh.vertex_count(), 0..instance_count);
    }
}
