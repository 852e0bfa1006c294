//! Box geometry packed into a single region-layout vertex buffer.
//!
//! Attributes are not interleaved: the buffer holds every position, then
//! every normal, then every texture coordinate. [`RegionLayout`] records
//! where each region starts so the vertex slots can be bound to the right
//! byte ranges later.

use std::ops::Range;

use glam::{Vec3, Vec4};

use crate::renderer::error::{allocate, RenderError};

pub const POSITION_COMPONENTS: usize = 4;
pub const NORMAL_COMPONENTS: usize = 3;
pub const TEX_COORD_COMPONENTS: usize = 2;

const VERTICES_PER_QUAD: usize = 6;

/// Six faces, two triangles each, no index buffer.
pub const CUBE_VERTEX_COUNT: u32 = 36;

// (0,0),(0,1),(1,1) for a,b,c then (0,0),(1,1),(1,0) for a,c,d
const QUAD_TEX_COORDS: [[f32; 2]; VERTICES_PER_QUAD] = [
    [0.0, 0.0],
    [0.0, 1.0],
    [1.0, 1.0],
    [0.0, 0.0],
    [1.0, 1.0],
    [1.0, 0.0],
];

/// A planar face given as four indices into the cube corner set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quad {
    pub a: usize,
    pub b: usize,
    pub c: usize,
    pub d: usize,
}

impl Quad {
    pub const fn new(a: usize, b: usize, c: usize, d: usize) -> Self {
        Self { a, b, c, d }
    }

    /// Flat face normal from the edges `b - a` and `c - b`.
    pub fn normal(&self, corners: &[Vec4; 8]) -> Vec3 {
        let u = (corners[self.b] - corners[self.a]).truncate();
        let v = (corners[self.c] - corners[self.b]).truncate();
        u.cross(v).normalize()
    }

    /// Corner order of the two emitted triangles: a,b,c then a,c,d.
    pub fn triangle_corners(&self) -> [usize; VERTICES_PER_QUAD] {
        [self.a, self.b, self.c, self.a, self.c, self.d]
    }
}

/// Faces in emission order: +Z, +X, -Y, +Y, -Z, -X. Each winds
/// counter-clockwise when seen from outside the box.
pub const CUBE_QUADS: [Quad; 6] = [
    Quad::new(1, 0, 3, 2),
    Quad::new(2, 3, 7, 6),
    Quad::new(3, 0, 4, 7),
    Quad::new(6, 5, 1, 2),
    Quad::new(4, 5, 6, 7),
    Quad::new(5, 4, 0, 1),
];

/// The 8 corners of an origin-centred box, `w = 1`.
pub fn cube_corners(width: f32, height: f32, depth: f32) -> [Vec4; 8] {
    let hw = width / 2.0;
    let hh = height / 2.0;
    let hd = depth / 2.0;

    [
        Vec4::new(-hw, -hh, hd, 1.0),
        Vec4::new(-hw, hh, hd, 1.0),
        Vec4::new(hw, hh, hd, 1.0),
        Vec4::new(hw, -hh, hd, 1.0),
        Vec4::new(-hw, -hh, -hd, 1.0),
        Vec4::new(-hw, hh, -hd, 1.0),
        Vec4::new(hw, hh, -hd, 1.0),
        Vec4::new(hw, -hh, -hd, 1.0),
    ]
}

/// Three parallel attribute streams; index `i` in each describes vertex `i`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VertexAttributeSet {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub tex_coords: Vec<f32>,
}

impl VertexAttributeSet {
    pub fn with_capacity(vertices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(POSITION_COMPONENTS * vertices),
            normals: Vec::with_capacity(NORMAL_COMPONENTS * vertices),
            tex_coords: Vec::with_capacity(TEX_COORD_COMPONENTS * vertices),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / POSITION_COMPONENTS
    }

    pub fn position(&self, vertex: usize) -> Vec4 {
        Vec4::from_slice(&self.positions[vertex * POSITION_COMPONENTS..])
    }

    pub fn normal(&self, vertex: usize) -> Vec3 {
        Vec3::from_slice(&self.normals[vertex * NORMAL_COMPONENTS..])
    }

    pub fn tex_coord(&self, vertex: usize) -> [f32; 2] {
        let i = vertex * TEX_COORD_COMPONENTS;
        [self.tex_coords[i], self.tex_coords[i + 1]]
    }

    pub fn append_quad(&mut self, corners: &[Vec4; 8], quad: Quad) {
        let normal = quad.normal(corners);

        for (corner, uv) in quad.triangle_corners().into_iter().zip(QUAD_TEX_COORDS) {
            self.positions.extend_from_slice(&corners[corner].to_array());
            self.normals.extend_from_slice(&normal.to_array());
            self.tex_coords.extend_from_slice(&uv);
        }
    }
}

/// Builds the 36 faceted vertices of a `width × height × depth` box.
///
/// Non-positive dimensions are not rejected; they yield a degenerate mesh.
pub fn cube_attributes(width: f32, height: f32, depth: f32) -> VertexAttributeSet {
    if !(width > 0.0 && height > 0.0 && depth > 0.0) {
        log::debug!(
            "Building degenerate cube mesh ({} x {} x {})",
            width,
            height,
            depth
        );
    }

    let corners = cube_corners(width, height, depth);
    let mut data = VertexAttributeSet::with_capacity(CUBE_VERTEX_COUNT as usize);
    for quad in CUBE_QUADS {
        data.append_quad(&corners, quad);
    }
    data
}

/// Byte offsets of the three attribute regions inside one vertex buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionLayout {
    pub positions_offset: wgpu::BufferAddress,
    pub normals_offset: wgpu::BufferAddress,
    pub tex_coords_offset: wgpu::BufferAddress,
    pub total: wgpu::BufferAddress,
}

impl RegionLayout {
    pub fn for_attributes(data: &VertexAttributeSet) -> Self {
        let float = std::mem::size_of::<f32>() as wgpu::BufferAddress;
        let positions_size = data.positions.len() as wgpu::BufferAddress * float;
        let normals_size = data.normals.len() as wgpu::BufferAddress * float;
        let tex_coords_size = data.tex_coords.len() as wgpu::BufferAddress * float;

        Self {
            positions_offset: 0,
            normals_offset: positions_size,
            tex_coords_offset: positions_size + normals_size,
            total: positions_size + normals_size + tex_coords_size,
        }
    }

    pub fn positions(&self) -> Range<wgpu::BufferAddress> {
        self.positions_offset..self.normals_offset
    }

    pub fn normals(&self) -> Range<wgpu::BufferAddress> {
        self.normals_offset..self.tex_coords_offset
    }

    pub fn tex_coords(&self) -> Range<wgpu::BufferAddress> {
        self.tex_coords_offset..self.total
    }
}

/// Device-resident cube geometry. Owns its vertex buffer.
#[derive(Debug)]
pub struct CubeMesh {
    buffer: wgpu::Buffer,
    layout: RegionLayout,
    vertex_count: u32,
}

impl CubeMesh {
    /// Builds the cube attributes and uploads them. The returned attribute
    /// set is the CPU copy; the buffer is the durable one.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: f32,
        height: f32,
        depth: f32,
    ) -> Result<(VertexAttributeSet, Self), RenderError> {
        let data = cube_attributes(width, height, depth);
        let layout = RegionLayout::for_attributes(&data);

        let buffer = allocate(device, "cube vertex buffer", || {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("CubeVertexBuffer"),
                size: layout.total,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        })?;

        queue.write_buffer(
            &buffer,
            layout.positions_offset,
            bytemuck::cast_slice(&data.positions),
        );
        queue.write_buffer(
            &buffer,
            layout.normals_offset,
            bytemuck::cast_slice(&data.normals),
        );
        queue.write_buffer(
            &buffer,
            layout.tex_coords_offset,
            bytemuck::cast_slice(&data.tex_coords),
        );

        log::info!(
            "Uploaded cube mesh: {} vertices, {} bytes",
            data.vertex_count(),
            layout.total
        );

        let vertex_count = data.vertex_count() as u32;
        Ok((
            data,
            Self {
                buffer,
                layout,
                vertex_count,
            },
        ))
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn layout(&self) -> RegionLayout {
        self.layout
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }
}
