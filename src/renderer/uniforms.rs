// renderer/uniforms.rs
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::renderer::lights::{LightSlots, MAX_LIGHTS};

/// GPU copy of [`ShaderUniformState`]. Field order and padding mirror the
/// `Uniforms` struct shared by both WGSL stages.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug)]
pub struct PhongUniform {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub ambient_product: [f32; 4],
    pub diffuse_product: [f32; 4],
    pub specular_product: [f32; 4],
    pub diffuse_color: [f32; 4],
    pub shininess: f32,
    pub light_count: u32,
    pub _padding: [u32; 2],
    pub light_positions: [[f32; 4]; MAX_LIGHTS],
}

/// Last values set on a shading program.
///
/// Every field has a fixed slot in [`PhongUniform`], so setters write
/// straight into the struct instead of resolving names.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShaderUniformState {
    model: Mat4,
    view: Mat4,
    projection: Mat4,
    camera_position: Vec3,
    ambient_product: Vec3,
    diffuse_product: Vec3,
    specular_product: Vec3,
    diffuse_color: Vec3,
    shininess: f32,
    lights: LightSlots,
}

impl Default for ShaderUniformState {
    fn default() -> Self {
        let camera_position = Vec3::new(0.0, 0.0, 30.0);

        let mut lights = LightSlots::new();
        lights.set_active(2);
        lights.set_position(0, Vec3::new(-2.5, 2.5, 1.0));
        lights.set_position(1, Vec3::new(2.5, 2.5, 1.0));

        Self {
            model: Mat4::IDENTITY,
            view: Mat4::look_at_rh(camera_position, Vec3::ZERO, Vec3::Y),
            projection: Mat4::perspective_rh(60f32.to_radians(), 640.0 / 480.0, 0.1, 100.0),
            camera_position,
            ambient_product: Vec3::splat(0.01),
            diffuse_product: Vec3::ONE,
            specular_product: Vec3::ONE,
            diffuse_color: Vec3::new(0.75, 0.75, 0.0),
            shininess: 100.0,
            lights,
        }
    }
}

impl ShaderUniformState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_model(&mut self, m: Mat4) {
        self.model = m;
    }

    pub fn set_view(&mut self, m: Mat4) {
        self.view = m;
    }

    pub fn set_projection(&mut self, m: Mat4) {
        self.projection = m;
    }

    pub fn set_camera_position(&mut self, pos: Vec3) {
        self.camera_position = pos;
    }

    pub fn set_ambient_product(&mut self, v: Vec3) {
        self.ambient_product = v;
    }

    pub fn set_diffuse_product(&mut self, v: Vec3) {
        self.diffuse_product = v;
    }

    pub fn set_specular_product(&mut self, v: Vec3) {
        self.specular_product = v;
    }

    pub fn set_shininess(&mut self, value: f32) {
        self.shininess = value;
    }

    pub fn set_diffuse_color(&mut self, color: Vec3) {
        self.diffuse_color = color;
    }

    /// Ignored unless `slot` is below the active light count.
    pub fn set_light_position(&mut self, slot: usize, pos: Vec3) -> bool {
        self.lights.set_position(slot, pos)
    }

    /// Clamped to [`MAX_LIGHTS`].
    pub fn set_light_count(&mut self, n: usize) -> bool {
        self.lights.set_active(n)
    }

    pub fn model(&self) -> Mat4 {
        self.model
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn camera_position(&self) -> Vec3 {
        self.camera_position
    }

    pub fn ambient_product(&self) -> Vec3 {
        self.ambient_product
    }

    pub fn diffuse_product(&self) -> Vec3 {
        self.diffuse_product
    }

    pub fn specular_product(&self) -> Vec3 {
        self.specular_product
    }

    pub fn diffuse_color(&self) -> Vec3 {
        self.diffuse_color
    }

    pub fn shininess(&self) -> f32 {
        self.shininess
    }

    pub fn lights(&self) -> &LightSlots {
        &self.lights
    }

    pub fn to_uniform(&self) -> PhongUniform {
        let mut light_positions = [[0.0; 4]; MAX_LIGHTS];
        for (dst, src) in light_positions.iter_mut().zip(self.lights.slots()) {
            *dst = src.extend(1.0).to_array();
        }

        PhongUniform {
            model: self.model.to_cols_array_2d(),
            view: self.view.to_cols_array_2d(),
            projection: self.projection.to_cols_array_2d(),
            camera_position: self.camera_position.extend(1.0).to_array(),
            ambient_product: self.ambient_product.extend(0.0).to_array(),
            diffuse_product: self.diffuse_product.extend(0.0).to_array(),
            specular_product: self.specular_product.extend(0.0).to_array(),
            diffuse_color: self.diffuse_color.extend(1.0).to_array(),
            shininess: self.shininess,
            light_count: self.lights.active() as u32,
            _padding: [0; 2],
            light_positions,
        }
    }
}
