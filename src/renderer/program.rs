//! Blinn-Phong shading program: two WGSL stages, one uniform block, one
//! pipeline.
//!
//! Compile and link failures do not abort [`ShadingProgram::create`]. They
//! are logged and kept in [`ShadingProgram::diagnostics`]; a program with
//! diagnostics will not render correctly and callers should stop there.
//!
//! Uniform setters live on [`BoundProgram`], which only
//! [`ShadingProgram::bind`] hands out, so nothing can be set on a program
//! that is not bound. Changes are uploaded when the guard is dropped.

use std::fmt;

use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::renderer::binding::AttributeLayout;
use crate::renderer::error::{allocate, RenderError};
use crate::renderer::pipeline_builder::PipelineBuilder;
use crate::renderer::uniforms::{PhongUniform, ShaderUniformState};

pub const PHONG_VERTEX_SOURCE: &str = include_str!("../shaders/phong.vert.wgsl");
pub const PHONG_FRAGMENT_SOURCE: &str = include_str!("../shaders/phong.frag.wgsl");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Link,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex shader"),
            ShaderStage::Fragment => write!(f, "fragment shader"),
            ShaderStage::Link => write!(f, "pipeline link"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ShaderDiagnostic {
    pub stage: ShaderStage,
    pub message: String,
}

impl fmt::Display for ShaderDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.stage, self.message)
    }
}

/// Attachment formats the pipeline renders into.
#[derive(Clone, Copy, Debug)]
pub struct ProgramTargets {
    pub color_format: wgpu::TextureFormat,
    pub depth_format: Option<wgpu::TextureFormat>,
    pub sample_count: u32,
}

pub struct ShadingProgram {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    state: ShaderUniformState,
    dirty: bool,
    diagnostics: Vec<ShaderDiagnostic>,
}

impl ShadingProgram {
    /// Program from the embedded Blinn-Phong sources.
    pub fn phong(device: &wgpu::Device, targets: &ProgramTargets) -> Result<Self, RenderError> {
        Self::create(device, PHONG_VERTEX_SOURCE, PHONG_FRAGMENT_SOURCE, targets)
    }

    pub fn create(
        device: &wgpu::Device,
        vertex_source: &str,
        fragment_source: &str,
        targets: &ProgramTargets,
    ) -> Result<Self, RenderError> {
        let mut diagnostics = Vec::new();
        let vertex_module =
            compile_stage(device, ShaderStage::Vertex, vertex_source, &mut diagnostics);
        let fragment_module = compile_stage(
            device,
            ShaderStage::Fragment,
            fragment_source,
            &mut diagnostics,
        );

        let state = ShaderUniformState::default();
        let uniform_buffer = allocate(device, "phong uniform buffer", || {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("PhongUniformBuffer"),
                contents: bytemuck::bytes_of(&state.to_uniform()),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
        })?;

        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("PhongBindLayout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<PhongUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("PhongBindGroup"),
            layout: &bind_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("PhongPipelineLayout"),
            bind_group_layouts: &[&bind_layout],
            push_constant_ranges: &[],
        });

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let mut builder =
            PipelineBuilder::new(device, &pipeline_layout, &vertex_module, &fragment_module)
                .with_label("PhongPipeline")
                .with_vertex_buffers(&AttributeLayout::buffers())
                .with_color_target(targets.color_format, Some(wgpu::BlendState::REPLACE))
                .with_multisample(targets.sample_count);
        if let Some(depth_format) = targets.depth_format {
            builder = builder.with_depth_stencil(
                depth_format,
                true,
                wgpu::CompareFunction::LessEqual,
            );
        }
        let pipeline = builder.build();
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            report(&mut diagnostics, ShaderStage::Link, err.to_string());
        }

        if diagnostics.is_empty() {
            log::info!("Phong shading program created");
        } else {
            log::error!(
                "Phong shading program created with {} diagnostic(s); rendering is undefined",
                diagnostics.len()
            );
        }
        log::debug!("Initial uniform state: {:?}", state);

        Ok(Self {
            pipeline,
            uniform_buffer,
            bind_group,
            state,
            dirty: false,
            diagnostics,
        })
    }

    /// Compile and link problems collected at creation.
    pub fn diagnostics(&self) -> &[ShaderDiagnostic] {
        &self.diagnostics
    }

    pub fn is_usable(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn state(&self) -> &ShaderUniformState {
        &self.state
    }

    /// Makes this program the target of uniform setters until the returned
    /// guard is dropped.
    pub fn bind<'a>(&'a mut self, queue: &'a wgpu::Queue) -> BoundProgram<'a> {
        BoundProgram {
            program: self,
            queue,
        }
    }

    /// Selects this program's pipeline and uniforms for subsequent draws.
    pub fn record(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
    }

    fn flush(&mut self, queue: &wgpu::Queue) {
        if !self.dirty {
            return;
        }
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&self.state.to_uniform()),
        );
        self.dirty = false;
    }
}

fn report(diagnostics: &mut Vec<ShaderDiagnostic>, stage: ShaderStage, message: String) {
    let diagnostic = ShaderDiagnostic { stage, message };
    log::error!("{}", diagnostic);
    diagnostics.push(diagnostic);
}

fn compile_stage(
    device: &wgpu::Device,
    stage: ShaderStage,
    source: &str,
    diagnostics: &mut Vec<ShaderDiagnostic>,
) -> wgpu::ShaderModule {
    let label = match stage {
        ShaderStage::Vertex => "PhongVertexShader",
        _ => "PhongFragmentShader",
    };

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        report(diagnostics, stage, err.to_string());
    }
    module
}

/// A bound [`ShadingProgram`]. Setter changes reach the GPU on drop.
pub struct BoundProgram<'a> {
    program: &'a mut ShadingProgram,
    queue: &'a wgpu::Queue,
}

impl BoundProgram<'_> {
    fn touch(&mut self) -> &mut ShaderUniformState {
        self.program.dirty = true;
        &mut self.program.state
    }

    pub fn set_model(&mut self, m: Mat4) {
        self.touch().set_model(m);
    }

    pub fn set_view(&mut self, m: Mat4) {
        self.touch().set_view(m);
    }

    pub fn set_projection(&mut self, m: Mat4) {
        self.touch().set_projection(m);
    }

    pub fn set_camera_position(&mut self, pos: Vec3) {
        self.touch().set_camera_position(pos);
    }

    pub fn set_ambient_product(&mut self, v: Vec3) {
        self.touch().set_ambient_product(v);
    }

    pub fn set_diffuse_product(&mut self, v: Vec3) {
        self.touch().set_diffuse_product(v);
    }

    pub fn set_specular_product(&mut self, v: Vec3) {
        self.touch().set_specular_product(v);
    }

    pub fn set_shininess(&mut self, value: f32) {
        self.touch().set_shininess(value);
    }

    pub fn set_diffuse_color(&mut self, color: Vec3) {
        self.touch().set_diffuse_color(color);
    }

    /// Returns `false`, and changes nothing, for slots outside the active
    /// light count.
    pub fn set_light_position(&mut self, slot: usize, pos: Vec3) -> bool {
        let written = self.program.state.set_light_position(slot, pos);
        self.program.dirty |= written;
        written
    }

    /// Returns `false` when `n` was above the maximum and got clamped.
    pub fn set_light_count(&mut self, n: usize) -> bool {
        self.touch().set_light_count(n)
    }

    pub fn state(&self) -> &ShaderUniformState {
        &self.program.state
    }
}

impl Drop for BoundProgram<'_> {
    fn drop(&mut self) {
        self.program.flush(self.queue);
    }
}
