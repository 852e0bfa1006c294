// renderer/renderer.rs
use std::sync::Arc;

use glam::{Mat4, Vec3};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::renderer::binding::GeometryBinding;
use crate::renderer::context::RenderContext;
use crate::renderer::cube::CubeMesh;
use crate::renderer::error::RenderError;
use crate::renderer::instances::{InstanceTransformBuffer, MAX_INSTANCES};
use crate::renderer::program::ShadingProgram;
use crate::scene::Camera;
use crate::settings::RenderSettings;

/// Draws every instance of one cube mesh with the Phong program.
pub struct Renderer {
    context: RenderContext,
    mesh: CubeMesh,
    instances: InstanceTransformBuffer,
    program: ShadingProgram,
    clear_color: wgpu::Color,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, settings: &RenderSettings) -> Result<Self, RenderError> {
        let context = RenderContext::new(window, settings).await?;

        let [width, height, depth] = settings.cube_size;
        let (_, mesh) = CubeMesh::new(&context.device, &context.queue, width, height, depth)?;
        let instances = InstanceTransformBuffer::new(&context.device, MAX_INSTANCES)?;

        let mut program = ShadingProgram::phong(&context.device, &context.targets())?;
        if !program.is_usable() {
            for diagnostic in program.diagnostics() {
                log::error!("{}", diagnostic);
            }
        }

        {
            let mut bound = program.bind(&context.queue);
            let material = &settings.material;
            bound.set_diffuse_color(Vec3::from(material.diffuse_color));
            bound.set_ambient_product(Vec3::from(material.ambient));
            bound.set_shininess(material.shininess);

            bound.set_light_count(settings.lights.len());
            for (slot, position) in settings.lights.iter().enumerate() {
                bound.set_light_position(slot, Vec3::from(*position));
            }
        }

        log::info!(
            "Renderer ready: {} light(s), capacity {} instances",
            settings.lights.len(),
            instances.capacity()
        );

        Ok(Self {
            context,
            mesh,
            instances,
            program,
            clear_color: settings.clear_color(),
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.context.resize(new_size);
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.context.aspect()
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    /// Recovers from a lost or outdated surface.
    pub fn reconfigure(&mut self) {
        self.context.reconfigure();
    }

    pub fn render(&mut self, camera: &Camera, transforms: &[Mat4]) -> Result<(), RenderError> {
        if !self
            .instances
            .update_for_frame(&self.context.queue, transforms)
        {
            log::warn!(
                "Drawing the previous {} instance(s) this frame",
                self.instances.instance_count()
            );
        }

        {
            let mut bound = self.program.bind(&self.context.queue);
            bound.set_view(camera.view());
            bound.set_projection(camera.proj(self.context.aspect()));
            bound.set_camera_position(camera.position());
        }

        let frame = self.context.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Encoder"),
                });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("MainPass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.context.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.program.record(&mut rpass);
            let geometry = GeometryBinding::new(&self.mesh, &self.instances);
            geometry.bind(&mut rpass);
            geometry.draw(&mut rpass);
        }

        self.context.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}
