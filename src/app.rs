// app.rs
use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::*,
    event_loop::ActiveEventLoop,
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use crate::renderer::{RenderError, Renderer};
use crate::scene::{Camera, CubeGrid};
use crate::settings::RenderSettings;

pub struct App {
    settings: RenderSettings,
    renderer: Option<Renderer>,
    window: Option<Arc<Window>>,
    camera: Camera,
    grid: CubeGrid,
    last_frame: Instant,
}

impl App {
    pub fn new(settings: RenderSettings) -> Self {
        let grid = CubeGrid::new(&settings.grid);
        let mut camera = Camera::default();
        camera.frame_extent(grid.extent() + settings.cube_size[0].max(settings.cube_size[1]));

        Self {
            settings,
            renderer: None,
            window: None,
            camera,
            grid,
            last_frame: Instant::now(),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.grid.advance(dt);

        match renderer.render(&self.camera, self.grid.transforms()) {
            Ok(()) => {}
            Err(RenderError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                renderer.reconfigure();
            }
            Err(RenderError::Surface(wgpu::SurfaceError::Timeout)) => {
                log::warn!("Surface timeout, skipping frame");
            }
            Err(err) => {
                log::error!("Render failed: {}", err);
                event_loop.exit();
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let resolution = &self.settings.resolution;
        let attributes = Window::default_attributes()
            .with_title("instanced cubes")
            .with_inner_size(PhysicalSize::new(resolution.width, resolution.height));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("Failed to create window: {}", err);
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(Renderer::new(window.clone(), &self.settings)) {
            Ok(renderer) => self.renderer = Some(renderer),
            Err(err) => {
                log::error!("Failed to initialise renderer: {}", err);
                event_loop.exit();
                return;
            }
        }

        self.last_frame = Instant::now();
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };
        if window.id() != id {
            return;
        }

        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size);
                }
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(window.inner_size());
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                window.request_redraw();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }
            _ => {}
        }
    }
}
