use glam::{Mat4, Vec3};

#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }
    pub fn proj(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_radians, aspect, self.near, self.far)
    }
    pub fn position(&self) -> Vec3 {
        self.eye
    }

    /// Pulls the eye back along its current direction until a square of
    /// side `extent` centred on the target fits the vertical field of view.
    /// The far plane is pushed out so the whole square stays inside it.
    pub fn frame_extent(&mut self, extent: f32) {
        let direction = (self.eye - self.target).try_normalize().unwrap_or(Vec3::Z);
        let half_fov = self.fov_y_radians * 0.5;
        let distance = (extent * 0.5 / half_fov.tan()).max(self.near) * 1.2;
        self.eye = self.target + direction * distance;
        self.far = self.far.max(distance + extent);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 30.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_radians: 60f32.to_radians(),
            near: 0.1,
            far: 100.0,
        }
    }
}
