//! First-person terrain camera

use glam::{Mat4, Vec3};
use ridgeline_core::Frustum;

/// Pitch limit short of straight up or down, where the view basis degenerates
pub const MAX_PITCH: f32 = 1.55;

/// A first-person camera looking along yaw/pitch from `position`
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    /// Horizontal angle in radians, 0 looks along +z
    pub yaw: f32,
    /// Vertical angle in radians
    pub pitch: f32,
    /// Field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 100.0, 0.0),
            yaw: std::f32::consts::FRAC_PI_4,
            pitch: -0.3,
            fov: 45.0,
            near: 1.0,
            far: 10_000.0,
            aspect: 16.0 / 9.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unit view direction
    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        )
    }

    /// Look at a world point from the current position
    pub fn look_at(&mut self, target: Vec3) {
        let dir = (target - self.position).normalize_or_zero();
        if dir == Vec3::ZERO {
            return;
        }
        self.set_angles(dir.x.atan2(dir.z), dir.y.clamp(-1.0, 1.0).asin());
    }

    /// Set the view angles in radians, keeping pitch within [`MAX_PITCH`]
    pub fn set_angles(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-MAX_PITCH, MAX_PITCH);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward(), Vec3::Y)
    }

    /// Perspective projection with wgpu's `[0, 1]` depth range
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_proj(&self.view_projection())
    }
}
