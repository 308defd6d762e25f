use glam::{Mat4, Vec3};

use crate::scene::bounds::Aabb;
use crate::scene::frustum::Frustum;

/// Perspective camera. The renderer receives exactly one active camera per
/// frame: the gameplay camera or the editor orbit camera.
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

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.proj(aspect) * self.view()
    }

    pub fn frustum(&self, aspect: f32) -> Frustum {
        Frustum::from_view_proj(self.view_proj(aspect))
    }

    /// Visibility test used for culling; true when the box may be on screen.
    pub fn sees(&self, aspect: f32, aabb: &Aabb) -> bool {
        self.frustum(aspect).intersects(aabb)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 2.0, 6.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_radians: 60f32.to_radians(),
            near: 0.1,
            far: 1000.0,
        }
    }
}
