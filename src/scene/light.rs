use glam::{Mat4, Vec3};

use crate::scene::frustum::Frustum;
use crate::scene::transform::Transform;

/// Near plane for every per-light shadow camera. Far is the light's reach.
pub const SHADOW_NEAR_PLANE: f32 = 0.1;

const DEFAULT_SHADOW_FOV: f32 = std::f32::consts::FRAC_PI_2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightKind {
    Point,
    Spot {
        /// Half-angle of the cone, radians.
        cone_angle: f32,
        cone_exp: f32,
    },
    Directional {
        area_size: f32,
    },
}

/// One scene light. Lights live in an ordered list on the scene: batching and
/// shadow-slot assignment both walk them in scene order.
#[derive(Clone, Debug)]
pub struct Light {
    pub transform: Transform,
    pub kind: LightKind,
    pub color: Vec3,
    pub intensity: f32,
    pub max_distance: f32,
    pub visible: bool,
    pub cast_shadows: bool,
    pub shadow_bias: f32,
    /// Horizontal tile index in the shadow atlas; `None` until assigned.
    pub shadow_slot: Option<u32>,
    /// Lazily created on first shadow computation, then persistent.
    pub shadow_camera: Option<ShadowCamera>,
}

impl Light {
    pub fn new(kind: LightKind, transform: Transform) -> Self {
        Self {
            transform,
            kind,
            color: Vec3::ONE,
            intensity: 1.0,
            max_distance: 100.0,
            visible: true,
            cast_shadows: false,
            shadow_bias: 0.001,
            shadow_slot: None,
            shadow_camera: None,
        }
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    pub fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.max_distance = max_distance;
        self
    }

    pub fn with_shadows(mut self, bias: f32) -> Self {
        self.cast_shadows = true;
        self.shadow_bias = bias;
        self
    }

    pub fn position(&self) -> Vec3 {
        self.transform.translation
    }

    /// Full vertical field of view for this light's shadow camera: twice the
    /// cone half-angle for spots, a fixed 90° otherwise.
    pub fn shadow_fov(&self) -> f32 {
        match self.kind {
            LightKind::Spot { cone_angle, .. } => 2.0 * cone_angle,
            _ => DEFAULT_SHADOW_FOV,
        }
    }

    /// Idempotent lazy init of the owned shadow camera.
    pub fn ensure_shadow_camera(&mut self) {
        if self.shadow_camera.is_none() {
            self.shadow_camera = Some(ShadowCamera::default());
        }
    }

    /// Re-aim the shadow camera at the light's current pose and return it.
    pub fn refresh_shadow_camera(&mut self) -> &ShadowCamera {
        self.ensure_shadow_camera();
        let fov = self.shadow_fov();
        let far = self.max_distance;
        let position = self.transform.translation;
        let forward = self.transform.forward();
        let up = self.transform.up();

        let camera = self.shadow_camera.as_mut().unwrap();
        camera.update(fov, SHADOW_NEAR_PLANE, far, position, forward, up);
        camera
    }
}

/// Depth-only camera owned by a shadow-casting light. Square aspect: every
/// atlas tile is square.
#[derive(Clone, Copy, Debug)]
pub struct ShadowCamera {
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    pub view_proj: Mat4,
}

impl Default for ShadowCamera {
    fn default() -> Self {
        Self {
            fov_y: DEFAULT_SHADOW_FOV,
            near: SHADOW_NEAR_PLANE,
            far: 100.0,
            view_proj: Mat4::IDENTITY,
        }
    }
}

impl ShadowCamera {
    pub fn update(
        &mut self,
        fov_y: f32,
        near: f32,
        far: f32,
        position: Vec3,
        forward: Vec3,
        up: Vec3,
    ) {
        self.fov_y = fov_y;
        self.near = near;
        self.far = far;
        let proj = Mat4::perspective_rh(fov_y, 1.0, near, far);
        let view = Mat4::look_at_rh(position, position + forward, up);
        self.view_proj = proj * view;
    }

    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_proj(self.view_proj)
    }
}
