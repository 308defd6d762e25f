use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::renderer::Material;

/// Uniform buffer offsets must honor the device's minimum alignment; 256 is
/// the portable worst case and what every slot size here is rounded to.
pub const UNIFORM_ALIGN: u64 = 256;

pub const fn aligned_size(size: u64) -> u64 {
    (size + UNIFORM_ALIGN - 1) / UNIFORM_ALIGN * UNIFORM_ALIGN
}

/// Per-frame scene state, bound once for the whole color pass.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    /// xyz = camera eye, w = elapsed seconds.
    pub camera_time: [f32; 4],
    /// x = shadow tile count, y = shadows enabled (0/1), zw unused.
    pub params: [f32; 4],
}

impl SceneUniform {
    pub fn new(view_proj: Mat4, eye: Vec3, time: f32, shadow_tiles: u32) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            camera_time: [eye.x, eye.y, eye.z, time],
            params: [
                shadow_tiles as f32,
                if shadow_tiles > 0 { 1.0 } else { 0.0 },
                0.0,
                0.0,
            ],
        }
    }
}

/// Per-render-call state: model matrix plus the material's factors, written
/// into one dynamic-offset slot per call each frame.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    /// rgb = albedo factor, w = alpha cutoff.
    pub albedo: [f32; 4],
    /// rgb = emissive factor, w = normal map present (0/1).
    pub emissive: [f32; 4],
    /// rgb = specular factor, w = occlusion factor.
    pub specular: [f32; 4],
}

impl ObjectUniform {
    pub fn new(model: Mat4, material: &Material) -> Self {
        let albedo = material.albedo_factor;
        let emissive = material.emissive_factor;
        let specular = material.specular_factor;
        Self {
            model: model.to_cols_array_2d(),
            albedo: [albedo.x, albedo.y, albedo.z, material.cutoff()],
            emissive: [
                emissive.x,
                emissive.y,
                emissive.z,
                if material.normal_texture.is_some() {
                    1.0
                } else {
                    0.0
                },
            ],
            specular: [
                specular.x,
                specular.y,
                specular.z,
                material.occlusion_factor.x,
            ],
        }
    }
}
