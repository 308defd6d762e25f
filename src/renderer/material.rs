use glam::Vec3;

use crate::asset::Handle;
use crate::renderer::Texture;

/// Per-material transparency class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlphaMode {
    /// Fully opaque; alpha is ignored.
    Opaque,
    /// Fragments with alpha below the cutoff are discarded.
    Mask,
    /// Standard alpha blending; sorted back to front, casts no shadows.
    Blend,
}

/// How one surface is rendered. Materials are interned in the asset store and
/// borrowed by render calls; absent textures fall back to shared 1×1 neutral
/// textures so shader sampling is always defined.
#[derive(Clone, Debug)]
pub struct Material {
    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: f32,
    pub two_sided: bool,

    pub albedo_factor: Vec3,
    pub specular_factor: Vec3,
    pub emissive_factor: Vec3,
    pub occlusion_factor: Vec3,

    pub albedo_texture: Option<Handle<Texture>>,
    pub specular_texture: Option<Handle<Texture>>,
    pub normal_texture: Option<Handle<Texture>>,
    pub occlusion_texture: Option<Handle<Texture>>,
    pub metalness_texture: Option<Handle<Texture>>,
    pub roughness_texture: Option<Handle<Texture>>,
    /// Occlusion, metalness and roughness packed into R, G, B.
    pub omr_texture: Option<Handle<Texture>>,
    pub emissive_texture: Option<Handle<Texture>>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            two_sided: false,
            albedo_factor: Vec3::ONE,
            specular_factor: Vec3::splat(0.5),
            emissive_factor: Vec3::ZERO,
            occlusion_factor: Vec3::ONE,
            albedo_texture: None,
            specular_texture: None,
            normal_texture: None,
            occlusion_texture: None,
            metalness_texture: None,
            roughness_texture: None,
            omr_texture: None,
            emissive_texture: None,
        }
    }
}

impl Material {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alpha_mode(mut self, mode: AlphaMode) -> Self {
        self.alpha_mode = mode;
        self
    }

    pub fn with_cutoff(mut self, cutoff: f32) -> Self {
        self.alpha_mode = AlphaMode::Mask;
        self.alpha_cutoff = cutoff;
        self
    }

    pub fn with_two_sided(mut self) -> Self {
        self.two_sided = true;
        self
    }

    pub fn with_albedo(mut self, factor: Vec3) -> Self {
        self.albedo_factor = factor;
        self
    }

    pub fn with_emissive(mut self, factor: Vec3) -> Self {
        self.emissive_factor = factor;
        self
    }

    pub fn with_albedo_texture(mut self, texture: Handle<Texture>) -> Self {
        self.albedo_texture = Some(texture);
        self
    }

    pub fn with_normal_texture(mut self, texture: Handle<Texture>) -> Self {
        self.normal_texture = Some(texture);
        self
    }

    pub fn with_omr_texture(mut self, texture: Handle<Texture>) -> Self {
        self.omr_texture = Some(texture);
        self
    }

    pub fn with_emissive_texture(mut self, texture: Handle<Texture>) -> Self {
        self.emissive_texture = Some(texture);
        self
    }

    pub fn is_blended(&self) -> bool {
        self.alpha_mode == AlphaMode::Blend
    }

    /// Alpha threshold handed to shaders. Masked materials cut at their
    /// configured threshold; everything else passes a cutoff of zero.
    pub fn cutoff(&self) -> f32 {
        match self.alpha_mode {
            AlphaMode::Mask => self.alpha_cutoff,
            _ => 0.0,
        }
    }
}
