use std::collections::HashMap;

use crate::asset::{Assets, Handle};
use crate::renderer::{Material, Texture};

/// Builds and caches one texture bind group per material. Missing textures
/// fall back to shared 1×1 neutrals (white for color-like slots, black for
/// emissive, flat +Z for normals) so sampling is always defined.
pub(crate) struct MaterialBinder {
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white: Texture,
    black: Texture,
    flat_normal: Texture,
    cache: HashMap<Handle<Material>, wgpu::BindGroup>,
}

impl MaterialBinder {
    pub(crate) fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("MaterialSampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            layout: layout.clone(),
            sampler,
            white: Texture::white(device, queue),
            black: Texture::black(device, queue),
            flat_normal: Texture::flat_normal(device, queue),
            cache: HashMap::new(),
        }
    }

    /// Bind group for a material handle, or `None` when the handle no longer
    /// resolves (the call is skipped, per-entity failures stay local).
    pub(crate) fn bind_group(
        &mut self,
        device: &wgpu::Device,
        assets: &Assets,
        handle: Handle<Material>,
    ) -> Option<&wgpu::BindGroup> {
        if !self.cache.contains_key(&handle) {
            let material = assets.materials.get(handle)?;
            let bind_group = self.create_bind_group(device, assets, material);
            self.cache.insert(handle, bind_group);
        }
        self.cache.get(&handle)
    }

    fn create_bind_group(
        &self,
        device: &wgpu::Device,
        assets: &Assets,
        material: &Material,
    ) -> wgpu::BindGroup {
        let albedo = material
            .albedo_texture
            .and_then(|handle| assets.textures.get(handle))
            .unwrap_or(&self.white);
        let emissive = material
            .emissive_texture
            .and_then(|handle| assets.textures.get(handle))
            .unwrap_or(&self.black);
        let omr = material
            .omr_texture
            .and_then(|handle| assets.textures.get(handle))
            .unwrap_or(&self.white);
        let normal = material
            .normal_texture
            .and_then(|handle| assets.textures.get(handle))
            .unwrap_or(&self.flat_normal);

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("MaterialBindGroup"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&albedo.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&emissive.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&omr.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&normal.view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }
}
