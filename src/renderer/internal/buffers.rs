use std::mem;
use std::num::NonZeroU64;

use bytemuck::Pod;

use crate::renderer::internal::RenderContext;
use crate::renderer::uniforms::{aligned_size, SceneUniform};

/// Growable uniform buffer of fixed-size slots addressed with dynamic
/// offsets. One slot per render call / light batch / shadow tile; everything
/// is written up front each frame, then draws bind their slot by offset.
pub(crate) struct DynamicUniformBuffer {
    label: &'static str,
    pub(crate) buffer: wgpu::Buffer,
    pub(crate) bind_group: wgpu::BindGroup,
    pub(crate) bind_layout: wgpu::BindGroupLayout,
    slot_size: u64,
    capacity: u32,
}

impl DynamicUniformBuffer {
    pub(crate) fn new<T: Pod>(
        device: &wgpu::Device,
        label: &'static str,
        visibility: wgpu::ShaderStages,
        capacity: u32,
    ) -> Self {
        let slot_size = aligned_size(mem::size_of::<T>() as u64);

        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: Some(
                        NonZeroU64::new(mem::size_of::<T>() as u64).unwrap(),
                    ),
                },
                count: None,
            }],
        });

        let buffer = Self::create_buffer(device, label, slot_size, capacity);
        let bind_group =
            Self::create_bind_group(device, label, &bind_layout, &buffer, mem::size_of::<T>());

        Self {
            label,
            buffer,
            bind_group,
            bind_layout,
            slot_size,
            capacity,
        }
    }

    fn create_buffer(
        device: &wgpu::Device,
        label: &str,
        slot_size: u64,
        capacity: u32,
    ) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: slot_size * capacity.max(1) as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        label: &str,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
        item_size: usize,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer,
                    offset: 0,
                    size: NonZeroU64::new(item_size as u64),
                }),
            }],
        })
    }

    /// Write one value per slot, growing the buffer first if needed.
    pub(crate) fn upload<T: Pod>(&mut self, context: &RenderContext, items: &[T]) {
        let required = items.len() as u32;
        if required > self.capacity {
            let new_capacity = required.max(self.capacity * 2).max(1);
            log::info!(
                "Growing {}: {} -> {} slots",
                self.label,
                self.capacity,
                new_capacity
            );
            self.buffer =
                Self::create_buffer(&context.device, self.label, self.slot_size, new_capacity);
            self.bind_group = Self::create_bind_group(
                &context.device,
                self.label,
                &self.bind_layout,
                &self.buffer,
                mem::size_of::<T>(),
            );
            self.capacity = new_capacity;
        }

        for (index, item) in items.iter().enumerate() {
            context.queue.write_buffer(
                &self.buffer,
                self.slot_size * index as u64,
                bytemuck::bytes_of(item),
            );
        }
    }

    pub(crate) fn offset(&self, index: u32) -> u32 {
        (self.slot_size * index as u64) as u32
    }
}

/// Frame-level bind group: scene uniform plus the shadow atlas with its
/// comparison sampler. When no atlas exists a 1×1 depth stub keeps the
/// binding valid; the shader skips shadow lookups via the scene params.
pub(crate) struct SceneBuffer {
    pub(crate) buffer: wgpu::Buffer,
    pub(crate) bind_group: wgpu::BindGroup,
    pub(crate) bind_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    stub_view: wgpu::TextureView,
}

impl SceneBuffer {
    pub(crate) fn new(device: &wgpu::Device) -> Self {
        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("SceneBindLayout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: Some(
                            NonZeroU64::new(mem::size_of::<SceneUniform>() as u64).unwrap(),
                        ),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("SceneUniformBuffer"),
            size: mem::size_of::<SceneUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("ShadowSampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let stub = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("ShadowStub"),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let stub_view = stub.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group =
            Self::create_bind_group(device, &bind_layout, &buffer, &stub_view, &sampler);

        Self {
            buffer,
            bind_group,
            bind_layout,
            sampler,
            stub_view,
        }
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
        atlas_view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("SceneBindGroup"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(atlas_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    /// Point the frame bind group at the current atlas (or the stub when the
    /// scene has none).
    pub(crate) fn rebind(&mut self, device: &wgpu::Device, atlas_view: Option<&wgpu::TextureView>) {
        let view = atlas_view.unwrap_or(&self.stub_view);
        self.bind_group =
            Self::create_bind_group(device, &self.bind_layout, &self.buffer, view, &self.sampler);
    }

    pub(crate) fn write(&self, queue: &wgpu::Queue, uniform: &SceneUniform) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(uniform));
    }
}
