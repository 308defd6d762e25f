use bytemuck::{Pod, Zeroable};

use crate::renderer::internal::{DynamicUniformBuffer, RenderContext};
use crate::renderer::shadow_atlas::ShadowAtlas;
use crate::scene::light::Light;

/// On-screen size of one inspected shadow tile.
pub const ATLAS_DEBUG_TILE_SIZE: u32 = 300;

/// One page of the atlas inspector: which tiles fit on screen and where.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageLayout {
    /// Requested page clamped into range.
    pub page: u32,
    pub page_count: u32,
    pub first_tile: u32,
    pub tiles_in_page: u32,
    /// Left edge of the first tile, centering the row on screen.
    pub offset_x: u32,
}

/// Compute which slice of the atlas a given page shows. Returns `None` when
/// there is nothing to show. A window narrower than one tile still shows one.
pub fn page_layout(window_width: u32, tile_count: u32, requested_page: u32) -> Option<PageLayout> {
    if tile_count == 0 {
        return None;
    }

    let per_page = (window_width / ATLAS_DEBUG_TILE_SIZE).max(1).min(tile_count);
    let page_count = tile_count.div_ceil(per_page);
    let page = requested_page.min(page_count - 1);
    let first_tile = page * per_page;
    let tiles_in_page = (tile_count - first_tile).min(per_page);
    let row_width = tiles_in_page * ATLAS_DEBUG_TILE_SIZE;
    let offset_x = window_width.saturating_sub(row_width) / 2;

    Some(PageLayout {
        page,
        page_count,
        first_tile,
        tiles_in_page,
        offset_x,
    })
}

/// x = atlas slot, y = tile count, z = near, w = far.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct AtlasSliceUniform {
    params: [f32; 4],
}

/// Read-only inspector that blits shadow tiles to the screen as linearized
/// grayscale. Never mutates the atlas and has no effect on the next frame.
pub(crate) struct AtlasDebugViewer {
    pipeline: wgpu::RenderPipeline,
    slice_buffer: DynamicUniformBuffer,
    atlas_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl AtlasDebugViewer {
    pub(crate) fn new(context: &RenderContext) -> Self {
        let device = &context.device;

        let slice_buffer = DynamicUniformBuffer::new::<AtlasSliceUniform>(
            device,
            "AtlasSliceBuffer",
            wgpu::ShaderStages::FRAGMENT,
            8,
        );

        let atlas_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("AtlasDebugLayout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("AtlasDebugSampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("AtlasDebugShader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shader/atlas_debug.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("AtlasDebugPipelineLayout"),
            bind_group_layouts: &[&slice_buffer.bind_layout, &atlas_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("AtlasDebugPipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: context.config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            slice_buffer,
            atlas_layout,
            sampler,
        }
    }

    /// Blit the requested page's tiles along the bottom of the window and
    /// return the clamped page index.
    pub(crate) fn render(
        &mut self,
        context: &RenderContext,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &wgpu::TextureView,
        atlas: &ShadowAtlas,
        lights: &[Light],
        requested_page: u32,
    ) -> Option<u32> {
        let layout = page_layout(context.config.width, atlas.tile_count, requested_page)?;
        let page_end = layout.first_tile + layout.tiles_in_page;

        // Near/far per tile come from the owning light's shadow camera.
        let mut slices = Vec::new();
        for light in lights {
            let (Some(slot), Some(camera)) = (light.shadow_slot, &light.shadow_camera) else {
                continue;
            };
            if slot < layout.first_tile || slot >= page_end {
                continue;
            }
            slices.push(AtlasSliceUniform {
                params: [
                    slot as f32,
                    atlas.tile_count as f32,
                    camera.near,
                    camera.far,
                ],
            });
        }
        if slices.is_empty() {
            return Some(layout.page);
        }

        // Sort by slot so the row reads left to right.
        slices.sort_by(|a, b| a.params[0].total_cmp(&b.params[0]));
        self.slice_buffer.upload(context, &slices);

        let atlas_group = context.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("AtlasDebugBindGroup"),
            layout: &self.atlas_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&atlas.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("AtlasDebugPass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: surface_view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(1, &atlas_group, &[]);

        let tile = ATLAS_DEBUG_TILE_SIZE;
        let y = context.config.height.saturating_sub(tile);

        for (index, _slice) in slices.iter().enumerate() {
            let x = layout.offset_x + index as u32 * tile;
            if x + tile > context.config.width {
                break;
            }
            pass.set_viewport(x as f32, y as f32, tile as f32, tile as f32, 0.0, 1.0);
            pass.set_bind_group(
                0,
                &self.slice_buffer.bind_group,
                &[self.slice_buffer.offset(index as u32)],
            );
            pass.draw(0..3, 0..1);
        }

        Some(layout.page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_tiles_no_layout() {
        assert_eq!(page_layout(1280, 0, 0), None);
    }

    #[test]
    fn single_page_fits_all_tiles() {
        let layout = page_layout(1280, 3, 0).unwrap();
        // 1280 / 300 = 4 tiles fit; only 3 exist.
        assert_eq!(layout.page_count, 1);
        assert_eq!(layout.tiles_in_page, 3);
        assert_eq!(layout.first_tile, 0);
        assert_eq!(layout.offset_x, (1280 - 3 * ATLAS_DEBUG_TILE_SIZE) / 2);
    }

    #[test]
    fn overflowing_tiles_paginate() {
        // 4 per page, 10 tiles -> 3 pages of 4, 4, 2.
        let page0 = page_layout(1280, 10, 0).unwrap();
        assert_eq!(page0.page_count, 3);
        assert_eq!(page0.tiles_in_page, 4);

        let page2 = page_layout(1280, 10, 2).unwrap();
        assert_eq!(page2.first_tile, 8);
        assert_eq!(page2.tiles_in_page, 2);
    }

    #[test]
    fn out_of_range_page_clamps() {
        let layout = page_layout(1280, 10, 99).unwrap();
        assert_eq!(layout.page, 2);
        assert_eq!(layout.first_tile, 8);
    }

    #[test]
    fn narrow_window_still_shows_one_tile() {
        let layout = page_layout(200, 5, 0).unwrap();
        assert_eq!(layout.tiles_in_page, 1);
        assert_eq!(layout.page_count, 5);
        assert_eq!(layout.offset_x, 0);
    }
}
