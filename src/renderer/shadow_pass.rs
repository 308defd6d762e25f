use bytemuck::{Pod, Zeroable};

use crate::asset::Assets;
use crate::renderer::internal::{DynamicUniformBuffer, MaterialBinder, RenderContext};
use crate::renderer::render_call::RenderCall;
use crate::renderer::shadow_atlas::ShadowAtlas;
use crate::renderer::Vertex;
use crate::scene::light::Light;

/// Per-light view-projection, one dynamic-offset slot per atlas tile.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ShadowViewUniform {
    view_proj: [[f32; 4]; 4],
}

/// Fills the shadow atlas once per frame, before the color pass samples it.
/// One depth-only render pass over the whole atlas; scissor confines each
/// light's draws to its own tile.
pub(crate) struct ShadowPass {
    view_buffer: DynamicUniformBuffer,
    pipelines: [wgpu::RenderPipeline; 2],
}

impl ShadowPass {
    pub(crate) fn new(
        context: &RenderContext,
        object_layout: &wgpu::BindGroupLayout,
        material_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let device = &context.device;

        let view_buffer = DynamicUniformBuffer::new::<ShadowViewUniform>(
            device,
            "ShadowViewBuffer",
            wgpu::ShaderStages::VERTEX,
            8,
        );

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("ShadowShader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shader/shadow.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("ShadowPipelineLayout"),
            bind_group_layouts: &[&view_buffer.bind_layout, object_layout, material_layout],
            push_constant_ranges: &[],
        });

        let pipelines = [
            Self::create_pipeline(device, &pipeline_layout, &shader, Some(wgpu::Face::Back)),
            Self::create_pipeline(device, &pipeline_layout, &shader, None),
        ];

        Self {
            view_buffer,
            pipelines,
        }
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        cull_mode: Option<wgpu::Face>,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("ShadowPipeline"),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            // Fragment stage with no color targets: depth only, but the
            // alpha-cutoff discard still runs so masked materials cut shadows.
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode,
                front_face: wgpu::FrontFace::Ccw,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: ShadowAtlas::FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    /// Render every visible caster's depth view into its tile. `objects` is
    /// the frame's per-call uniform buffer, indexed in render-call order.
    /// Returns the number of depth draws issued.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn render(
        &mut self,
        context: &RenderContext,
        encoder: &mut wgpu::CommandEncoder,
        atlas: &ShadowAtlas,
        lights: &mut [Light],
        calls: &[RenderCall],
        assets: &Assets,
        objects: &DynamicUniformBuffer,
        materials: &mut MaterialBinder,
    ) -> u32 {
        // Aim every caster's camera first: all queue writes land before the
        // pass executes, so per-light state has to be slotted up front.
        let mut tiles = Vec::new();
        for light in lights.iter_mut() {
            if !light.cast_shadows || !light.visible {
                continue;
            }
            let Some(slot) = light.shadow_slot else {
                continue;
            };
            let camera = *light.refresh_shadow_camera();
            tiles.push((slot, camera));
        }

        if tiles.is_empty() {
            return 0;
        }

        let uniforms: Vec<ShadowViewUniform> = tiles
            .iter()
            .map(|(_, camera)| ShadowViewUniform {
                view_proj: camera.view_proj.to_cols_array_2d(),
            })
            .collect();
        self.view_buffer.upload(context, &uniforms);

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("ShadowPass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &atlas.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let mut draw_count = 0u32;

        for (tile_index, (slot, camera)) in tiles.iter().enumerate() {
            let (x, y, w, h) = atlas.tile_viewport(*slot);
            pass.set_viewport(x as f32, y as f32, w as f32, h as f32, 0.0, 1.0);
            pass.set_scissor_rect(x, y, w, h);

            let frustum = camera.frustum();

            for (call_index, call) in calls.iter().enumerate() {
                // Translucent geometry casts no shadows in this design.
                if call.blended {
                    continue;
                }
                if !frustum.intersects(&call.bounds) {
                    continue;
                }

                let Some(mesh) = assets.meshes.get(call.mesh) else {
                    debug_assert!(false, "render call with dangling mesh handle");
                    continue;
                };
                if mesh.vertex_count() == 0 {
                    continue;
                }
                let Some(material) = assets.materials.get(call.material) else {
                    debug_assert!(false, "render call with dangling material handle");
                    continue;
                };
                let two_sided = material.two_sided;
                let Some(material_group) =
                    materials.bind_group(&context.device, assets, call.material)
                else {
                    continue;
                };

                pass.set_pipeline(&self.pipelines[usize::from(two_sided)]);
                pass.set_bind_group(
                    0,
                    &self.view_buffer.bind_group,
                    &[self.view_buffer.offset(tile_index as u32)],
                );
                pass.set_bind_group(1, &objects.bind_group, &[objects.offset(call_index as u32)]);
                pass.set_bind_group(2, material_group, &[]);

                pass.set_vertex_buffer(0, mesh.vertex_buffer().slice(..));
                pass.set_index_buffer(mesh.index_buffer().slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count(), 0, 0..1);
                draw_count += 1;
            }
        }

        draw_count
    }
}
