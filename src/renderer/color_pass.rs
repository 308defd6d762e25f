use crate::asset::Assets;
use crate::renderer::internal::{
    BlendKind, DynamicUniformBuffer, MaterialBinder, PipelineKey, RenderContext, SceneBuffer,
    ScenePipelines,
};
use crate::renderer::light_batch::LightsBlock;
use crate::renderer::render_call::RenderCall;
use crate::scene::frustum::{Frustum, Relation};

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ColorPassStats {
    pub(crate) draws: u32,
    pub(crate) culled_calls: u32,
}

/// Record the main color pass: every visible render call, lit by every
/// visible light, accumulated over as many batches as the light budget
/// requires. With no light batches the pass only clears the frame.
#[allow(clippy::too_many_arguments)]
pub(crate) fn record(
    context: &RenderContext,
    encoder: &mut wgpu::CommandEncoder,
    surface_view: &wgpu::TextureView,
    pipelines: &ScenePipelines,
    scene_buffer: &SceneBuffer,
    objects: &DynamicUniformBuffer,
    lights_buffer: &DynamicUniformBuffer,
    batches: &[LightsBlock],
    calls: &[RenderCall],
    camera_frustum: &Frustum,
    assets: &Assets,
    materials: &mut MaterialBinder,
) -> ColorPassStats {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("ColorPass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: surface_view,
            depth_slice: None,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: &context.depth.view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
    });

    let mut stats = ColorPassStats::default();

    // Zero visible lights: nothing is visibly lit, so nothing is drawn.
    if batches.is_empty() {
        return stats;
    }

    for (call_index, call) in calls.iter().enumerate() {
        if camera_frustum.classify(&call.bounds) == Relation::Outside {
            stats.culled_calls += 1;
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
        let base_blend = BlendKind::for_material(material.alpha_mode);
        let two_sided = material.two_sided;

        let Some(material_group) = materials.bind_group(&context.device, assets, call.material)
        else {
            continue;
        };

        pass.set_bind_group(0, &scene_buffer.bind_group, &[]);
        pass.set_bind_group(1, &objects.bind_group, &[objects.offset(call_index as u32)]);
        pass.set_bind_group(3, material_group, &[]);
        pass.set_vertex_buffer(0, mesh.vertex_buffer().slice(..));
        pass.set_index_buffer(mesh.index_buffer().slice(..), wgpu::IndexFormat::Uint32);

        // One draw per light batch. The first batch uses the material's own
        // blend state; later batches accumulate additively with zero ambient.
        for (batch_index, _block) in batches.iter().enumerate() {
            let blend = if batch_index == 0 {
                base_blend
            } else {
                BlendKind::Accumulate
            };
            pass.set_pipeline(pipelines.get(PipelineKey { blend, two_sided }));
            pass.set_bind_group(
                2,
                &lights_buffer.bind_group,
                &[lights_buffer.offset(batch_index as u32)],
            );
            pass.draw_indexed(0..mesh.index_count(), 0, 0..1);
            stats.draws += 1;
        }
    }

    stats
}
