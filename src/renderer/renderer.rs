use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::asset::Assets;
use crate::renderer::atlas_debug::AtlasDebugViewer;
use crate::renderer::color_pass;
use crate::renderer::internal::{
    DynamicUniformBuffer, MaterialBinder, RenderContext, SceneBuffer, ScenePipelines,
};
use crate::renderer::light_batch::{plan_light_batches, LightsBlock};
use crate::renderer::render_call::build_render_calls;
use crate::renderer::shadow_atlas::{assign_shadow_slots, caster_signature, ShadowAtlas};
use crate::renderer::shadow_pass::ShadowPass;
use crate::renderer::uniforms::{ObjectUniform, SceneUniform};
use crate::renderer::Material;
use crate::scene::{Camera, Scene};
use crate::settings::RenderSettings;

const INITIAL_CALL_CAPACITY: u32 = 256;
const INITIAL_BATCH_CAPACITY: u32 = 8;

/// Per-frame counters for the stats overlay and tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct RendererStats {
    pub render_calls: u32,
    pub culled_calls: u32,
    pub light_batches: u32,
    pub color_draws: u32,
    pub shadow_draws: u32,
    pub shadow_tiles: u32,
}

/// The renderer façade: owns the device, pipelines and per-frame buffers, and
/// sequences build → sort → atlas upkeep → shadow pass → color pass → debug
/// viewer. Scene and camera are passed in per call; there are no globals.
pub struct Renderer {
    context: RenderContext,
    pipelines: ScenePipelines,
    scene_buffer: SceneBuffer,
    objects: DynamicUniformBuffer,
    lights_buffer: DynamicUniformBuffer,
    materials: MaterialBinder,
    shadow_pass: ShadowPass,
    atlas_debug: AtlasDebugViewer,
    stats: RendererStats,
}

impl Renderer {
    pub async fn new(window: &Window, settings: &RenderSettings) -> Self {
        let size = window.inner_size();
        let context = RenderContext::new(window, size, settings).await;

        let scene_buffer = SceneBuffer::new(&context.device);
        let objects = DynamicUniformBuffer::new::<ObjectUniform>(
            &context.device,
            "ObjectUniformBuffer",
            wgpu::ShaderStages::VERTEX_FRAGMENT,
            INITIAL_CALL_CAPACITY,
        );
        let lights_buffer = DynamicUniformBuffer::new::<LightsBlock>(
            &context.device,
            "LightBatchBuffer",
            wgpu::ShaderStages::FRAGMENT,
            INITIAL_BATCH_CAPACITY,
        );

        let pipelines = ScenePipelines::new(
            &context,
            &scene_buffer.bind_layout,
            &objects.bind_layout,
            &lights_buffer.bind_layout,
        );
        let materials =
            MaterialBinder::new(&context.device, &context.queue, &pipelines.material_layout);
        let shadow_pass = ShadowPass::new(&context, &objects.bind_layout, &pipelines.material_layout);
        let atlas_debug = AtlasDebugViewer::new(&context);

        Self {
            context,
            pipelines,
            scene_buffer,
            objects,
            lights_buffer,
            materials,
            shadow_pass,
            atlas_debug,
            stats: RendererStats::default(),
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.context.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.context.queue
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.context.resize(new_size);
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.context.aspect_ratio()
    }

    pub fn last_frame_stats(&self) -> RendererStats {
        self.stats
    }

    /// Draw one frame with exactly one active camera. `atlas_page` requests
    /// the shadow-atlas inspector for that page; the clamped page index comes
    /// back so the caller can keep its cursor in range.
    pub fn render(
        &mut self,
        scene: &mut Scene,
        camera: &Camera,
        assets: &Assets,
        time: f32,
        atlas_page: Option<u32>,
    ) -> Result<Option<u32>, wgpu::SurfaceError> {
        let frame = self.context.surface.get_current_texture()?;
        let surface_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut stats = RendererStats::default();

        // Ephemeral, rebuilt every frame: one call per visible, fully
        // specified renderable, sorted for drawing.
        let calls = build_render_calls(scene, camera, assets);
        stats.render_calls = calls.len() as u32;

        self.maintain_atlas(scene);
        stats.shadow_tiles = scene
            .shadow_atlas
            .as_ref()
            .map(|atlas| atlas.tile_count)
            .unwrap_or(0);

        let fallback_material = Material::default();
        let object_uniforms: Vec<ObjectUniform> = calls
            .iter()
            .map(|call| {
                let material = assets
                    .materials
                    .get(call.material)
                    .unwrap_or(&fallback_material);
                ObjectUniform::new(call.model, material)
            })
            .collect();
        self.objects.upload(&self.context, &object_uniforms);

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("FrameEncoder"),
            });

        // Shadow pass first: the color pass samples the atlas, and this is
        // also what aims every caster's shadow camera for batching below.
        if let Some(atlas) = &scene.shadow_atlas {
            stats.shadow_draws = self.shadow_pass.render(
                &self.context,
                &mut encoder,
                atlas,
                &mut scene.lights,
                &calls,
                assets,
                &self.objects,
                &mut self.materials,
            );
        }

        let batches = plan_light_batches(
            &scene.lights,
            scene.ambient_light,
            scene.shadow_atlas.is_some(),
        );
        stats.light_batches = batches.len() as u32;
        self.lights_buffer.upload(&self.context, &batches);

        let aspect = self.context.aspect_ratio();
        self.scene_buffer.write(
            &self.context.queue,
            &SceneUniform::new(camera.view_proj(aspect), camera.eye, time, stats.shadow_tiles),
        );

        let frustum = camera.frustum(aspect);
        let pass_stats = color_pass::record(
            &self.context,
            &mut encoder,
            &surface_view,
            &self.pipelines,
            &self.scene_buffer,
            &self.objects,
            &self.lights_buffer,
            &batches,
            &calls,
            &frustum,
            assets,
            &mut self.materials,
        );
        stats.color_draws = pass_stats.draws;
        stats.culled_calls = pass_stats.culled_calls;

        let mut clamped_page = None;
        if let (Some(page), Some(atlas)) = (atlas_page, &scene.shadow_atlas) {
            clamped_page = self.atlas_debug.render(
                &self.context,
                &mut encoder,
                &surface_view,
                atlas,
                &scene.lights,
                page,
            );
        }

        self.context.queue.submit(Some(encoder.finish()));
        frame.present();

        self.stats = stats;
        Ok(clamped_page)
    }

    /// Rebuild the atlas whenever the ordered cast-shadow set changed: slots
    /// are reassigned sequentially and the depth texture is reallocated at
    /// tile width × caster count (or torn down at zero casters).
    fn maintain_atlas(&mut self, scene: &mut Scene) {
        let signature = caster_signature(&scene.lights);
        let up_to_date = match &scene.shadow_atlas {
            Some(atlas) => atlas.matches(&signature),
            None => signature.is_empty(),
        };
        if up_to_date {
            return;
        }

        let tile_count = assign_shadow_slots(&mut scene.lights);
        scene.shadow_atlas = ShadowAtlas::build(&self.context.device, tile_count, signature);
        self.scene_buffer.rebind(
            &self.context.device,
            scene.shadow_atlas.as_ref().map(|atlas| &atlas.view),
        );
    }
}
