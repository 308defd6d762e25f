pub mod atlas_debug;
mod color_pass;
pub mod depth;
mod internal;
pub mod light_batch;
pub mod material;
pub mod primitives;
pub mod render_call;
#[allow(clippy::module_inception)]
mod renderer;
pub mod shadow_atlas;
mod shadow_pass;
pub mod texture;
pub mod uniforms;
pub mod vertex;

pub use atlas_debug::{page_layout, PageLayout, ATLAS_DEBUG_TILE_SIZE};
pub use depth::Depth;
pub use light_batch::{plan_light_batches, LightRaw, LightsBlock, MAX_LIGHTS_PER_BATCH};
pub use material::{AlphaMode, Material};
pub use render_call::{build_render_calls, compare_render_calls, sort_render_calls, RenderCall};
pub use renderer::{Renderer, RendererStats};
pub use shadow_atlas::{
    assign_shadow_slots, atlas_width, caster_signature, ShadowAtlas, SHADOW_TILE_SIZE,
};
pub use texture::Texture;
pub use uniforms::{ObjectUniform, SceneUniform};
pub use vertex::Vertex;
