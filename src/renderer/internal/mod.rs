mod buffers;
mod context;
mod materials;
mod pipeline;

pub(crate) use buffers::{DynamicUniformBuffer, SceneBuffer};
pub(crate) use context::RenderContext;
pub(crate) use materials::MaterialBinder;
pub(crate) use pipeline::{BlendKind, PipelineKey, ScenePipelines};
