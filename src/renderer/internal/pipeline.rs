use std::collections::HashMap;

use crate::renderer::internal::RenderContext;
use crate::renderer::{AlphaMode, Depth, Vertex};

/// Blend state for one scene draw. `Accumulate` is the additive state used by
/// every light batch after the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum BlendKind {
    Opaque,
    Alpha,
    Accumulate,
}

impl BlendKind {
    pub(crate) fn for_material(mode: AlphaMode) -> Self {
        match mode {
            AlphaMode::Blend => Self::Alpha,
            _ => Self::Opaque,
        }
    }

    fn state(self) -> Option<wgpu::BlendState> {
        match self {
            Self::Opaque => None,
            Self::Alpha => Some(wgpu::BlendState::ALPHA_BLENDING),
            Self::Accumulate => Some(wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct PipelineKey {
    pub(crate) blend: BlendKind,
    pub(crate) two_sided: bool,
}

/// All color-pass pipeline permutations, built once up front. Depth compare
/// is LessEqual everywhere so accumulation batches pass depth-equal
/// fragments; state never leaks between draws because each draw sets its own
/// pipeline.
pub(crate) struct ScenePipelines {
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    pub(crate) material_layout: wgpu::BindGroupLayout,
}

impl ScenePipelines {
    pub(crate) fn new(
        context: &RenderContext,
        scene_layout: &wgpu::BindGroupLayout,
        object_layout: &wgpu::BindGroupLayout,
        lights_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let device = &context.device;

        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("MaterialBindLayout"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                texture_entry(2),
                texture_entry(3),
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("SceneShader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../shader/scene.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("ScenePipelineLayout"),
            bind_group_layouts: &[scene_layout, object_layout, lights_layout, &material_layout],
            push_constant_ranges: &[],
        });

        let mut pipelines = HashMap::new();
        for blend in [BlendKind::Opaque, BlendKind::Alpha, BlendKind::Accumulate] {
            for two_sided in [false, true] {
                let key = PipelineKey { blend, two_sided };
                pipelines.insert(
                    key,
                    Self::create_pipeline(context, &pipeline_layout, &shader, key),
                );
            }
        }

        Self {
            pipelines,
            material_layout,
        }
    }

    pub(crate) fn get(&self, key: PipelineKey) -> &wgpu::RenderPipeline {
        &self.pipelines[&key]
    }

    fn create_pipeline(
        context: &RenderContext,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        key: PipelineKey,
    ) -> wgpu::RenderPipeline {
        context
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("ScenePipeline"),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: context.config.format,
                        blend: key.blend.state(),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: if key.two_sided {
                        None
                    } else {
                        Some(wgpu::Face::Back)
                    },
                    front_face: wgpu::FrontFace::Ccw,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: Depth::FORMAT,
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
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}
