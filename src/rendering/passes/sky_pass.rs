use wgpu::{Device, RenderPassDescriptor};

use crate::rendering::{
    passes::{
        create_mesh_pipeline,
        pass::Pass,
        render_pass_context::{PassCreationContext, RenderPassContext},
        MeshPipelineDescriptor,
    },
    render_mesh::RenderMesh,
    shader_loader::{PipelineId, ShaderDefinition},
};

const SKY_SHADER: ShaderDefinition = ShaderDefinition {
    name: "Sky shader",
    path: "sky.wgsl",
};

pub struct SkyDraw<'a> {
    pub mesh: &'a RenderMesh,
    pub cubemap: &'a wgpu::BindGroup,
    pub offsets: [wgpu::DynamicOffset; 2],
}

pub struct SkyTextureViews {
    pub color: wgpu::TextureView,
    pub depth: wgpu::TextureView,
}

/// Draws the inside of the sky cube at the far plane, behind what the scene pass wrote.
pub struct SkyPass {
    pipeline_id: PipelineId,
}

impl Pass for SkyPass {
    type TextureViews = SkyTextureViews;
    type Draw<'a> = SkyDraw<'a>;

    fn create(context: &mut PassCreationContext) -> anyhow::Result<Self> {
        let layout = context
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Sky pipeline layout"),
                bind_group_layouts: &[context.constants_layout, context.sky_layout],
                push_constant_ranges: &[],
            });
        let common = context.common.clone();

        let pipeline_id = context.cache_builder.add_shader(
            SKY_SHADER,
            Box::new(
                move |device: &Device, shader_def: &ShaderDefinition, source: &str| {
                    Ok(create_mesh_pipeline(
                        device,
                        shader_def,
                        source,
                        &MeshPipelineDescriptor {
                            layout: &layout,
                            format: common.surface_format(),
                            cull_mode: wgpu::Face::Front,
                            depth_write_enabled: false,
                            depth_compare: wgpu::CompareFunction::LessEqual,
                        },
                    ))
                },
            ),
        );

        Ok(Self { pipeline_id })
    }

    fn render(
        &self,
        context: &mut RenderPassContext,
        texture_views: &Self::TextureViews,
        draws: &[SkyDraw],
    ) {
        let Some(pipeline) = context.pipeline_cache.get(self.pipeline_id) else {
            return;
        };

        let mut render_pass = context.encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("Sky pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &texture_views.color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &texture_views.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_pipeline(pipeline);

        for draw in draws {
            render_pass.set_bind_group(0, context.constants, &draw.offsets);
            render_pass.set_bind_group(1, draw.cubemap, &[]);
            draw.mesh.draw(&mut render_pass);
        }
    }
}
