use glam::Vec4;
use wgpu::{Device, RenderPassDescriptor};

use crate::{
    rendering::{
        passes::{
            create_mesh_pipeline,
            pass::Pass,
            render_pass_context::{PassCreationContext, RenderPassContext},
            MeshPipelineDescriptor,
        },
        render_mesh::RenderMesh,
        shader_loader::{PipelineId, ShaderDefinition},
    },
    scene::material::SurfaceShader,
};

pub fn shader_definition(shader: SurfaceShader) -> ShaderDefinition {
    match shader {
        SurfaceShader::Lit => ShaderDefinition {
            name: "Lit shader",
            path: "lit.wgsl",
        },
        SurfaceShader::Layered => ShaderDefinition {
            name: "Layered shader",
            path: "layered.wgsl",
        },
        SurfaceShader::Uvs => ShaderDefinition {
            name: "UV debug shader",
            path: "uvs.wgsl",
        },
        SurfaceShader::Normals => ShaderDefinition {
            name: "Normal debug shader",
            path: "normals.wgsl",
        },
        SurfaceShader::Custom => ShaderDefinition {
            name: "Custom shader",
            path: "custom.wgsl",
        },
    }
}

pub struct EntityDraw<'a> {
    pub shader: SurfaceShader,
    pub mesh: &'a RenderMesh,
    pub material: &'a wgpu::BindGroup,
    /// Vertex then pixel data offsets into the constant heap.
    pub offsets: [wgpu::DynamicOffset; 2],
}

pub struct SceneTextureViews {
    pub color: wgpu::TextureView,
    pub depth: wgpu::TextureView,
    pub clear_color: Vec4,
}

/// Clears the frame and draws every entity with its material's pipeline.
pub struct ScenePass {
    pipeline_ids: [PipelineId; SurfaceShader::ALL.len()],
}

impl Pass for ScenePass {
    type TextureViews = SceneTextureViews;
    type Draw<'a> = EntityDraw<'a>;

    fn create(context: &mut PassCreationContext) -> anyhow::Result<Self> {
        let render_pipeline_layout =
            context
                .device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("Scene pipeline layout"),
                    bind_group_layouts: &[context.constants_layout, context.material_layout],
                    push_constant_ranges: &[],
                });

        let pipeline_ids = SurfaceShader::ALL.map(|shader| {
            let layout = render_pipeline_layout.clone();
            let common = context.common.clone();

            context.cache_builder.add_shader(
                shader_definition(shader),
                Box::new(
                    move |device: &Device, shader_def: &ShaderDefinition, source: &str| {
                        Ok(create_mesh_pipeline(
                            device,
                            shader_def,
                            source,
                            &MeshPipelineDescriptor {
                                layout: &layout,
                                format: common.surface_format(),
                                cull_mode: wgpu::Face::Back,
                                depth_write_enabled: true,
                                depth_compare: wgpu::CompareFunction::Less,
                            },
                        ))
                    },
                ),
            )
        });

        Ok(Self { pipeline_ids })
    }

    fn render(
        &self,
        context: &mut RenderPassContext,
        texture_views: &Self::TextureViews,
        draws: &[EntityDraw],
    ) {
        let clear = texture_views.clear_color.as_dvec4();

        let mut render_pass = context.encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("Scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &texture_views.color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: clear.x,
                        g: clear.y,
                        b: clear.z,
                        a: clear.w,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &texture_views.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        for draw in draws {
            let Some(pipeline) = context
                .pipeline_cache
                .get(self.pipeline_ids[draw.shader.index()])
            else {
                continue;
            };

            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(0, context.constants, &draw.offsets);
            render_pass.set_bind_group(1, draw.material, &[]);
            draw.mesh.draw(&mut render_pass);
        }
    }
}
