use wgpu::{
    DepthBiasState, MultisampleState, PipelineCompilationOptions, ShaderSource, StencilState,
};

use crate::rendering::{
    render_mesh::RENDER_MESH_VBL, shader_loader::ShaderDefinition, texture::DepthTexture,
};

pub mod pass;
pub mod render_pass_context;
pub mod scene_pass;
pub mod sky_pass;

pub struct MeshPipelineDescriptor<'a> {
    pub layout: &'a wgpu::PipelineLayout,
    pub format: wgpu::TextureFormat,
    pub cull_mode: wgpu::Face,
    pub depth_write_enabled: bool,
    pub depth_compare: wgpu::CompareFunction,
}

/// Pipeline drawing `RenderMesh` vertices, clockwise front faces, into the surface and
/// depth buffer.
pub fn create_mesh_pipeline(
    device: &wgpu::Device,
    shader_def: &ShaderDefinition,
    source: &str,
    desc: &MeshPipelineDescriptor,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(shader_def.name),
        source: ShaderSource::Wgsl(source.into()),
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(shader_def.name),
        layout: Some(desc.layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[RENDER_MESH_VBL],
            compilation_options: PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: desc.format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Cw,
            cull_mode: Some(desc.cull_mode),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DepthTexture::DEPTH_FORMAT,
            depth_write_enabled: desc.depth_write_enabled,
            depth_compare: desc.depth_compare,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
