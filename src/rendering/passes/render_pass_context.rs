use std::sync::Arc;

use crate::rendering::{
    render_common::RenderCommon,
    shader_loader::{PipelineCache, PipelineCacheBuilder},
};

pub struct PassCreationContext<'a> {
    pub device: &'a wgpu::Device,
    pub common: Arc<RenderCommon>,
    pub cache_builder: &'a mut PipelineCacheBuilder,

    pub constants_layout: &'a wgpu::BindGroupLayout,
    pub material_layout: &'a wgpu::BindGroupLayout,
    pub sky_layout: &'a wgpu::BindGroupLayout,
}

pub struct RenderPassContext<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub pipeline_cache: &'a PipelineCache,
    /// The constant heap, bound at group 0 with per-draw dynamic offsets.
    pub constants: &'a wgpu::BindGroup,
}
