use std::collections::HashMap;

use anyhow::anyhow;
use imgui_wgpu::{RendererConfig, TextureConfig};
use wgpu::{CommandEncoder, TextureView};

use crate::{
    rendering::texture::texture_format, scene::material::TextureId, texture::TextureAsset,
};

pub struct ImguiRendererState {
    renderer: imgui_wgpu::Renderer,
    previews: HashMap<TextureId, imgui::TextureId>,
}

impl ImguiRendererState {
    pub const PREVIEW_SIZE: u32 = 64;

    pub fn render(
        &mut self,
        view: &TextureView,
        context: &mut imgui::Context,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut CommandEncoder,
    ) -> anyhow::Result<()> {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Imgui render pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let draw_data = context.render();

        // Workaround for memory safety related crash in imgui-rs
        // https://github.com/imgui-rs/imgui-rs/issues/325
        if draw_data.draw_lists_count() == 0 {
            return Ok(());
        }

        self.renderer
            .render(draw_data, queue, device, &mut render_pass)
            .map_err(|e| anyhow!("Rendering Imgui failed: {:?}", e))
    }

    /// Uploads a small copy of `asset` for display in the UI, once per texture.
    pub fn register_preview(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        id: TextureId,
        asset: &TextureAsset,
    ) -> imgui::TextureId {
        if let Some(&preview) = self.previews.get(&id) {
            return preview;
        }

        let size = Self::PREVIEW_SIZE;
        let texture = imgui_wgpu::Texture::new(device, &self.renderer, preview_config(asset));
        texture.write(queue, asset.resized(size, size).as_raw(), size, size);

        let preview = self.renderer.textures.insert(texture);
        self.previews.insert(id, preview);
        preview
    }

    pub fn preview(&self, id: TextureId) -> Option<imgui::TextureId> {
        self.previews.get(&id).copied()
    }
}

fn preview_config(asset: &TextureAsset) -> TextureConfig<'_> {
    let size = ImguiRendererState::PREVIEW_SIZE;

    TextureConfig {
        size: wgpu::Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: 1,
        },
        label: Some(&asset.name),
        // Normal maps are linear data, only colour textures get sRGB decoding.
        format: Some(texture_format(asset.kind)),
        ..Default::default()
    }
}

pub fn create_imgui_renderer(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture_format: wgpu::TextureFormat,
    context: &mut imgui::Context,
) -> ImguiRendererState {
    let renderer_config = RendererConfig {
        texture_format,
        ..Default::default()
    };

    let imgui_renderer = imgui_wgpu::Renderer::new(context, device, queue, renderer_config);

    ImguiRendererState {
        renderer: imgui_renderer,
        previews: HashMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::TextureKind;

    #[test]
    fn previews_keep_the_texture_encoding() {
        let color = TextureAsset::checkerboard("checker", 16, 2);
        let normals = TextureAsset::flat_normal("flat");

        assert_eq!(
            preview_config(&color).format,
            Some(wgpu::TextureFormat::Rgba8UnormSrgb)
        );
        assert_eq!(normals.kind, TextureKind::NormalMap);
        assert_eq!(
            preview_config(&normals).format,
            Some(wgpu::TextureFormat::Rgba8Unorm)
        );
        assert_eq!(preview_config(&normals).size.width, ImguiRendererState::PREVIEW_SIZE);
    }
}
