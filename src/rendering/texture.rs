use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::texture::{TextureAsset, TextureKind};

pub struct Texture {
    _texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
}

impl Texture {
    pub fn from_wgpu_texture(texture: wgpu::Texture) -> Self {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            _texture: texture,
            view,
        }
    }

    pub fn from_asset(device: &wgpu::Device, queue: &wgpu::Queue, asset: &TextureAsset) -> Self {
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(&asset.name),
                size: wgpu::Extent3d {
                    width: asset.width(),
                    height: asset.height(),
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: texture_format(asset.kind),
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::wgt::TextureDataOrder::default(),
            asset.image.as_raw(),
        );

        Self::from_wgpu_texture(texture)
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

pub fn texture_format(kind: TextureKind) -> wgpu::TextureFormat {
    match kind {
        TextureKind::Color => wgpu::TextureFormat::Rgba8UnormSrgb,
        TextureKind::NormalMap => wgpu::TextureFormat::Rgba8Unorm,
    }
}

/// Six faces in +X, -X, +Y, -Y, +Z, -Z order, viewed as a cube.
pub struct Cubemap {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl Cubemap {
    pub fn from_faces(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        faces: [&TextureAsset; 6],
    ) -> Self {
        let size = cube_face_size(&faces);
        let (width, height) = (size, size);

        let mut data = Vec::with_capacity((width * height * 4 * 6) as usize);
        for face in faces {
            if (face.width(), face.height()) != (width, height) {
                log::warn!(
                    "Sky face {} is {}x{}, resizing to {}x{}",
                    face.name,
                    face.width(),
                    face.height(),
                    width,
                    height
                );
            }
            data.extend_from_slice(face.resized(width, height).as_raw());
        }

        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 6,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::wgt::TextureDataOrder::LayerMajor,
            &data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });

        Self {
            _texture: texture,
            view,
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

/// Edge length every cube face is resampled to. Cube views need square layers.
pub fn cube_face_size(faces: &[&TextureAsset]) -> u32 {
    faces
        .iter()
        .map(|face| face.width().max(face.height()))
        .max()
        .unwrap_or(1)
        .max(1)
}

/// Wrapping, anisotropically filtered sampler shared by every material and the sky.
/// Textures are uploaded without a mip chain, so only level 0 is ever sampled.
pub fn create_surface_sampler(device: &wgpu::Device, max_anisotropy: u16) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("Surface sampler"),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        lod_min_clamp: 0.0,
        lod_max_clamp: 32.0,
        compare: None,
        anisotropy_clamp: max_anisotropy.clamp(1, 16),
        border_color: None,
    })
}

pub struct DepthTexture {
    texture: Texture,
    label: String,
}

impl DepthTexture {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn new(device: &wgpu::Device, size: PhysicalSize<u32>, label: impl Into<String>) -> Self {
        let label: String = label.into();
        let texture = Self::create_wgpu_texture(device, size, &label);

        DepthTexture {
            texture: Texture::from_wgpu_texture(texture),
            label,
        }
    }

    fn create_wgpu_texture(
        device: &wgpu::Device,
        size: PhysicalSize<u32>,
        label: &str,
    ) -> wgpu::Texture {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
    }

    pub fn resize(&mut self, device: &wgpu::Device, size: PhysicalSize<u32>) {
        self.texture = Texture::from_wgpu_texture(Self::create_wgpu_texture(
            device,
            size,
            &self.label,
        ));
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.texture.view
    }
}

#[cfg(test)]
mod tests {
    use image::RgbaImage;

    use super::*;

    fn face(width: u32, height: u32) -> TextureAsset {
        TextureAsset {
            name: format!("{width}x{height}"),
            kind: TextureKind::Color,
            image: RgbaImage::new(width, height),
        }
    }

    #[test]
    fn cube_faces_are_square() {
        let wide = face(256, 128);
        let small = face(64, 64);

        assert_eq!(cube_face_size(&[&wide, &small, &small, &small, &small, &small]), 256);
        assert_eq!(cube_face_size(&[&small; 6]), 64);
    }

    #[test]
    fn normal_maps_are_linear() {
        assert_eq!(texture_format(TextureKind::Color), wgpu::TextureFormat::Rgba8UnormSrgb);
        assert_eq!(texture_format(TextureKind::NormalMap), wgpu::TextureFormat::Rgba8Unorm);
    }
}
