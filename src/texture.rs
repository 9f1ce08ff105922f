use std::path::Path;

use anyhow::Context;
use image::{imageops::FilterType, Rgba, RgbaImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    /// sRGB encoded colour.
    Color,
    /// Linear tangent-space normals.
    NormalMap,
}

/// Decoded RGBA8 image waiting to be uploaded.
#[derive(Debug, Clone)]
pub struct TextureAsset {
    pub name: String,
    pub kind: TextureKind,
    pub image: RgbaImage,
}

impl TextureAsset {
    pub fn load(path: impl AsRef<Path>, kind: TextureKind) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let image = image::open(path)
            .with_context(|| format!("Failed to load texture {}", path.display()))?
            .to_rgba8();

        Ok(Self {
            name: texture_name(path),
            kind,
            image,
        })
    }

    /// Loads `path`, or logs and returns `fallback` when the file can't be read.
    pub fn load_or(
        path: impl AsRef<Path>,
        kind: TextureKind,
        fallback: impl FnOnce() -> TextureAsset,
    ) -> Self {
        let path = path.as_ref();
        match Self::load(path, kind) {
            Ok(texture) => texture,
            Err(error) => {
                log::warn!("{error:#}, using a generated texture instead");
                let mut texture = fallback();
                texture.name = texture_name(path);
                texture
            }
        }
    }

    pub fn checkerboard(name: impl Into<String>, size: u32, cells: u32) -> Self {
        Self::two_tone_checkerboard(name, size, cells, [230, 230, 230], [40, 40, 40])
    }

    pub fn two_tone_checkerboard(
        name: impl Into<String>,
        size: u32,
        cells: u32,
        light: [u8; 3],
        dark: [u8; 3],
    ) -> Self {
        let cell_size = (size / cells.max(1)).max(1);
        let image = RgbaImage::from_fn(size, size, |x, y| {
            let [r, g, b] = if ((x / cell_size) + (y / cell_size)) % 2 == 0 {
                light
            } else {
                dark
            };
            Rgba([r, g, b, 255])
        });

        Self {
            name: name.into(),
            kind: TextureKind::Color,
            image,
        }
    }

    pub fn solid(name: impl Into<String>, kind: TextureKind, rgba: [u8; 4]) -> Self {
        Self {
            name: name.into(),
            kind,
            image: RgbaImage::from_pixel(1, 1, Rgba(rgba)),
        }
    }

    /// Normal map pointing straight out of the surface.
    pub fn flat_normal(name: impl Into<String>) -> Self {
        Self::solid(name, TextureKind::NormalMap, [128, 128, 255, 255])
    }

    /// Vertical gradient, used for sky faces that failed to load.
    pub fn gradient(name: impl Into<String>, size: u32, top: [u8; 3], bottom: [u8; 3]) -> Self {
        let image = RgbaImage::from_fn(size, size, |_, y| {
            let t = y as f32 / (size.max(2) - 1) as f32;
            let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
            Rgba([
                mix(top[0], bottom[0]),
                mix(top[1], bottom[1]),
                mix(top[2], bottom[2]),
                255,
            ])
        });

        Self {
            name: name.into(),
            kind: TextureKind::Color,
            image,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn resized(&self, width: u32, height: u32) -> RgbaImage {
        if self.width() == width && self.height() == height {
            return self.image.clone();
        }

        image::imageops::resize(&self.image, width, height, FilterType::Triangle)
    }
}

fn texture_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
