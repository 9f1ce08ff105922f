use std::collections::BTreeMap;

use glam::{Vec2, Vec4};
use id_arena::Id;

use crate::texture::TextureAsset;

pub type TextureId = Id<TextureAsset>;
pub type MaterialId = Id<Material>;

/// Which fragment program a material is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceShader {
    Lit,
    Layered,
    Uvs,
    Normals,
    Custom,
}

impl SurfaceShader {
    pub const ALL: [SurfaceShader; 5] = [
        SurfaceShader::Lit,
        SurfaceShader::Layered,
        SurfaceShader::Uvs,
        SurfaceShader::Normals,
        SurfaceShader::Custom,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SurfaceShader::Lit => "Lit",
            SurfaceShader::Layered => "Layered",
            SurfaceShader::Uvs => "UVs",
            SurfaceShader::Normals => "Normals",
            SurfaceShader::Custom => "Custom",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|&shader| shader == self)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    tint: Vec4,
    shader: SurfaceShader,
    roughness: f32,
    uv_scale: Vec2,
    uv_offset: Vec2,
    textures: BTreeMap<u32, TextureId>,
}

impl Material {
    pub const ALBEDO_SLOT: u32 = 0;
    pub const NORMAL_SLOT: u32 = 1;

    pub fn new(name: impl Into<String>, tint: Vec4, shader: SurfaceShader, roughness: f32) -> Self {
        Self {
            name: name.into(),
            tint,
            shader,
            roughness: roughness.clamp(0.0, 1.0),
            uv_scale: Vec2::ONE,
            uv_offset: Vec2::ZERO,
            textures: BTreeMap::new(),
        }
    }

    pub fn tint(&self) -> Vec4 {
        self.tint
    }

    pub fn set_tint(&mut self, tint: Vec4) {
        self.tint = tint;
    }

    pub fn shader(&self) -> SurfaceShader {
        self.shader
    }

    pub fn set_shader(&mut self, shader: SurfaceShader) {
        self.shader = shader;
    }

    pub fn roughness(&self) -> f32 {
        self.roughness
    }

    pub fn set_roughness(&mut self, roughness: f32) {
        self.roughness = roughness.clamp(0.0, 1.0);
    }

    pub fn uv_scale(&self) -> Vec2 {
        self.uv_scale
    }

    pub fn set_uv_scale(&mut self, scale: Vec2) {
        self.uv_scale = scale;
    }

    pub fn uv_offset(&self) -> Vec2 {
        self.uv_offset
    }

    pub fn set_uv_offset(&mut self, offset: Vec2) {
        self.uv_offset = offset;
    }

    pub fn set_texture(&mut self, slot: u32, texture: TextureId) {
        self.textures.insert(slot, texture);
    }

    pub fn with_texture(mut self, slot: u32, texture: TextureId) -> Self {
        self.set_texture(slot, texture);
        self
    }

    pub fn texture(&self, slot: u32) -> Option<TextureId> {
        self.textures.get(&slot).copied()
    }

    pub fn textures(&self) -> impl Iterator<Item = (u32, TextureId)> + '_ {
        self.textures.iter().map(|(&slot, &id)| (slot, id))
    }
}

#[cfg(test)]
mod tests {
    use id_arena::Arena;

    use super::*;
    use crate::texture::TextureKind;

    #[test]
    fn missing_texture_slot_is_none() {
        let mut textures: Arena<TextureAsset> = Arena::new();
        let albedo = textures.alloc(TextureAsset::checkerboard("albedo", 4, 1));

        let material = Material::new("stone", Vec4::ONE, SurfaceShader::Lit, 0.5)
            .with_texture(Material::ALBEDO_SLOT, albedo);

        assert_eq!(material.texture(Material::ALBEDO_SLOT), Some(albedo));
        assert_eq!(material.texture(Material::NORMAL_SLOT), None);
        assert_eq!(textures[albedo].kind, TextureKind::Color);
    }

    #[test]
    fn new_material_has_identity_uv_transform() {
        let material = Material::new("plain", Vec4::ONE, SurfaceShader::Uvs, 2.0);
        assert_eq!(material.uv_scale(), Vec2::ONE);
        assert_eq!(material.uv_offset(), Vec2::ZERO);
        assert_eq!(material.roughness(), 1.0);
    }

    #[test]
    fn shader_index_round_trips() {
        for (index, shader) in SurfaceShader::ALL.iter().enumerate() {
            assert_eq!(shader.index(), index);
        }
    }
}
