use std::collections::HashMap;

use anyhow::Context;

use crate::{
    mesh::MeshId,
    rendering::{
        render_mesh::RenderMesh,
        texture::{create_surface_sampler, Cubemap, Texture},
    },
    scene::{
        material::{Material, MaterialId, TextureId},
        sky::Sky,
        Scene,
    },
    texture::{TextureAsset, TextureKind},
};

struct MaterialBinding {
    albedo: Option<TextureId>,
    normal: Option<TextureId>,
    bind_group: wgpu::BindGroup,
}

/// GPU copies of scene assets, created the first frame each asset is drawn.
pub struct RenderAssets {
    device: wgpu::Device,
    queue: wgpu::Queue,

    meshes: HashMap<MeshId, RenderMesh>,
    textures: HashMap<TextureId, Texture>,
    materials: HashMap<MaterialId, MaterialBinding>,
    sky: Option<([TextureId; 6], wgpu::BindGroup)>,

    default_albedo: Texture,
    default_normal: Texture,
    sampler: wgpu::Sampler,

    material_layout: wgpu::BindGroupLayout,
    sky_layout: wgpu::BindGroupLayout,
}

impl RenderAssets {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, max_anisotropy: u16) -> Self {
        let default_albedo = Texture::from_asset(
            device,
            queue,
            &TextureAsset::solid("Default albedo", TextureKind::Color, [255; 4]),
        );
        let default_normal =
            Texture::from_asset(device, queue, &TextureAsset::flat_normal("Default normal"));

        let texture_entry = |binding: u32, view_dimension: wgpu::TextureViewDimension| {
            wgpu::BindGroupLayoutEntry {
                binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension,
                    multisampled: false,
                },
                count: None,
            }
        };

        let sampler_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        };

        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material bind group layout"),
            entries: &[
                texture_entry(0, wgpu::TextureViewDimension::D2),
                texture_entry(1, wgpu::TextureViewDimension::D2),
                sampler_entry(2),
            ],
        });

        let sky_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sky bind group layout"),
            entries: &[
                texture_entry(0, wgpu::TextureViewDimension::Cube),
                sampler_entry(1),
            ],
        });

        Self {
            device: device.clone(),
            queue: queue.clone(),
            meshes: HashMap::new(),
            textures: HashMap::new(),
            materials: HashMap::new(),
            sky: None,
            default_albedo,
            default_normal,
            sampler: create_surface_sampler(device, max_anisotropy),
            material_layout,
            sky_layout,
        }
    }

    pub fn material_layout(&self) -> &wgpu::BindGroupLayout {
        &self.material_layout
    }

    pub fn sky_layout(&self) -> &wgpu::BindGroupLayout {
        &self.sky_layout
    }

    /// Uploads whatever the scene references that isn't on the GPU yet.
    pub fn prepare(&mut self, scene: &Scene) -> anyhow::Result<()> {
        for entity in &scene.entities {
            self.prepare_mesh(scene, entity.mesh())?;
            self.prepare_material(scene, entity.material())?;
        }

        if let Some(sky) = &scene.sky {
            self.prepare_mesh(scene, sky.mesh)?;
            self.prepare_sky(scene, sky)?;
        }

        Ok(())
    }

    fn prepare_mesh(&mut self, scene: &Scene, id: MeshId) -> anyhow::Result<()> {
        if self.meshes.contains_key(&id) {
            return Ok(());
        }

        let mesh = scene.meshes.get(id).context("Entity refers to a missing mesh")?;
        log::info!(
            "Uploading mesh {} ({} vertices, {} triangles)",
            mesh.name,
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        self.meshes.insert(id, RenderMesh::from_mesh(&self.device, mesh));

        Ok(())
    }

    fn prepare_texture(&mut self, scene: &Scene, id: TextureId) -> anyhow::Result<()> {
        if self.textures.contains_key(&id) {
            return Ok(());
        }

        let asset = scene
            .textures
            .get(id)
            .context("Material refers to a missing texture")?;
        log::info!(
            "Uploading texture {} ({}x{})",
            asset.name,
            asset.width(),
            asset.height()
        );
        self.textures
            .insert(id, Texture::from_asset(&self.device, &self.queue, asset));

        Ok(())
    }

    fn prepare_material(&mut self, scene: &Scene, id: MaterialId) -> anyhow::Result<()> {
        let material = scene
            .materials
            .get(id)
            .context("Entity refers to a missing material")?;

        let albedo = material.texture(Material::ALBEDO_SLOT);
        let normal = material.texture(Material::NORMAL_SLOT);

        if let Some(binding) = self.materials.get(&id) {
            if binding.albedo == albedo && binding.normal == normal {
                return Ok(());
            }
        }

        for texture in [albedo, normal].into_iter().flatten() {
            self.prepare_texture(scene, texture)?;
        }

        let albedo_view = match albedo {
            Some(texture) => self.textures[&texture].view(),
            None => self.default_albedo.view(),
        };
        let normal_view = match normal {
            Some(texture) => self.textures[&texture].view(),
            None => self.default_normal.view(),
        };

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("Material bind group ({})", material.name)),
            layout: &self.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(albedo_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(normal_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        self.materials.insert(
            id,
            MaterialBinding {
                albedo,
                normal,
                bind_group,
            },
        );

        Ok(())
    }

    fn prepare_sky(&mut self, scene: &Scene, sky: &Sky) -> anyhow::Result<()> {
        if matches!(&self.sky, Some((faces, _)) if *faces == sky.faces) {
            return Ok(());
        }

        let mut faces = Vec::with_capacity(6);
        for id in sky.faces {
            faces.push(scene.textures.get(id).context("Sky refers to a missing texture")?);
        }
        let faces: [&TextureAsset; 6] = faces
            .try_into()
            .map_err(|_| anyhow::anyhow!("Sky needs exactly six faces"))?;

        let cubemap = Cubemap::from_faces(&self.device, &self.queue, "Sky cubemap", faces);

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sky bind group"),
            layout: &self.sky_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(cubemap.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        self.sky = Some((sky.faces, bind_group));

        Ok(())
    }

    pub fn mesh(&self, id: MeshId) -> Option<&RenderMesh> {
        self.meshes.get(&id)
    }

    pub fn material_bind_group(&self, id: MaterialId) -> Option<&wgpu::BindGroup> {
        self.materials.get(&id).map(|binding| &binding.bind_group)
    }

    pub fn sky_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.sky.as_ref().map(|(_, bind_group)| bind_group)
    }
}
