use anyhow::{bail, ensure};
use glam::{Vec3, Vec4};
use id_arena::Arena;

use crate::{
    camera::Camera,
    input::InputState,
    mesh::{Mesh, MeshId},
    texture::TextureAsset,
};

pub mod entity;
pub mod light;
pub mod material;
pub mod sky;
pub mod transform;

use entity::Entity;
use light::{Light, MAX_LIGHTS};
use material::{Material, MaterialId, TextureId};
use sky::Sky;

pub struct Scene {
    pub meshes: Arena<Mesh>,
    pub textures: Arena<TextureAsset>,
    pub materials: Arena<Material>,
    pub entities: Vec<Entity>,
    pub lights: Vec<Light>,
    pub cameras: Vec<Camera>,
    pub sky: Option<Sky>,

    pub ambient_color: Vec3,
    pub background_color: Vec4,
    /// Multiplied into every material's tint.
    pub global_tint: Vec4,
    /// Radians per second every entity yaws by.
    pub spin_speed: f32,

    active_camera: usize,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            meshes: Arena::new(),
            textures: Arena::new(),
            materials: Arena::new(),
            entities: Vec::new(),
            lights: Vec::new(),
            cameras: Vec::new(),
            sky: None,
            ambient_color: Vec3::splat(0.1),
            background_color: Vec4::new(0.4, 0.6, 0.75, 1.0),
            global_tint: Vec4::ONE,
            spin_speed: 1.0,
            active_camera: 0,
        }
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.alloc(mesh)
    }

    pub fn add_texture(&mut self, texture: TextureAsset) -> TextureId {
        self.textures.alloc(texture)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.alloc(material)
    }

    pub fn add_entity(&mut self, entity: Entity) -> usize {
        self.entities.push(entity);
        self.entities.len() - 1
    }

    pub fn add_light(&mut self, light: Light) -> anyhow::Result<usize> {
        ensure!(
            self.lights.len() < MAX_LIGHTS,
            "Scene already has the maximum of {MAX_LIGHTS} lights"
        );
        self.lights.push(light);
        Ok(self.lights.len() - 1)
    }

    pub fn add_camera(&mut self, camera: Camera) -> usize {
        self.cameras.push(camera);
        self.cameras.len() - 1
    }

    pub fn active_camera_index(&self) -> usize {
        self.active_camera
    }

    pub fn active_camera(&self) -> Option<&Camera> {
        self.cameras.get(self.active_camera)
    }

    pub fn set_active_camera(&mut self, index: usize) -> anyhow::Result<()> {
        if index >= self.cameras.len() {
            bail!(
                "Camera {index} does not exist, scene has {}",
                self.cameras.len()
            );
        }
        self.active_camera = index;
        Ok(())
    }

    /// Keeps every camera's projection in step with the window.
    pub fn resize(&mut self, aspect_ratio: f32) {
        for camera in &mut self.cameras {
            camera.update_projection(aspect_ratio);
        }
    }

    pub fn update(&mut self, dt: f32, input: &InputState) {
        if let Some(camera) = self.cameras.get_mut(self.active_camera) {
            camera.update(dt, input);
        }

        let spin = Vec3::new(0.0, self.spin_speed * dt, 0.0);
        for entity in &mut self.entities {
            entity.transform.rotate(spin);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use winit::keyboard::KeyCode;

    use super::*;
    use crate::{mesh::primitives, scene::material::SurfaceShader};

    fn scene_with_entity() -> Scene {
        let mut scene = Scene::new();
        let mesh = scene.add_mesh(primitives::cube().unwrap());
        let material = scene.add_material(Material::new(
            "plain",
            Vec4::ONE,
            SurfaceShader::Lit,
            0.5,
        ));
        scene.add_entity(Entity::new("cube", mesh, material));
        scene
    }

    #[test]
    fn lights_are_capped() {
        let mut scene = Scene::new();
        for _ in 0..MAX_LIGHTS {
            scene
                .add_light(Light::point(Vec3::ZERO, 5.0, Vec3::ONE, 1.0))
                .unwrap();
        }
        assert!(scene
            .add_light(Light::point(Vec3::ZERO, 5.0, Vec3::ONE, 1.0))
            .is_err());
        assert_eq!(scene.lights.len(), MAX_LIGHTS);
    }

    #[test]
    fn switching_to_a_missing_camera_fails() {
        let mut scene = Scene::new();
        assert!(scene.active_camera().is_none());

        scene.add_camera(Camera::new(1.0, Vec3::ZERO, FRAC_PI_2, 1.0, 0.01));
        scene.add_camera(Camera::new(1.0, Vec3::ONE, FRAC_PI_2, 1.0, 0.01));

        scene.set_active_camera(1).unwrap();
        assert_eq!(scene.active_camera().unwrap().position(), Vec3::ONE);
        assert!(scene.set_active_camera(2).is_err());
        assert_eq!(scene.active_camera_index(), 1);
    }

    #[test]
    fn resize_updates_every_camera() {
        let mut scene = Scene::new();
        scene.add_camera(Camera::new(1.0, Vec3::ZERO, FRAC_PI_2, 1.0, 0.01));
        scene.add_camera(Camera::new(1.0, Vec3::ZERO, FRAC_PI_2, 1.0, 0.01));

        scene.resize(2.0);
        assert!(scene.cameras.iter().all(|c| c.aspect_ratio() == 2.0));
    }

    #[test]
    fn update_spins_entities_and_moves_only_the_active_camera() {
        let mut scene = scene_with_entity();
        scene.add_camera(Camera::new(1.0, Vec3::ZERO, FRAC_PI_2, 1.0, 0.01));
        scene.add_camera(Camera::new(1.0, Vec3::ZERO, FRAC_PI_2, 1.0, 0.01));
        scene.spin_speed = 2.0;

        let mut input = InputState::new();
        input.set_key(KeyCode::KeyW, true);
        scene.update(0.25, &input);

        assert_eq!(scene.entities[0].transform.rotation(), Vec3::new(0.0, 0.5, 0.0));
        assert!(scene.cameras[0].position().z > 0.0);
        assert_eq!(scene.cameras[1].position(), Vec3::ZERO);
    }
}
