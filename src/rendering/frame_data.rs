use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::{
    camera::Camera,
    scene::{
        light::{Light, MAX_LIGHTS},
        material::Material,
        transform::Transform,
        Scene,
    },
};

/// Per-draw vertex stage data. Matches `VertexShaderData` in `shaders/shared/frame.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct VertexShaderData {
    pub world: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub world_inverse_transpose: Mat4,
}

impl VertexShaderData {
    pub fn new(transform: &Transform, camera: &Camera) -> Self {
        Self {
            world: transform.world_matrix(),
            view: camera.view_matrix(),
            projection: camera.projection_matrix(),
            world_inverse_transpose: transform.world_inverse_transpose_matrix(),
        }
    }

    pub fn for_sky(camera: &Camera) -> Self {
        Self {
            world: Mat4::IDENTITY,
            view: camera.view_matrix(),
            projection: camera.projection_matrix(),
            world_inverse_transpose: Mat4::IDENTITY,
        }
    }
}

/// Per-draw fragment stage data. Matches `PixelShaderData` in `shaders/shared/frame.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PixelShaderData {
    pub color_tint: Vec4,
    pub uv_scale: Vec2,
    pub uv_offset: Vec2,
    pub camera_position: Vec3,
    pub roughness: f32,
    pub ambient_color: Vec3,
    pub time: f32,
    pub lights: [Light; MAX_LIGHTS],
    pub light_count: u32,
    _padding: [u32; 3],
}

/// Fields shared by every draw in a frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameConstants {
    pub camera_position: Vec3,
    pub ambient_color: Vec3,
    pub global_tint: Vec4,
    pub time: f32,
    pub lights: [Light; MAX_LIGHTS],
    pub light_count: u32,
}

impl FrameConstants {
    pub fn new(scene: &Scene, camera: &Camera, time: f32) -> Self {
        let mut lights = [Light::zeroed(); MAX_LIGHTS];
        let light_count = scene.lights.len().min(MAX_LIGHTS);
        lights[..light_count].copy_from_slice(&scene.lights[..light_count]);

        Self {
            camera_position: camera.position(),
            ambient_color: scene.ambient_color,
            global_tint: scene.global_tint,
            time,
            lights,
            light_count: light_count as u32,
        }
    }

    pub fn pixel_data(&self, material: &Material) -> PixelShaderData {
        PixelShaderData {
            color_tint: material.tint() * self.global_tint,
            uv_scale: material.uv_scale(),
            uv_offset: material.uv_offset(),
            roughness: material.roughness(),
            ..self.unlit_pixel_data()
        }
    }

    /// Pixel data for draws without a material, such as the sky.
    pub fn unlit_pixel_data(&self) -> PixelShaderData {
        PixelShaderData {
            color_tint: self.global_tint,
            uv_scale: Vec2::ONE,
            uv_offset: Vec2::ZERO,
            camera_position: self.camera_position,
            roughness: 1.0,
            ambient_color: self.ambient_color,
            time: self.time,
            lights: self.lights,
            light_count: self.light_count,
            _padding: [0; 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        f32::consts::FRAC_PI_2,
        mem::{offset_of, size_of},
    };

    use super::*;
    use crate::scene::material::SurfaceShader;

    #[test]
    fn layouts_match_wgsl() {
        assert_eq!(size_of::<VertexShaderData>(), 256);

        assert_eq!(offset_of!(PixelShaderData, uv_scale), 16);
        assert_eq!(offset_of!(PixelShaderData, uv_offset), 24);
        assert_eq!(offset_of!(PixelShaderData, camera_position), 32);
        assert_eq!(offset_of!(PixelShaderData, roughness), 44);
        assert_eq!(offset_of!(PixelShaderData, ambient_color), 48);
        assert_eq!(offset_of!(PixelShaderData, time), 60);
        assert_eq!(offset_of!(PixelShaderData, lights), 64);
        assert_eq!(offset_of!(PixelShaderData, light_count), 384);
        assert_eq!(size_of::<PixelShaderData>(), 400);
    }

    #[test]
    fn pixel_data_combines_material_and_frame() {
        let mut scene = Scene::new();
        scene.global_tint = Vec4::new(0.5, 1.0, 1.0, 1.0);
        scene.ambient_color = Vec3::new(0.1, 0.2, 0.3);
        scene
            .add_light(Light::directional(Vec3::X, Vec3::ONE, 1.0))
            .unwrap();
        let camera = Camera::new(1.0, Vec3::new(1.0, 2.0, 3.0), FRAC_PI_2, 1.0, 0.01);

        let tint = Vec4::new(1.0, 0.5, 1.0, 1.0);
        let mut material = Material::new("m", tint, SurfaceShader::Lit, 0.3);
        material.set_uv_scale(Vec2::splat(2.0));

        let frame = FrameConstants::new(&scene, &camera, 4.5);
        let data = frame.pixel_data(&material);

        assert_eq!(data.color_tint, Vec4::new(0.5, 0.5, 1.0, 1.0));
        assert_eq!(data.uv_scale, Vec2::splat(2.0));
        assert_eq!(data.roughness, 0.3);
        assert_eq!(data.camera_position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(data.ambient_color, Vec3::new(0.1, 0.2, 0.3));
        assert_eq!(data.time, 4.5);
        assert_eq!(data.light_count, 1);
        assert_eq!(data.lights[0], scene.lights[0]);
        assert_eq!(data.lights[1], Light::zeroed());
    }

    #[test]
    fn vertex_data_carries_entity_and_camera_matrices() {
        let camera = Camera::new(1.5, Vec3::new(0.0, 0.0, -3.0), FRAC_PI_2, 1.0, 0.01);
        let mut transform = Transform::new();
        transform.set_position(Vec3::new(2.0, 0.0, 0.0));

        let data = VertexShaderData::new(&transform, &camera);
        assert_eq!(data.world, transform.world_matrix());
        assert_eq!(data.view, camera.view_matrix());
        assert_eq!(data.projection, camera.projection_matrix());

        let sky = VertexShaderData::for_sky(&camera);
        assert_eq!(sky.world, Mat4::IDENTITY);
    }
}
