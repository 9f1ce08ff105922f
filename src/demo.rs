use std::{
    f32::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_4},
    path::Path,
    time::Instant,
};

use anyhow::Context;
use glam::{Vec3, Vec4};

use crate::{
    camera::Camera,
    config::AppConfig,
    input::InputState,
    mesh::{obj::load_obj_file, primitives::Primitive, Mesh},
    scene::{
        entity::Entity,
        light::Light,
        material::{Material, MaterialId, SurfaceShader, TextureId},
        sky::Sky,
        Scene,
    },
    texture::{TextureAsset, TextureKind},
};

const MESHES: [(&str, Primitive); 7] = [
    ("cube", Primitive::Cube),
    ("cylinder", Primitive::Cylinder),
    ("helix", Primitive::Helix),
    ("quad", Primitive::Quad),
    ("quad_double_sided", Primitive::DoubleSidedQuad),
    ("sphere", Primitive::Sphere),
    ("torus", Primitive::Torus),
];

/// Mesh (index into `MESHES`) and material for each entity, left to right.
const ENTITIES: [(usize, usize); 7] = [(3, 0), (4, 1), (2, 2), (6, 0), (0, 1), (5, 2), (1, 0)];
const ENTITY_SPACING: f32 = 3.0;

pub struct DemoState {
    pub scene: Scene,
    pub start_time: Instant,
}

impl DemoState {
    pub fn new(config: &AppConfig, aspect_ratio: f32) -> anyhow::Result<Self> {
        let scene = build_scene(config, aspect_ratio)?;

        Ok(Self {
            scene,
            start_time: Instant::now(),
        })
    }

    pub fn time(&self) -> f32 {
        self.start_time.elapsed().as_secs_f32()
    }

    pub fn update(&mut self, dt: f32, input: &InputState) {
        self.scene.update(dt, input);
    }
}

/// Loads `<dir>/<name>.obj`, or builds `fallback` if the file is missing or broken.
pub fn load_mesh_or(dir: &Path, name: &str, fallback: Primitive) -> anyhow::Result<Mesh> {
    let path = dir.join(format!("{name}.obj"));

    if path.exists() {
        match load_obj_file(&path) {
            Ok(mesh) => return Ok(mesh),
            Err(e) => log::warn!("{e:#}, generating {name} instead"),
        }
    } else {
        log::info!("{} not found, generating {name}", path.display());
    }

    let mut mesh = fallback.build()?;
    mesh.name = name.to_string();
    Ok(mesh)
}

fn load_material(
    scene: &mut Scene,
    texture_dir: &Path,
    name: &str,
    shader: SurfaceShader,
    roughness: f32,
    fallback_colors: ([u8; 3], [u8; 3]),
) -> MaterialId {
    let (light, dark) = fallback_colors;
    let albedo = TextureAsset::load_or(
        texture_dir.join(format!("{name}.png")),
        TextureKind::Color,
        || TextureAsset::two_tone_checkerboard(name, 256, 8, light, dark),
    );
    let normal = TextureAsset::load_or(
        texture_dir.join(format!("{name}_normals.png")),
        TextureKind::NormalMap,
        || TextureAsset::flat_normal(name),
    );

    let albedo = scene.add_texture(albedo);
    let normal = scene.add_texture(normal);

    scene.add_material(
        Material::new(name, Vec4::ONE, shader, roughness)
            .with_texture(Material::ALBEDO_SLOT, albedo)
            .with_texture(Material::NORMAL_SLOT, normal),
    )
}

fn load_sky(scene: &mut Scene, sky_dir: &Path) -> [TextureId; 6] {
    const HORIZON: [u8; 3] = [200, 215, 235];
    const ZENITH: [u8; 3] = [60, 110, 190];
    const GROUND: [u8; 3] = [70, 65, 60];

    Sky::FACE_NAMES.map(|face| {
        let (top, bottom) = match face {
            "up" => (ZENITH, ZENITH),
            "down" => (GROUND, GROUND),
            _ => (ZENITH, HORIZON),
        };

        let texture = TextureAsset::load_or(
            sky_dir.join(format!("{face}.png")),
            TextureKind::Color,
            || TextureAsset::gradient(face, 256, top, bottom),
        );
        scene.add_texture(texture)
    })
}

pub fn build_scene(config: &AppConfig, aspect_ratio: f32) -> anyhow::Result<Scene> {
    let mut scene = Scene::new();
    let mesh_dir = config.asset_dir.join("meshes");
    let texture_dir = config.asset_dir.join("textures");

    let materials = [
        load_material(
            &mut scene,
            &texture_dir,
            "cobblestone",
            SurfaceShader::Lit,
            0.2,
            ([150, 145, 140], [90, 85, 80]),
        ),
        load_material(
            &mut scene,
            &texture_dir,
            "cushion",
            SurfaceShader::Lit,
            0.8,
            ([200, 60, 60], [120, 30, 40]),
        ),
        load_material(
            &mut scene,
            &texture_dir,
            "rock",
            SurfaceShader::Layered,
            1.0,
            ([140, 110, 80], [100, 75, 55]),
        ),
    ];

    let mut meshes = Vec::with_capacity(MESHES.len());
    for (name, fallback) in MESHES {
        let mesh = load_mesh_or(&mesh_dir, name, fallback)
            .with_context(|| format!("Failed to create mesh {name}"))?;
        meshes.push(scene.add_mesh(mesh));
    }

    let first_x = -(ENTITIES.len() as f32 - 1.0) / 2.0 * ENTITY_SPACING;
    for (i, (mesh, material)) in ENTITIES.into_iter().enumerate() {
        let mut entity = Entity::new(MESHES[mesh].0, meshes[mesh], materials[material]);
        entity
            .transform
            .move_absolute(Vec3::new(first_x + i as f32 * ENTITY_SPACING, 0.0, 0.0));
        scene.add_entity(entity);
    }

    for light in [
        Light::directional(Vec3::X, Vec3::new(1.0, 0.0, 0.0), 1.0),
        Light::directional(Vec3::NEG_X, Vec3::new(0.0, 0.0, 1.0), 1.0),
        Light::directional(Vec3::NEG_Y, Vec3::new(0.0, 1.0, 0.0), 1.0),
        Light::point(Vec3::new(-5.0, 5.0, 0.0), 20.0, Vec3::splat(0.9), 1.0),
        Light::spot(
            Vec3::new(-9.0, 2.0, 0.0),
            Vec3::NEG_Y,
            10.0,
            10f32.to_radians(),
            25f32.to_radians(),
            Vec3::splat(0.9),
            3.0,
        ),
    ] {
        scene.add_light(light)?;
    }
    scene.ambient_color = Vec3::new(0.78, 0.52, 0.77);

    let camera = config.camera;
    for (position, fov) in [
        (Vec3::new(0.0, 1.0, -8.0), FRAC_PI_2),
        (Vec3::new(0.0, 0.0, -2.0), FRAC_PI_3),
        (Vec3::new(0.0, 0.0, -3.0), FRAC_PI_4),
    ] {
        scene.add_camera(
            Camera::new(
                aspect_ratio,
                position,
                fov,
                camera.move_speed,
                camera.mouse_speed,
            )
            .with_clip_planes(camera.near, camera.far),
        );
    }

    let sky_faces = load_sky(&mut scene, &texture_dir.join("sky"));
    scene.sky = Some(Sky::new(sky_faces, meshes[0]));

    log::info!(
        "Demo scene: {} meshes, {} textures, {} materials, {} entities, {} lights",
        scene.meshes.len(),
        scene.textures.len(),
        scene.materials.len(),
        scene.entities.len(),
        scene.lights.len()
    );

    Ok(scene)
}
