use glam::{Vec2, Vec3, Vec4};
use imgui::{Drag, TreeNodeFlags, Ui};

use crate::scene::{
    light::LightKind,
    material::{MaterialId, SurfaceShader, TextureId},
    Scene,
};

const PREVIEW_SIZE: f32 = 64.0;

/// Renderer state shown and edited by the debug window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererStatus {
    pub resolution: (u32, u32),
    pub vsync: bool,
}

pub fn draw_debug_window(
    ui: &Ui,
    scene: &mut Scene,
    status: &mut RendererStatus,
    preview: impl Fn(TextureId) -> Option<imgui::TextureId>,
) {
    ui.window("Inspector")
        .position([10.0, 10.0], imgui::Condition::FirstUseEver)
        .size([380.0, 640.0], imgui::Condition::FirstUseEver)
        .build(|| {
            draw_stats(ui, scene, status);

            if ui.collapsing_header("Meshes", TreeNodeFlags::empty()) {
                draw_meshes(ui, scene);
            }

            if ui.collapsing_header("Entities", TreeNodeFlags::empty()) {
                draw_entities(ui, scene);
            }

            if ui.collapsing_header("Materials", TreeNodeFlags::empty()) {
                draw_materials(ui, scene, &preview);
            }

            if ui.collapsing_header("Cameras", TreeNodeFlags::DEFAULT_OPEN) {
                draw_cameras(ui, scene);
            }

            if ui.collapsing_header("Lighting", TreeNodeFlags::empty()) {
                draw_lights(ui, scene);
            }
        });
}

fn draw_stats(ui: &Ui, scene: &mut Scene, status: &mut RendererStatus) {
    let framerate = ui.io().framerate;
    ui.text(format!(
        "Framerate: {:.0} fps ({:.2} ms)",
        framerate,
        1000.0 / framerate.max(f32::EPSILON)
    ));
    ui.text(format!(
        "Resolution: {}x{}",
        status.resolution.0, status.resolution.1
    ));

    let mut background = scene.background_color.to_array();
    if ui.color_edit4("Background", &mut background) {
        scene.background_color = Vec4::from_array(background);
    }

    let mut tint = scene.global_tint.to_array();
    if ui.color_edit4("Global tint", &mut tint) {
        scene.global_tint = Vec4::from_array(tint);
    }

    ui.checkbox("Vsync", &mut status.vsync);
    ui.slider("Spin speed", -5.0, 5.0, &mut scene.spin_speed);
    ui.separator();
}

fn draw_meshes(ui: &Ui, scene: &Scene) {
    for (i, (_, mesh)) in scene.meshes.iter().enumerate() {
        if let Some(_node) = ui.tree_node(format!("{}##mesh{}", mesh.name, i)) {
            ui.text(format!("Vertices: {}", mesh.vertex_count()));
            ui.text(format!("Indices: {}", mesh.index_count()));
            ui.text(format!("Triangles: {}", mesh.triangle_count()));
        }
    }
}

/// Material ids in arena order, with their names for combo boxes.
pub fn material_choices(scene: &Scene) -> (Vec<MaterialId>, Vec<String>) {
    scene
        .materials
        .iter()
        .map(|(id, material)| (id, material.name.clone()))
        .unzip()
}

fn draw_entities(ui: &Ui, scene: &mut Scene) {
    let (material_ids, material_names) = material_choices(scene);

    for i in 0..scene.entities.len() {
        let index_count = scene
            .meshes
            .get(scene.entities[i].mesh())
            .map_or(0, |mesh| mesh.index_count());
        let entity = &mut scene.entities[i];

        let Some(_node) = ui.tree_node(format!("{}##entity{}", entity.name, i)) else {
            continue;
        };

        let mut position = entity.transform.position().to_array();
        if Drag::new("Position")
            .speed(0.01)
            .build_array(ui, &mut position)
        {
            entity.transform.set_position(Vec3::from_array(position));
        }

        let mut rotation = entity.transform.rotation().to_array();
        if Drag::new("Rotation")
            .speed(0.01)
            .build_array(ui, &mut rotation)
        {
            entity.transform.set_rotation(Vec3::from_array(rotation));
        }

        let mut scale = entity.transform.scale().to_array();
        if Drag::new("Scale").speed(0.01).build_array(ui, &mut scale) {
            entity.transform.set_scale(Vec3::from_array(scale));
        }

        let mut selected = material_ids
            .iter()
            .position(|&id| id == entity.material())
            .unwrap_or(0);
        if ui.combo_simple_string("Material", &mut selected, &material_names) {
            if let Some(&material) = material_ids.get(selected) {
                entity.set_material(material);
            }
        }

        ui.text(format!("Mesh indices: {}", index_count));
    }
}

fn draw_materials(
    ui: &Ui,
    scene: &mut Scene,
    preview: &impl Fn(TextureId) -> Option<imgui::TextureId>,
) {
    let shader_names = SurfaceShader::ALL.map(SurfaceShader::name);

    for (i, (_, material)) in scene.materials.iter_mut().enumerate() {
        let Some(_node) = ui.tree_node(format!("{}##material{}", material.name, i)) else {
            continue;
        };

        let mut first = true;
        for (_, texture) in material.textures() {
            if let Some(texture_id) = preview(texture) {
                if !first {
                    ui.same_line();
                }
                imgui::Image::new(texture_id, [PREVIEW_SIZE, PREVIEW_SIZE]).build(ui);
                first = false;
            }
        }

        let mut tint = material.tint().to_array();
        if ui.color_edit4("Tint", &mut tint) {
            material.set_tint(Vec4::from_array(tint));
        }

        let mut roughness = material.roughness();
        if ui.slider("Roughness", 0.0, 1.0, &mut roughness) {
            material.set_roughness(roughness);
        }

        let mut uv_scale = material.uv_scale().to_array();
        if Drag::new("UV scale")
            .speed(0.01)
            .build_array(ui, &mut uv_scale)
        {
            material.set_uv_scale(Vec2::from_array(uv_scale));
        }

        let mut uv_offset = material.uv_offset().to_array();
        if Drag::new("UV offset")
            .speed(0.01)
            .build_array(ui, &mut uv_offset)
        {
            material.set_uv_offset(Vec2::from_array(uv_offset));
        }

        let mut shader = material.shader().index();
        if ui.combo_simple_string("Shader", &mut shader, &shader_names) {
            if let Some(&shader) = SurfaceShader::ALL.get(shader) {
                material.set_shader(shader);
            }
        }
    }
}

fn draw_cameras(ui: &Ui, scene: &mut Scene) {
    ui.text(format!(
        "Active camera: {} of {}",
        scene.active_camera_index() + 1,
        scene.cameras.len()
    ));

    let mut switch_to = None;
    for (i, camera) in scene.cameras.iter().enumerate() {
        let _id = ui.push_id_usize(i);

        if ui.button(format!("Camera {}", i + 1)) {
            switch_to = Some(i);
        }
        ui.same_line();

        let position = camera.position();
        ui.text(format!(
            "({:.2}, {:.2}, {:.2}), fov {:.0}",
            position.x,
            position.y,
            position.z,
            camera.fov().to_degrees()
        ));
    }

    if let Some(index) = switch_to {
        if let Err(e) = scene.set_active_camera(index) {
            log::warn!("{}", e);
        }
    }
}

fn draw_lights(ui: &Ui, scene: &mut Scene) {
    let mut ambient = scene.ambient_color.to_array();
    if ui.color_edit3("Ambient", &mut ambient) {
        scene.ambient_color = Vec3::from_array(ambient);
    }

    for (i, light) in scene.lights.iter_mut().enumerate() {
        let kind = match light.kind() {
            LightKind::Directional => "Directional",
            LightKind::Point => "Point",
            LightKind::Spot => "Spot",
        };

        let Some(_node) = ui.tree_node(format!("{} light##light{}", kind, i)) else {
            continue;
        };

        let mut color = light.color.to_array();
        if ui.color_edit3("Color", &mut color) {
            light.color = Vec3::from_array(color);
        }

        ui.slider("Intensity", 0.0, 10.0, &mut light.intensity);
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;
    use crate::{
        camera::Camera,
        mesh::primitives,
        scene::{entity::Entity, light::Light, material::Material},
    };

    fn demo_scene() -> Scene {
        let mut scene = Scene::new();
        let mesh = scene.add_mesh(primitives::cube().unwrap());
        let first = scene.add_material(Material::new("first", Vec4::ONE, SurfaceShader::Lit, 0.2));
        scene.add_material(Material::new("second", Vec4::ONE, SurfaceShader::Uvs, 0.8));
        scene.add_entity(Entity::new("cube", mesh, first));
        scene.add_camera(Camera::new(1.0, Vec3::ZERO, FRAC_PI_2, 1.0, 0.01));
        scene
            .add_light(Light::point(Vec3::Y, 5.0, Vec3::ONE, 1.0))
            .unwrap();
        scene
    }

    #[test]
    fn material_choices_follow_arena_order() {
        let scene = demo_scene();
        let (ids, names) = material_choices(&scene);

        assert_eq!(names, vec!["first".to_string(), "second".to_string()]);
        assert_eq!(ids[0], scene.entities[0].material());
    }

    #[test]
    fn debug_window_builds_without_a_gpu() {
        let mut context = imgui::Context::create();
        context.set_ini_filename(None);
        context.io_mut().display_size = [1280.0, 720.0];
        context.fonts().build_rgba32_texture();

        let mut scene = demo_scene();
        let mut status = RendererStatus {
            resolution: (1280, 720),
            vsync: true,
        };

        let ui = context.new_frame();
        draw_debug_window(ui, &mut scene, &mut status, |_| None);
        context.render();

        assert!(status.vsync);
        assert_eq!(scene.active_camera_index(), 0);
    }
}
