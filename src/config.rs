use std::path::PathBuf;

use crate::rendering::config::RenderConfig;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub window_title: String,
    pub window_size: (u32, u32),
    pub asset_dir: PathBuf,
    pub render: RenderConfig,
    pub camera: CameraConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_title: "glint".to_string(),
            window_size: (1280, 720),
            asset_dir: PathBuf::from("assets"),
            render: RenderConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn shader_dir(&self) -> PathBuf {
        self.asset_dir.join("shaders")
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CameraConfig {
    pub near: f32,
    pub far: f32,
    pub move_speed: f32,
    pub mouse_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            near: 0.01,
            far: 100.0,
            move_speed: 1.0,
            mouse_speed: 0.01,
        }
    }
}
