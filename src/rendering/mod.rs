pub mod config;
pub mod constant_heap;
pub mod frame_data;
pub mod imgui_renderer;
pub mod passes;
pub mod render_assets;
pub mod render_common;
pub mod render_mesh;
pub mod renderer;
pub mod shader_loader;
pub mod texture;
