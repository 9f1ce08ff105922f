use anyhow::Result;

mod camera;
mod config;
mod demo;
mod engine;
mod input;
mod mesh;
mod rendering;
mod scene;
mod texture;
mod ui;
mod window;

use config::AppConfig;

fn main() -> Result<()> {
    pretty_env_logger::init();

    pollster::block_on(window::run(AppConfig::default()))?;

    Ok(())
}
