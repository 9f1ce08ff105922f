use std::sync::Arc;

use anyhow::Context;
use wgpu::CommandEncoderDescriptor;
use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    config::AppConfig,
    rendering::{
        config::RenderConfig,
        constant_heap::ConstantBufferHeap,
        frame_data::{FrameConstants, VertexShaderData},
        imgui_renderer::{create_imgui_renderer, ImguiRendererState},
        passes::{
            pass::Pass,
            render_pass_context::{PassCreationContext, RenderPassContext},
            scene_pass::{EntityDraw, ScenePass, SceneTextureViews},
            sky_pass::{SkyDraw, SkyPass, SkyTextureViews},
        },
        render_assets::RenderAssets,
        render_common::{present_mode, RenderCommon},
        shader_loader::{PipelineCacheBuilder, ShaderLoader},
        texture::DepthTexture,
    },
    scene::{material::TextureId, Scene},
};

pub struct Renderer {
    pub window: Arc<Window>,
    pub size: PhysicalSize<u32>,

    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,

    config: RenderConfig,
    common: Arc<RenderCommon>,
    depth_texture: DepthTexture,
    constants: ConstantBufferHeap,
    assets: RenderAssets,

    shader_loader: ShaderLoader,

    scene_pass: ScenePass,
    sky_pass: SkyPass,
    imgui_renderer: ImguiRendererState,
}

impl Renderer {
    pub async fn new(
        window: Arc<Window>,
        app_config: &AppConfig,
        imgui_context: &mut imgui::Context,
    ) -> anyhow::Result<Renderer> {
        let size = window.inner_size();
        let config = app_config.render.clone();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No compatible graphics adapter")?;

        log::info!("Using adapter {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to create device")?;

        let common = Arc::new(RenderCommon::new(
            &device,
            &adapter,
            &surface,
            size,
            config.vsync,
        ));

        let depth_texture = DepthTexture::new(&device, size, "Depth Texture");
        let constants = ConstantBufferHeap::new(&device, config.constant_heap_bytes);
        let assets = RenderAssets::new(&device, &queue, config.max_anisotropy);

        let mut cache_builder = PipelineCacheBuilder::new();
        let (scene_pass, sky_pass) = {
            let mut context = PassCreationContext {
                device: &device,
                common: common.clone(),
                cache_builder: &mut cache_builder,
                constants_layout: constants.bind_group_layout(),
                material_layout: assets.material_layout(),
                sky_layout: assets.sky_layout(),
            };

            (
                ScenePass::create(&mut context)?,
                SkyPass::create(&mut context)?,
            )
        };

        let shader_loader =
            ShaderLoader::new(device.clone(), app_config.shader_dir(), cache_builder)
                .context("Failed to load shaders")?;

        let imgui_renderer =
            create_imgui_renderer(&device, &queue, common.surface_format(), imgui_context);

        Ok(Self {
            window,
            size,
            surface,
            device,
            queue,
            config,
            common,
            depth_texture,
            constants,
            assets,
            shader_loader,
            scene_pass,
            sky_pass,
            imgui_renderer,
        })
    }

    /// Uploads new scene assets and their UI previews. Call before building the UI.
    pub fn prepare(&mut self, scene: &Scene) -> anyhow::Result<()> {
        self.assets.prepare(scene)?;

        for (id, texture) in scene.textures.iter() {
            self.imgui_renderer
                .register_preview(&self.device, &self.queue, id, texture);
        }

        Ok(())
    }

    pub fn ui_texture(&self, id: TextureId) -> Option<imgui::TextureId> {
        self.imgui_renderer.preview(id)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.size.width.max(1) as f32 / self.size.height.max(1) as f32
    }

    pub fn vsync(&self) -> bool {
        self.config.vsync
    }

    pub fn set_vsync(&mut self, vsync: bool) {
        if self.config.vsync == vsync {
            return;
        }

        self.config.vsync = vsync;
        self.reconfigure_surface();
        log::info!("Vsync {}", if vsync { "enabled" } else { "disabled" });
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.depth_texture.resize(&self.device, new_size);
            self.reconfigure_surface();
        }
    }

    fn reconfigure_surface(&mut self) {
        let mut config = match self.common.output_surface_config.write() {
            Ok(config) => config,
            Err(poisoned) => poisoned.into_inner(),
        };

        config.width = self.size.width.max(1);
        config.height = self.size.height.max(1);
        config.present_mode = present_mode(self.config.vsync);
        self.surface.configure(&self.device, &config);
    }

    pub fn render(
        &mut self,
        scene: &Scene,
        time: f32,
        imgui_context: &mut imgui::Context,
    ) -> Result<(), wgpu::SurfaceError> {
        self.shader_loader.load_pending_shaders();

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.constants.begin_frame();

        let mut entity_draws = Vec::with_capacity(scene.entities.len());
        let mut sky_draws = Vec::with_capacity(1);

        if let Some(camera) = scene.active_camera() {
            let frame = FrameConstants::new(scene, camera, time);

            for entity in &scene.entities {
                let (Some(material), Some(mesh), Some(bind_group)) = (
                    scene.materials.get(entity.material()),
                    self.assets.mesh(entity.mesh()),
                    self.assets.material_bind_group(entity.material()),
                ) else {
                    log::warn!("Skipping {}, its assets are not uploaded", entity.name);
                    continue;
                };

                let vertex_offset = self
                    .constants
                    .push(&VertexShaderData::new(&entity.transform, camera));
                let pixel_offset = self.constants.push(&frame.pixel_data(material));

                entity_draws.push(EntityDraw {
                    shader: material.shader(),
                    mesh,
                    material: bind_group,
                    offsets: [vertex_offset, pixel_offset],
                });
            }

            if let Some(sky) = &scene.sky {
                if let (Some(mesh), Some(cubemap)) =
                    (self.assets.mesh(sky.mesh), self.assets.sky_bind_group())
                {
                    let vertex_offset = self.constants.push(&VertexShaderData::for_sky(camera));
                    let pixel_offset = self.constants.push(&frame.unlit_pixel_data());

                    sky_draws.push(SkyDraw {
                        mesh,
                        cubemap,
                        offsets: [vertex_offset, pixel_offset],
                    });
                }
            }
        }

        self.constants.flush(&self.queue);

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut context = RenderPassContext {
                encoder: &mut encoder,
                pipeline_cache: &self.shader_loader.cache,
                constants: self.constants.bind_group(),
            };

            self.scene_pass.render(
                &mut context,
                &SceneTextureViews {
                    color: view.clone(),
                    depth: self.depth_texture.view().clone(),
                    clear_color: scene.background_color,
                },
                &entity_draws,
            );

            self.sky_pass.render(
                &mut context,
                &SkyTextureViews {
                    color: view.clone(),
                    depth: self.depth_texture.view().clone(),
                },
                &sky_draws,
            );
        }

        if let Err(e) = self.imgui_renderer.render(
            &view,
            imgui_context,
            &self.device,
            &self.queue,
            &mut encoder,
        ) {
            log::error!("{:?}", e);
        }

        self.queue.submit([encoder.finish()]);
        self.window.pre_present_notify();
        output.present();

        Ok(())
    }
}
