use std::{sync::Arc, time::Instant};

use anyhow::Context;
use imgui::{FontConfig, FontSource};
use imgui_winit_support::WinitPlatform;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::{
    config::AppConfig, demo::DemoState, engine, input::InputState, rendering::renderer::Renderer,
};

struct ImguiState {
    context: imgui::Context,
    platform: WinitPlatform,
}

struct App {
    config: AppConfig,
    renderer: Option<Renderer>,
    demo_state: DemoState,
    input: InputState,
    imgui: Option<ImguiState>,
    last_frame: Instant,
}

impl App {
    fn new(config: AppConfig, demo_state: DemoState) -> Self {
        Self {
            config,
            renderer: None,
            demo_state,
            input: InputState::new(),
            imgui: None,
            last_frame: Instant::now(),
        }
    }

    fn setup_imgui(window: &Window) -> ImguiState {
        let mut context = imgui::Context::create();
        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(
            context.io_mut(),
            window,
            imgui_winit_support::HiDpiMode::Default,
        );

        let font_size = 14.0;
        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 1,
                pixel_snap_h: true,
                size_pixels: font_size,
                ..Default::default()
            }),
        }]);

        // Disable INI support because it's broken in the published version of imgui
        context.set_ini_filename(None);

        ImguiState { context, platform }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let (width, height) = self.config.window_size;
        let window_attributes = Window::default_attributes()
            .with_title(self.config.window_title.clone())
            .with_inner_size(PhysicalSize::new(width, height));
        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .context("Failed to create window")?,
        );

        let mut imgui = Self::setup_imgui(&window);
        let renderer = pollster::block_on(Renderer::new(
            window.clone(),
            &self.config,
            &mut imgui.context,
        ))?;

        self.demo_state.scene.resize(renderer.aspect_ratio());
        self.renderer = Some(renderer);
        self.imgui = Some(imgui);
        self.last_frame = Instant::now();

        window.request_redraw();
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let (Some(renderer), Some(imgui)) = (self.renderer.as_mut(), self.imgui.as_mut()) else {
            return Ok(());
        };

        let delta_time = self.last_frame.elapsed();
        self.last_frame = Instant::now();
        imgui.context.io_mut().update_delta_time(delta_time);

        renderer.window.request_redraw();

        imgui
            .platform
            .prepare_frame(imgui.context.io_mut(), &renderer.window)
            .context("Failed to prepare Imgui frame")?;

        let io = imgui.context.io();
        self.input
            .set_capture(io.want_capture_keyboard, io.want_capture_mouse);

        let ui = imgui.context.new_frame();

        engine::update(
            &mut self.demo_state,
            renderer,
            &self.input,
            ui,
            delta_time.as_secs_f32(),
        )
        .context("Error during engine::update")?;

        imgui.platform.prepare_render(ui, &renderer.window);

        let time = self.demo_state.time();
        match renderer.render(&self.demo_state.scene, time, &mut imgui.context) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                renderer.resize(renderer.size);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of memory");
                event_loop.exit();
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timeout");
            }
            Err(other) => {
                log::error!("Unexpected error: {:?}", other);
            }
        }

        self.input.end_frame();
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }

        if let Err(e) = self.init(event_loop) {
            log::error!("Failed to start: {:?}", e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        self.input.handle_window_event(&event);

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(new_size);
                    self.demo_state.scene.resize(renderer.aspect_ratio());
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw(event_loop) {
                    log::error!("{:?}", e);
                    event_loop.exit();
                }
            }
            _ => (),
        }

        if let (Some(renderer), Some(imgui)) = (self.renderer.as_ref(), self.imgui.as_mut()) {
            imgui.platform.handle_event::<()>(
                imgui.context.io_mut(),
                &renderer.window,
                &Event::WindowEvent { window_id, event },
            );
        }
    }
}

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let (width, height) = config.window_size;
    let demo_state = DemoState::new(&config, width as f32 / height.max(1) as f32)
        .context("Failed to create demo state")?;
    let mut app = App::new(config, demo_state);
    event_loop.run_app(&mut app)?;

    Ok(())
}
