use crate::{
    demo::DemoState,
    input::InputState,
    rendering::renderer::Renderer,
    ui::{draw_debug_window, RendererStatus},
};

/// One frame of game logic: upload new assets, build the UI, then move the scene.
pub fn update(
    state: &mut DemoState,
    renderer: &mut Renderer,
    input: &InputState,
    ui: &imgui::Ui,
    dt: f32,
) -> anyhow::Result<()> {
    renderer.prepare(&state.scene)?;

    let mut status = RendererStatus {
        resolution: (renderer.size.width, renderer.size.height),
        vsync: renderer.vsync(),
    };
    draw_debug_window(ui, &mut state.scene, &mut status, |id| {
        renderer.ui_texture(id)
    });
    renderer.set_vsync(status.vsync);

    state.update(dt, input);

    Ok(())
}
