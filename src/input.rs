use std::collections::HashSet;

use glam::Vec2;
use winit::{
    event::{ElementState, MouseButton, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

/// Keyboard and mouse state for the current frame.
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: HashSet<KeyCode>,
    left_mouse_down: bool,
    cursor_position: Option<Vec2>,
    mouse_delta: Vec2,
    keyboard_captured: bool,
    mouse_captured: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.set_key(code, event.state == ElementState::Pressed);
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.left_mouse_down = *state == ElementState::Pressed;
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.move_cursor(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor_position = None;
            }
            WindowEvent::Focused(false) => {
                self.keys_down.clear();
                self.left_mouse_down = false;
            }
            _ => (),
        }
    }

    pub fn set_key(&mut self, code: KeyCode, down: bool) {
        if down {
            self.keys_down.insert(code);
        } else {
            self.keys_down.remove(&code);
        }
    }

    pub fn set_left_mouse(&mut self, down: bool) {
        self.left_mouse_down = down;
    }

    pub fn move_cursor(&mut self, position: Vec2) {
        if let Some(previous) = self.cursor_position {
            self.mouse_delta += position - previous;
        }
        self.cursor_position = Some(position);
    }

    /// Set from the UI every frame; captured devices report nothing to the scene.
    pub fn set_capture(&mut self, keyboard: bool, mouse: bool) {
        self.keyboard_captured = keyboard;
        self.mouse_captured = mouse;
    }

    pub fn key_down(&self, code: KeyCode) -> bool {
        !self.keyboard_captured && self.keys_down.contains(&code)
    }

    pub fn left_mouse_down(&self) -> bool {
        !self.mouse_captured && self.left_mouse_down
    }

    /// Cursor movement in pixels since the previous frame.
    pub fn mouse_delta(&self) -> Vec2 {
        if self.mouse_captured {
            Vec2::ZERO
        } else {
            self.mouse_delta
        }
    }

    pub fn end_frame(&mut self) {
        self.mouse_delta = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_track_press_and_release() {
        let mut input = InputState::new();
        input.set_key(KeyCode::KeyW, true);
        assert!(input.key_down(KeyCode::KeyW));
        assert!(!input.key_down(KeyCode::KeyS));

        input.set_key(KeyCode::KeyW, false);
        assert!(!input.key_down(KeyCode::KeyW));
    }

    #[test]
    fn mouse_delta_accumulates_until_frame_end() {
        let mut input = InputState::new();
        input.move_cursor(Vec2::new(10.0, 10.0));
        assert_eq!(input.mouse_delta(), Vec2::ZERO);

        input.move_cursor(Vec2::new(13.0, 8.0));
        input.move_cursor(Vec2::new(15.0, 9.0));
        assert_eq!(input.mouse_delta(), Vec2::new(5.0, -1.0));

        input.end_frame();
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
    }

    #[test]
    fn captured_devices_report_nothing() {
        let mut input = InputState::new();
        input.set_key(KeyCode::Space, true);
        input.set_left_mouse(true);
        input.move_cursor(Vec2::ZERO);
        input.move_cursor(Vec2::new(4.0, 0.0));

        input.set_capture(true, true);
        assert!(!input.key_down(KeyCode::Space));
        assert!(!input.left_mouse_down());
        assert_eq!(input.mouse_delta(), Vec2::ZERO);

        input.set_capture(false, false);
        assert!(input.key_down(KeyCode::Space));
        assert!(input.left_mouse_down());
        assert_eq!(input.mouse_delta(), Vec2::new(4.0, 0.0));
    }
}
