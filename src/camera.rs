use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec3};
use winit::keyboard::KeyCode;

use crate::{input::InputState, scene::transform::Transform};

const DEFAULT_NEAR: f32 = 0.01;
const DEFAULT_FAR: f32 = 100.0;

/// Pitch stays just short of straight up/down so the view basis never degenerates.
const MAX_PITCH: f32 = FRAC_PI_2 - 0.01;

/// First person fly camera. Left handed, depth range 0..1.
#[derive(Debug, Clone)]
pub struct Camera {
    transform: Transform,
    fov: f32,
    aspect_ratio: f32,
    near: f32,
    far: f32,
    move_speed: f32,
    mouse_speed: f32,

    view: Mat4,
    projection: Mat4,
}

impl Camera {
    pub fn new(
        aspect_ratio: f32,
        position: Vec3,
        fov: f32,
        move_speed: f32,
        mouse_speed: f32,
    ) -> Self {
        let mut camera = Self {
            transform: Transform::from_position(position),
            fov,
            aspect_ratio,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            move_speed,
            mouse_speed,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        };

        camera.update_view();
        camera.update_projection(aspect_ratio);
        camera
    }

    pub fn with_clip_planes(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self.update_projection(self.aspect_ratio);
        self
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position()
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn update_projection(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
        self.projection = Mat4::perspective_lh(self.fov, aspect_ratio, self.near, self.far);
    }

    pub fn update_view(&mut self) {
        self.view = Mat4::look_to_lh(
            self.transform.position(),
            self.transform.forward(),
            self.transform.up(),
        );
    }

    pub fn update(&mut self, dt: f32, input: &InputState) {
        let step = self.move_speed * dt;

        let bindings = [
            (KeyCode::KeyW, Vec3::Z),
            (KeyCode::KeyS, Vec3::NEG_Z),
            (KeyCode::KeyA, Vec3::NEG_X),
            (KeyCode::KeyD, Vec3::X),
            (KeyCode::Space, Vec3::Y),
            (KeyCode::KeyX, Vec3::NEG_Y),
        ];

        for (key, direction) in bindings {
            if input.key_down(key) {
                self.transform.move_relative(direction * step);
            }
        }

        if input.left_mouse_down() {
            let delta = input.mouse_delta() * self.mouse_speed;
            self.transform.rotate(Vec3::new(delta.y, delta.x, 0.0));

            let rotation = self.transform.rotation();
            let pitch = rotation.x.clamp(-MAX_PITCH, MAX_PITCH);
            if pitch != rotation.x {
                self.transform
                    .set_rotation(Vec3::new(pitch, rotation.y, rotation.z));
            }
        }

        self.update_view();
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_4;

    use glam::{Vec2, Vec4};

    use super::*;

    const EPSILON: f32 = 1e-4;

    fn test_camera() -> Camera {
        Camera::new(16.0 / 9.0, Vec3::new(0.0, 0.0, -5.0), FRAC_PI_4, 2.0, 0.01)
    }

    #[test]
    fn view_maps_camera_to_origin_looking_down_z() {
        let camera = test_camera();
        let view = camera.view_matrix();

        assert!(view
            .transform_point3(Vec3::new(0.0, 0.0, -5.0))
            .abs_diff_eq(Vec3::ZERO, EPSILON));
        // A point in front of the camera ends up on +Z in view space.
        assert!(view.transform_point3(Vec3::ZERO).z > 0.0);
    }

    #[test]
    fn projection_depth_range_is_zero_to_one() {
        let camera = test_camera().with_clip_planes(0.1, 50.0);
        let projection = camera.projection_matrix();

        let near = projection * Vec4::new(0.0, 0.0, 0.1, 1.0);
        let far = projection * Vec4::new(0.0, 0.0, 50.0, 1.0);
        assert!((near.z / near.w).abs() < EPSILON);
        assert!((far.z / far.w - 1.0).abs() < EPSILON);
    }

    #[test]
    fn update_projection_tracks_aspect_ratio() {
        let mut camera = test_camera();
        let wide = camera.projection_matrix();
        camera.update_projection(1.0);

        assert_eq!(camera.aspect_ratio(), 1.0);
        assert!(camera.projection_matrix().x_axis.x > wide.x_axis.x);
    }

    #[test]
    fn keys_move_along_local_axes() {
        let mut camera = test_camera();
        let mut input = InputState::new();

        input.set_key(KeyCode::KeyW, true);
        camera.update(0.5, &input);
        assert!(camera
            .position()
            .abs_diff_eq(Vec3::new(0.0, 0.0, -4.0), EPSILON));

        input.set_key(KeyCode::KeyW, false);
        input.set_key(KeyCode::KeyA, true);
        input.set_key(KeyCode::Space, true);
        camera.update(1.0, &input);
        assert!(camera
            .position()
            .abs_diff_eq(Vec3::new(-2.0, 2.0, -4.0), EPSILON));
    }

    #[test]
    fn mouse_look_requires_left_button() {
        let mut camera = test_camera();
        let mut input = InputState::new();
        input.move_cursor(Vec2::ZERO);
        input.move_cursor(Vec2::new(50.0, 20.0));

        camera.update(0.016, &input);
        assert_eq!(camera.transform().rotation(), Vec3::ZERO);

        input.set_left_mouse(true);
        camera.update(0.016, &input);
        assert!(camera
            .transform()
            .rotation()
            .abs_diff_eq(Vec3::new(0.2, 0.5, 0.0), EPSILON));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = test_camera();
        let mut input = InputState::new();
        input.set_left_mouse(true);
        input.move_cursor(Vec2::ZERO);
        input.move_cursor(Vec2::new(0.0, 10_000.0));

        camera.update(0.016, &input);
        assert!((camera.transform().rotation().x - MAX_PITCH).abs() < EPSILON);

        input.end_frame();
        input.move_cursor(Vec2::new(0.0, -40_000.0));
        camera.update(0.016, &input);
        assert!((camera.transform().rotation().x + MAX_PITCH).abs() < EPSILON);
        assert!(!camera.view_matrix().is_nan());
    }
}
