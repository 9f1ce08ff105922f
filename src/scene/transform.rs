use std::cell::Cell;

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Position, pitch/yaw/roll rotation and non-uniform scale of an object.
///
/// The world matrix is rebuilt lazily the first time it is read after any of the
/// three vectors changed.
#[derive(Debug, Clone)]
pub struct Transform {
    position: Vec3,
    rotation: Vec3,
    scale: Vec3,

    world_matrix: Cell<Mat4>,
    world_inverse_transpose_matrix: Cell<Mat4>,
    dirty: Cell<bool>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            world_matrix: Cell::new(Mat4::IDENTITY),
            world_inverse_transpose_matrix: Cell::new(Mat4::IDENTITY),
            dirty: Cell::new(false),
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        let mut transform = Self::new();
        transform.set_position(position);
        transform
    }

    fn invalidate(&self) {
        self.dirty.set(true);
    }

    fn rebuild_if_dirty(&self) {
        if !self.dirty.get() {
            return;
        }

        let world = Mat4::from_scale_rotation_translation(
            self.scale,
            self.orientation(),
            self.position,
        );

        self.world_matrix.set(world);
        self.world_inverse_transpose_matrix
            .set(world.transpose().inverse());
        self.dirty.set(false);
    }

    /// Roll about Z first, then pitch about X, then yaw about Y.
    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.rotation.y, self.rotation.x, self.rotation.z)
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Pitch, yaw and roll in radians.
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.invalidate();
    }

    pub fn set_rotation(&mut self, pitch_yaw_roll: Vec3) {
        self.rotation = pitch_yaw_roll;
        self.invalidate();
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.invalidate();
    }

    pub fn move_absolute(&mut self, offset: Vec3) {
        self.position += offset;
        self.invalidate();
    }

    /// Moves along the object's own axes.
    pub fn move_relative(&mut self, offset: Vec3) {
        self.position += self.orientation() * offset;
        self.invalidate();
    }

    pub fn rotate(&mut self, pitch_yaw_roll: Vec3) {
        self.rotation += pitch_yaw_roll;
        self.invalidate();
    }

    pub fn scale_by(&mut self, factor: Vec3) {
        self.scale *= factor;
        self.invalidate();
    }

    pub fn right(&self) -> Vec3 {
        self.orientation() * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.orientation() * Vec3::Y
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::Z
    }

    pub fn world_matrix(&self) -> Mat4 {
        self.rebuild_if_dirty();
        self.world_matrix.get()
    }

    pub fn world_inverse_transpose_matrix(&self) -> Mat4 {
        self.rebuild_if_dirty();
        self.world_inverse_transpose_matrix.get()
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn default_is_identity() {
        let transform = Transform::new();
        assert_eq!(transform.world_matrix(), Mat4::IDENTITY);
        assert_eq!(transform.world_inverse_transpose_matrix(), Mat4::IDENTITY);
        assert_eq!(transform.scale(), Vec3::ONE);
    }

    #[test]
    fn world_matrix_is_scale_then_rotate_then_translate() {
        let mut transform = Transform::new();
        transform.set_position(Vec3::new(1.0, -2.0, 3.0));
        transform.set_rotation(Vec3::new(0.3, 1.1, -0.4));
        transform.set_scale(Vec3::new(2.0, 0.5, 1.5));

        let scale = Mat4::from_scale(Vec3::new(2.0, 0.5, 1.5));
        let rotation = Mat4::from_rotation_y(1.1)
            * Mat4::from_rotation_x(0.3)
            * Mat4::from_rotation_z(-0.4);
        let translation = Mat4::from_translation(Vec3::new(1.0, -2.0, 3.0));
        let expected = translation * rotation * scale;

        assert!(transform.world_matrix().abs_diff_eq(expected, EPSILON));

        let point = Vec3::new(1.0, 1.0, 1.0);
        let by_steps = translation.transform_point3(
            rotation.transform_point3(scale.transform_point3(point)),
        );
        assert!(transform
            .world_matrix()
            .transform_point3(point)
            .abs_diff_eq(by_steps, EPSILON));
    }

    #[test]
    fn cached_matrix_follows_mutations() {
        let mut transform = Transform::new();
        let before = transform.world_matrix();

        transform.move_absolute(Vec3::new(0.0, 5.0, 0.0));
        let after = transform.world_matrix();

        assert_ne!(before, after);
        assert!(after.w_axis.abs_diff_eq(glam::Vec4::new(0.0, 5.0, 0.0, 1.0), EPSILON));
    }

    #[test]
    fn inverse_transpose_matches_world() {
        let mut transform = Transform::new();
        transform.set_rotation(Vec3::new(0.2, 0.7, 0.1));
        transform.set_scale(Vec3::new(1.0, 3.0, 2.0));

        let expected = transform.world_matrix().inverse().transpose();
        assert!(transform
            .world_inverse_transpose_matrix()
            .abs_diff_eq(expected, EPSILON));
    }

    #[test]
    fn move_relative_follows_yaw() {
        let mut transform = Transform::new();
        transform.set_rotation(Vec3::new(0.0, FRAC_PI_2, 0.0));
        transform.move_relative(Vec3::new(0.0, 0.0, 1.0));

        // Yawing a quarter turn points local +Z along world +X.
        assert!(transform.position().abs_diff_eq(Vec3::X, EPSILON));
    }

    #[test]
    fn move_absolute_ignores_rotation() {
        let mut transform = Transform::new();
        transform.set_rotation(Vec3::new(0.0, FRAC_PI_2, 0.0));
        transform.move_absolute(Vec3::Z);
        assert!(transform.position().abs_diff_eq(Vec3::Z, EPSILON));
    }

    #[test]
    fn axes_are_orthonormal() {
        let mut transform = Transform::new();
        transform.set_rotation(Vec3::new(0.4, -1.3, 0.8));

        let (right, up, forward) = (transform.right(), transform.up(), transform.forward());
        assert!((right.length() - 1.0).abs() < EPSILON);
        assert!(right.dot(up).abs() < EPSILON);
        assert!(up.dot(forward).abs() < EPSILON);
        assert!(right.cross(up).abs_diff_eq(forward, EPSILON));
    }

    #[test]
    fn rotate_and_scale_accumulate() {
        let mut transform = Transform::new();
        transform.rotate(Vec3::new(0.0, 0.5, 0.0));
        transform.rotate(Vec3::new(0.1, 0.5, 0.0));
        transform.scale_by(Vec3::splat(2.0));
        transform.scale_by(Vec3::new(1.0, 3.0, 0.5));

        assert!(transform
            .rotation()
            .abs_diff_eq(Vec3::new(0.1, 1.0, 0.0), EPSILON));
        assert_eq!(transform.scale(), Vec3::new(2.0, 6.0, 1.0));
    }
}
