use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Lights beyond this count are not sent to the shaders.
pub const MAX_LIGHTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum LightKind {
    Directional = 0,
    Point = 1,
    Spot = 2,
}

/// Matches `Light` in `shaders/shared/frame.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Light {
    pub direction: Vec3,
    kind: u32,
    pub position: Vec3,
    pub range: f32,
    pub color: Vec3,
    pub intensity: f32,
    pub spot_inner_angle: f32,
    pub spot_outer_angle: f32,
    _padding: [f32; 2],
}

impl Light {
    pub fn directional(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            direction: direction.normalize_or_zero(),
            kind: LightKind::Directional as u32,
            color,
            intensity,
            ..Self::zeroed()
        }
    }

    pub fn point(position: Vec3, range: f32, color: Vec3, intensity: f32) -> Self {
        Self {
            kind: LightKind::Point as u32,
            position,
            range,
            color,
            intensity,
            ..Self::zeroed()
        }
    }

    /// Cone angles are half angles, measured from the spot axis to the cone edge, in radians.
    pub fn spot(
        position: Vec3,
        direction: Vec3,
        range: f32,
        inner_angle: f32,
        outer_angle: f32,
        color: Vec3,
        intensity: f32,
    ) -> Self {
        Self {
            direction: direction.normalize_or_zero(),
            kind: LightKind::Spot as u32,
            position,
            range,
            color,
            intensity,
            spot_inner_angle: inner_angle,
            spot_outer_angle: outer_angle.max(inner_angle),
            _padding: [0.0; 2],
        }
    }

    pub fn kind(&self) -> LightKind {
        match self.kind {
            1 => LightKind::Point,
            2 => LightKind::Spot,
            _ => LightKind::Directional,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::mem::{offset_of, size_of};

    use super::*;

    #[test]
    fn layout_matches_wgsl() {
        assert_eq!(size_of::<Light>(), 64);
        assert_eq!(offset_of!(Light, kind), 12);
        assert_eq!(offset_of!(Light, position), 16);
        assert_eq!(offset_of!(Light, range), 28);
        assert_eq!(offset_of!(Light, color), 32);
        assert_eq!(offset_of!(Light, intensity), 44);
        assert_eq!(offset_of!(Light, spot_inner_angle), 48);
    }

    #[test]
    fn constructors_set_kind() {
        let sun = Light::directional(Vec3::new(0.0, -2.0, 0.0), Vec3::ONE, 1.0);
        assert_eq!(sun.kind(), LightKind::Directional);
        assert_eq!(sun.direction, Vec3::NEG_Y);

        let bulb = Light::point(Vec3::ZERO, 10.0, Vec3::ONE, 1.0);
        assert_eq!(bulb.kind(), LightKind::Point);

        let spot = Light::spot(Vec3::ZERO, Vec3::NEG_Y, 10.0, 0.3, 0.1, Vec3::ONE, 3.0);
        assert_eq!(spot.kind(), LightKind::Spot);
        // The outer cone never ends up narrower than the inner one.
        assert_eq!(spot.spot_outer_angle, 0.3);
    }

    #[test]
    fn spot_angles_are_stored_as_half_angles() {
        let inner = 10f32.to_radians();
        let outer = 25f32.to_radians();
        let spot = Light::spot(Vec3::ZERO, Vec3::NEG_Y, 10.0, inner, outer, Vec3::ONE, 1.0);

        // The shader compares cos(angle) with the cosine of the axis to pixel angle.
        assert_eq!(spot.spot_inner_angle, inner);
        assert_eq!(spot.spot_outer_angle, outer);
    }
}
