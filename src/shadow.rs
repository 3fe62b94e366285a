//! Directional shadow map parameters.

use glam::{Mat4, Vec3};

/// Distance from the origin at which the shadow camera sits.
const LIGHT_DISTANCE: f32 = 20.0;
/// Half extent of the orthographic shadow volume.
const HALF_EXTENT: f32 = 7.5;
const NEAR: f32 = 1.0;
const FAR: f32 = 100.0;

/// Light-space matrices for the shadow pass plus the target resolution.
///
/// Computed once at setup from a fixed directional light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowMap {
    view: Mat4,
    projection: Mat4,
    resolution: u32,
}

impl ShadowMap {
    /// Looks along `direction` from 20 units back up that direction, with a
    /// 15x15 orthographic volume.
    ///
    /// When `direction` is (anti)parallel to world up, +Z is used as the up
    /// vector instead.
    pub fn from_directional(direction: Vec3, resolution: u32) -> Self {
        let direction = direction.normalize_or(Vec3::NEG_Y);
        let up = if direction.cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::Z
        } else {
            Vec3::Y
        };

        let view = Mat4::look_to_lh(-direction * LIGHT_DISTANCE, direction, up);
        let projection =
            Mat4::orthographic_lh(-HALF_EXTENT, HALF_EXTENT, -HALF_EXTENT, HALF_EXTENT, NEAR, FAR);

        Self {
            view,
            projection,
            resolution: resolution.max(1),
        }
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Width and height of the square depth target.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Vec3::new(0.0, 1.0, 0.0))]
    #[case(Vec3::new(0.0, -1.0, 0.0))]
    #[case(Vec3::new(-1.0, 0.0, 0.0))]
    #[case(Vec3::new(1.0, -1.0, 0.5))]
    fn matrices_are_finite(#[case] direction: Vec3) {
        let shadow = ShadowMap::from_directional(direction, 1024);
        assert!(shadow.view().is_finite());
        assert!(shadow.projection().is_finite());
    }

    #[test]
    fn origin_lands_mid_volume() {
        let shadow = ShadowMap::from_directional(Vec3::new(-1.0, 0.0, 0.0), 1024);
        let clip = shadow.projection() * shadow.view() * glam::Vec4::W;
        // 20 units away in a 1..100 depth range
        let expected_depth = (20.0 - NEAR) / (FAR - NEAR);
        assert!(clip.x.abs() < 1e-5 && clip.y.abs() < 1e-5);
        assert!((clip.z - expected_depth).abs() < 1e-5);
    }

    #[test]
    fn resolution_is_kept() {
        assert_eq!(ShadowMap::from_directional(Vec3::NEG_Y, 2048).resolution(), 2048);
        assert_eq!(ShadowMap::from_directional(Vec3::NEG_Y, 0).resolution(), 1);
    }
}
