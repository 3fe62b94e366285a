//! Spatial state for entities and cameras.
//!
//! A [`Transform`] stores position, Euler rotation (pitch, yaw, roll in
//! radians) and per-axis scale. The world matrix, its inverse-transpose and
//! the orientation basis vectors are derived lazily:
//!
//! - the matrix cache is invalidated by every position, rotation or scale change;
//! - the orientation cache is invalidated by rotation changes only.
//!
//! Both caches use interior mutability so accessors can take `&self` while
//! the renderer walks the scene.
//!
//! # Conventions
//!
//! The renderer is left-handed (+Z forward, +Y up, +X right). Rotation is
//! applied roll (Z) first, then pitch (X), then yaw (Y). The world matrix is
//! Scale, then Rotation, then Translation, i.e. `T * R * S` in glam's
//! column-vector notation.
//!
//! ```
//! use glint::{Transform, Vec3};
//!
//! let mut transform = Transform::new();
//! transform.set_position(Vec3::new(0.0, 2.0, 0.0));
//! transform.scale_by(Vec3::splat(2.0));
//!
//! let world = transform.world_matrix();
//! assert_eq!(world.transform_point3(Vec3::ZERO), Vec3::new(0.0, 2.0, 0.0));
//! ```

use std::cell::Cell;

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Position, rotation and scale with cached derived matrices.
#[derive(Clone, Debug)]
pub struct Transform {
    position: Vec3,
    pitch_yaw_roll: Vec3,
    scale: Vec3,

    world: Cell<Mat4>,
    world_inverse_transpose: Cell<Mat4>,
    matrix_dirty: Cell<bool>,

    right: Cell<Vec3>,
    up: Cell<Vec3>,
    forward: Cell<Vec3>,
    orientation_dirty: Cell<bool>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            pitch_yaw_roll: Vec3::ZERO,
            scale: Vec3::ONE,
            world: Cell::new(Mat4::IDENTITY),
            world_inverse_transpose: Cell::new(Mat4::IDENTITY),
            matrix_dirty: Cell::new(false),
            right: Cell::new(Vec3::X),
            up: Cell::new(Vec3::Y),
            forward: Cell::new(Vec3::Z),
            orientation_dirty: Cell::new(false),
        }
    }
}

impl Transform {
    /// Identity transform: origin, no rotation, unit scale.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a transform from its three components.
    pub fn from_parts(position: Vec3, pitch_yaw_roll: Vec3, scale: Vec3) -> Self {
        let mut transform = Self::new();
        transform.set_position(position);
        transform.set_rotation(pitch_yaw_roll);
        transform.set_scale(scale);
        transform
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.matrix_dirty.set(true);
    }

    /// Overwrites pitch, yaw and roll (radians).
    pub fn set_rotation(&mut self, pitch_yaw_roll: Vec3) {
        self.pitch_yaw_roll = pitch_yaw_roll;
        self.matrix_dirty.set(true);
        self.orientation_dirty.set(true);
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.matrix_dirty.set(true);
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Pitch (x), yaw (y) and roll (z) in radians.
    pub fn pitch_yaw_roll(&self) -> Vec3 {
        self.pitch_yaw_roll
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Moves along the world axes.
    pub fn move_absolute(&mut self, offset: Vec3) {
        self.position += offset;
        self.matrix_dirty.set(true);
    }

    /// Moves along this transform's local axes.
    ///
    /// The offset is rotated by the current orientation before being added,
    /// so `Vec3::Z` always means "forward".
    pub fn move_relative(&mut self, offset: Vec3) {
        self.position += self.orientation() * offset;
        self.matrix_dirty.set(true);
    }

    /// Adds to pitch, yaw and roll.
    pub fn rotate(&mut self, pitch_yaw_roll: Vec3) {
        self.pitch_yaw_roll += pitch_yaw_roll;
        self.matrix_dirty.set(true);
        self.orientation_dirty.set(true);
    }

    /// Multiplies the current scale component-wise.
    pub fn scale_by(&mut self, factor: Vec3) {
        self.scale *= factor;
        self.matrix_dirty.set(true);
    }

    /// Orientation quaternion for the current Euler angles.
    pub fn orientation(&self) -> Quat {
        let Vec3 {
            x: pitch,
            y: yaw,
            z: roll,
        } = self.pitch_yaw_roll;
        Quat::from_euler(EulerRot::YXZ, yaw, pitch, roll)
    }

    /// Object-to-world matrix, recomputed only after a mutation.
    pub fn world_matrix(&self) -> Mat4 {
        if self.matrix_dirty.get() {
            let world =
                Mat4::from_scale_rotation_translation(self.scale, self.orientation(), self.position);
            self.world.set(world);
            self.world_inverse_transpose
                .set(world.transpose().inverse());
            self.matrix_dirty.set(false);
        }
        self.world.get()
    }

    /// Inverse-transpose of the world matrix, for transforming normals.
    ///
    /// A zero scale makes the world matrix singular; the result is then
    /// non-finite but never panics.
    pub fn world_inverse_transpose_matrix(&self) -> Mat4 {
        self.world_matrix();
        self.world_inverse_transpose.get()
    }

    /// Local +X in world space.
    pub fn right(&self) -> Vec3 {
        self.update_orientation();
        self.right.get()
    }

    /// Local +Y in world space.
    pub fn up(&self) -> Vec3 {
        self.update_orientation();
        self.up.get()
    }

    /// Local +Z in world space.
    pub fn forward(&self) -> Vec3 {
        self.update_orientation();
        self.forward.get()
    }

    fn update_orientation(&self) {
        if self.orientation_dirty.get() {
            let rotation = self.orientation();
            self.right.set(rotation * Vec3::X);
            self.up.set(rotation * Vec3::Y);
            self.forward.set(rotation * Vec3::Z);
            self.orientation_dirty.set(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const EPSILON: f32 = 1e-4;

    fn srt(position: Vec3, pitch_yaw_roll: Vec3, scale: Vec3) -> Mat4 {
        let scale = Mat4::from_scale(scale);
        let rotation = Mat4::from_rotation_y(pitch_yaw_roll.y)
            * Mat4::from_rotation_x(pitch_yaw_roll.x)
            * Mat4::from_rotation_z(pitch_yaw_roll.z);
        let translation = Mat4::from_translation(position);
        translation * rotation * scale
    }

    #[test]
    fn starts_as_identity() {
        let transform = Transform::new();
        assert_eq!(transform.world_matrix(), Mat4::IDENTITY);
        assert_eq!(transform.world_inverse_transpose_matrix(), Mat4::IDENTITY);
        assert_eq!(transform.forward(), Vec3::Z);
        assert_eq!(transform.scale(), Vec3::ONE);
    }

    #[rstest]
    #[case(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.3, -1.2, 0.7), Vec3::new(2.0, 0.5, 1.0))]
    #[case(Vec3::new(-5.0, 0.0, 0.0), Vec3::ZERO, Vec3::splat(10.0))]
    #[case(Vec3::ZERO, Vec3::new(1.5, 3.0, -2.0), Vec3::ONE)]
    fn world_matrix_matches_scale_rotation_translation(
        #[case] position: Vec3,
        #[case] rotation: Vec3,
        #[case] scale: Vec3,
    ) {
        let mut transform = Transform::new();
        // History that the absolute setters must erase
        transform.move_absolute(Vec3::splat(9.0));
        transform.rotate(Vec3::splat(0.4));
        transform.scale_by(Vec3::splat(3.0));

        transform.set_position(position);
        transform.set_rotation(rotation);
        transform.set_scale(scale);

        let expected = srt(position, rotation, scale);
        assert!(transform.world_matrix().abs_diff_eq(expected, EPSILON));
    }

    #[test]
    fn world_matrix_is_cached() {
        let mut transform = Transform::new();
        transform.set_rotation(Vec3::new(0.1, 0.2, 0.3));
        transform.set_position(Vec3::new(4.0, 5.0, 6.0));

        let first = transform.world_matrix();
        let second = transform.world_matrix();
        assert_eq!(first.to_cols_array(), second.to_cols_array());
        assert!(!transform.matrix_dirty.get());
    }

    #[test]
    fn inverse_transpose_tracks_world_matrix() {
        let mut transform = Transform::new();
        transform.set_scale(Vec3::new(2.0, 4.0, 8.0));
        transform.set_rotation(Vec3::new(0.5, 0.0, 0.0));

        // Read inverse-transpose first; it must trigger the same recompute
        let inverse_transpose = transform.world_inverse_transpose_matrix();
        let expected = transform.world_matrix().inverse().transpose();
        assert!(inverse_transpose.abs_diff_eq(expected, EPSILON));
    }

    #[test]
    fn zero_scale_does_not_panic() {
        let mut transform = Transform::new();
        transform.set_scale(Vec3::ZERO);
        let _ = transform.world_inverse_transpose_matrix();
        assert_eq!(transform.world_matrix().transform_point3(Vec3::ONE), Vec3::ZERO);
    }

    #[test]
    fn scale_by_multiplies() {
        let mut scaled = Transform::new();
        scaled.set_scale(Vec3::new(1.0, 2.0, 0.5));
        let initial = scaled.scale();
        scaled.scale_by(Vec3::splat(2.0));
        scaled.scale_by(Vec3::splat(3.0));

        let mut direct = Transform::new();
        direct.set_scale(initial * 6.0);

        assert_eq!(scaled.scale(), direct.scale());
        assert_eq!(scaled.world_matrix(), direct.world_matrix());
    }

    #[test]
    fn move_relative_without_rotation_is_absolute() {
        let delta = Vec3::new(1.5, -2.0, 0.25);
        let mut relative = Transform::new();
        let mut absolute = Transform::new();
        relative.move_relative(delta);
        absolute.move_absolute(delta);
        assert_eq!(relative.position(), absolute.position());
    }

    #[test]
    fn move_relative_follows_yaw() {
        let mut transform = Transform::new();
        transform.set_rotation(Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0));
        transform.move_relative(Vec3::Z);
        // Yawing a quarter turn in a left-handed frame turns +Z into +X
        assert!(transform.position().abs_diff_eq(Vec3::X, EPSILON));
    }

    #[rstest]
    #[case(Vec3::ZERO)]
    #[case(Vec3::new(0.3, 0.0, 0.0))]
    #[case(Vec3::new(-1.1, 2.4, 0.9))]
    #[case(Vec3::new(3.0, -7.5, 12.0))]
    fn basis_is_orthonormal(#[case] rotation: Vec3) {
        let mut transform = Transform::new();
        transform.rotate(rotation);

        let (right, up, forward) = (transform.right(), transform.up(), transform.forward());
        assert!((right.length() - 1.0).abs() < EPSILON);
        assert!((up.length() - 1.0).abs() < EPSILON);
        assert!((forward.length() - 1.0).abs() < EPSILON);
        assert!(right.dot(up).abs() < EPSILON);
        assert!(right.dot(forward).abs() < EPSILON);
        assert!(up.dot(forward).abs() < EPSILON);
    }

    #[test]
    fn translation_keeps_orientation_cache() {
        let mut transform = Transform::new();
        transform.set_rotation(Vec3::new(0.2, 0.4, 0.0));
        let forward = transform.forward();

        transform.move_absolute(Vec3::ONE);
        transform.set_scale(Vec3::splat(3.0));
        assert!(!transform.orientation_dirty.get());
        assert_eq!(transform.forward(), forward);

        transform.rotate(Vec3::new(0.0, 0.1, 0.0));
        assert!(transform.orientation_dirty.get());
        assert_ne!(transform.forward(), forward);
    }

    #[test]
    fn round_trip_through_components() {
        let mut original = Transform::new();
        original.move_absolute(Vec3::new(3.0, -1.0, 2.0));
        original.rotate(Vec3::new(0.25, -0.5, 1.0));
        original.scale_by(Vec3::new(1.0, 2.0, 3.0));

        let rebuilt = Transform::from_parts(
            original.position(),
            original.pitch_yaw_roll(),
            original.scale(),
        );
        assert_eq!(
            original.world_matrix().to_cols_array(),
            rebuilt.world_matrix().to_cols_array()
        );
    }
}
