//! A first-person fly camera.
//!
//! [`Camera`] owns a [`Transform`] plus projection parameters. The view and
//! projection matrices are cached and refreshed explicitly:
//!
//! - [`update_projection_matrix`](Camera::update_projection_matrix) on resize;
//! - [`update_view_matrix`](Camera::update_view_matrix) once per
//!   [`update`](Camera::update).
//!
//! Moving the camera's transform directly does not refresh the view until the
//! next update.
//!
//! # Controls
//!
//! | Input            | Effect                          |
//! |------------------|---------------------------------|
//! | W / S            | forward / back along the view   |
//! | A / D            | strafe left / right             |
//! | Space / Shift    | world up / world down           |
//! | Left mouse drag  | look around                     |

use glam::{Mat4, Vec3};
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use crate::input::Input;
use crate::transform::Transform;

/// Pitch limit in radians, applied symmetrically after mouse look.
pub const PITCH_LIMIT: f32 = std::f32::consts::FRAC_1_PI;

/// Perspective fly camera driven by keyboard and mouse.
#[derive(Clone, Debug)]
pub struct Camera {
    transform: Transform,
    field_of_view: f32,
    near_plane: f32,
    far_plane: f32,
    move_speed: f32,
    mouse_sensitivity: f32,
    is_orthographic: bool,
    view: Mat4,
    projection: Mat4,
}

impl Camera {
    /// Creates a camera and computes its initial view and projection.
    ///
    /// `field_of_view` is the vertical angle in radians. `move_speed` is in
    /// world units per second and `mouse_sensitivity` in radians per pixel.
    /// The orthographic flag is stored only; projection is always perspective.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        aspect_ratio: f32,
        position: Vec3,
        field_of_view: f32,
        near_plane: f32,
        far_plane: f32,
        move_speed: f32,
        mouse_sensitivity: f32,
        is_orthographic: bool,
    ) -> Self {
        let mut transform = Transform::new();
        transform.set_position(position);

        let mut camera = Self {
            transform,
            field_of_view,
            near_plane,
            far_plane,
            move_speed,
            mouse_sensitivity,
            is_orthographic,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix(aspect_ratio);
        camera.update_view_matrix();
        camera
    }

    /// Rebuilds the left-handed perspective projection (depth range 0..1).
    pub fn update_projection_matrix(&mut self, aspect_ratio: f32) {
        self.projection = Mat4::perspective_lh(
            self.field_of_view,
            aspect_ratio,
            self.near_plane,
            self.far_plane,
        );
    }

    /// Rebuilds the view matrix from the transform's position and forward.
    pub fn update_view_matrix(&mut self) {
        self.view = Mat4::look_to_lh(self.transform.position(), self.transform.forward(), Vec3::Y);
    }

    /// Applies one frame of input and refreshes the view matrix.
    pub fn update(&mut self, input: &Input, dt: f32) {
        let speed = self.move_speed * dt;

        if input.key_down(KeyCode::KeyW) {
            self.transform.move_relative(Vec3::new(0.0, 0.0, speed));
        }
        if input.key_down(KeyCode::KeyS) {
            self.transform.move_relative(Vec3::new(0.0, 0.0, -speed));
        }
        if input.key_down(KeyCode::KeyA) {
            self.transform.move_relative(Vec3::new(-speed, 0.0, 0.0));
        }
        if input.key_down(KeyCode::KeyD) {
            self.transform.move_relative(Vec3::new(speed, 0.0, 0.0));
        }
        if input.key_down(KeyCode::Space) {
            self.transform.move_absolute(Vec3::new(0.0, speed, 0.0));
        }
        if input.shift_down() {
            self.transform.move_absolute(Vec3::new(0.0, -speed, 0.0));
        }

        if input.mouse_down(MouseButton::Left) {
            let delta = input.mouse_delta() * self.mouse_sensitivity;
            self.transform.rotate(Vec3::new(delta.y, delta.x, 0.0));

            let mut rotation = self.transform.pitch_yaw_roll();
            if rotation.x.abs() > PITCH_LIMIT {
                rotation.x = rotation.x.clamp(-PITCH_LIMIT, PITCH_LIMIT);
                self.transform.set_rotation(rotation);
            }
        }

        self.update_view_matrix();
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Mutable access to the transform. Call
    /// [`update_view_matrix`](Self::update_view_matrix) afterwards if the view
    /// must reflect the change before the next update.
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// Vertical field of view in radians.
    pub fn field_of_view(&self) -> f32 {
        self.field_of_view
    }

    pub fn near_plane(&self) -> f32 {
        self.near_plane
    }

    pub fn far_plane(&self) -> f32 {
        self.far_plane
    }

    pub fn is_orthographic(&self) -> bool {
        self.is_orthographic
    }

    pub fn move_speed(&self) -> f32 {
        self.move_speed
    }

    pub fn mouse_sensitivity(&self) -> f32 {
        self.mouse_sensitivity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec4};

    const EPSILON: f32 = 1e-4;

    fn demo_camera() -> Camera {
        Camera::new(
            16.0 / 9.0,
            Vec3::new(0.0, 0.0, -4.0),
            45f32.to_radians(),
            0.01,
            1000.0,
            3.0,
            0.01,
            false,
        )
    }

    #[test]
    fn origin_projects_to_screen_center() {
        let camera = demo_camera();
        let clip = camera.projection() * camera.view() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;

        assert!(ndc.x.abs() < EPSILON);
        assert!(ndc.y.abs() < EPSILON);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn w_moves_forward_by_speed_times_dt() {
        let mut camera = demo_camera();
        let mut input = Input::new();
        input.key_event(KeyCode::KeyW, true);

        camera.update(&input, 0.5);
        assert!(camera
            .transform()
            .position()
            .abs_diff_eq(Vec3::new(0.0, 0.0, -2.5), EPSILON));
    }

    #[test]
    fn space_and_shift_move_along_world_y() {
        let mut camera = demo_camera();
        // Pitch down so a relative move would leave the Y axis
        camera.transform_mut().set_rotation(Vec3::new(0.3, 0.0, 0.0));

        let mut input = Input::new();
        input.key_event(KeyCode::Space, true);
        camera.update(&input, 1.0);
        assert!(camera
            .transform()
            .position()
            .abs_diff_eq(Vec3::new(0.0, 3.0, -4.0), EPSILON));

        input.key_event(KeyCode::Space, false);
        input.key_event(KeyCode::ShiftLeft, true);
        camera.update(&input, 1.0);
        assert!(camera
            .transform()
            .position()
            .abs_diff_eq(Vec3::new(0.0, 0.0, -4.0), EPSILON));
    }

    #[test]
    fn mouse_look_only_while_left_button_held() {
        let mut camera = demo_camera();
        let mut input = Input::new();
        input.cursor_moved(Vec2::ZERO);
        input.cursor_moved(Vec2::new(10.0, 5.0));

        camera.update(&input, 0.016);
        assert_eq!(camera.transform().pitch_yaw_roll(), Vec3::ZERO);

        input.mouse_button_event(MouseButton::Left, true);
        camera.update(&input, 0.016);
        let rotation = camera.transform().pitch_yaw_roll();
        assert!((rotation.x - 0.05).abs() < EPSILON);
        assert!((rotation.y - 0.1).abs() < EPSILON);
        assert_eq!(rotation.z, 0.0);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = demo_camera();
        let mut input = Input::new();
        input.mouse_button_event(MouseButton::Left, true);

        for step in 0..20 {
            input.cursor_moved(Vec2::new(0.0, step as f32 * 500.0));
            camera.update(&input, 0.016);
            assert!(camera.transform().pitch_yaw_roll().x <= PITCH_LIMIT);
            input.end_frame();
        }
        assert!((camera.transform().pitch_yaw_roll().x - PITCH_LIMIT).abs() < EPSILON);

        // Keep dragging down from where the upward drag stopped
        for step in 1..=40 {
            input.cursor_moved(Vec2::new(0.0, 9500.0 - step as f32 * 500.0));
            camera.update(&input, 0.016);
            assert!(camera.transform().pitch_yaw_roll().x >= -PITCH_LIMIT);
            input.end_frame();
        }
        assert!((camera.transform().pitch_yaw_roll().x + PITCH_LIMIT).abs() < EPSILON);
    }

    #[test]
    fn view_is_not_refreshed_by_transform_changes() {
        let mut camera = demo_camera();
        let view = camera.view();

        camera.transform_mut().move_absolute(Vec3::X);
        assert_eq!(camera.view(), view);

        camera.update_view_matrix();
        assert_ne!(camera.view(), view);
    }

    #[test]
    fn resize_changes_only_projection() {
        let mut camera = demo_camera();
        let view = camera.view();
        let wide = camera.projection();

        camera.update_projection_matrix(1.0);
        assert_eq!(camera.view(), view);
        assert_ne!(camera.projection(), wide);
        // Square aspect makes x and y focal lengths equal
        let projection = camera.projection();
        assert!((projection.x_axis.x - projection.y_axis.y).abs() < EPSILON);
    }
}
