//! Camera utilities

use glam::{Mat4, Vec3};

/// Position the orthographic view looks from; screen quads sit at z = 0
const ORTHO_EYE: Vec3 = Vec3::new(0.0, 0.0, -10.0);

/// Anything that can place the camera each frame
pub trait CameraSource {
    /// World to view transform
    fn view_matrix(&self) -> Mat4;

    /// View used for screen-space quads
    fn ortho_view_matrix(&self) -> Mat4 {
        Mat4::look_at_lh(ORTHO_EYE, Vec3::ZERO, Vec3::Y)
    }

    /// Camera position in world space
    fn position(&self) -> Vec3;

    /// Advance the camera from whatever input it has gathered
    fn update(&mut self);
}

/// Camera state captured once per frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMatrices {
    pub view: Mat4,
    pub projection: Mat4,
    pub ortho_view: Mat4,
    pub position: Vec3,
}

impl CameraMatrices {
    pub fn capture(camera: &dyn CameraSource, projection: Mat4) -> Self {
        Self {
            view: camera.view_matrix(),
            projection,
            ortho_view: camera.ortho_view_matrix(),
            position: camera.position(),
        }
    }

    /// Left-handed perspective projection with a [0, 1] depth range
    pub fn perspective(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::perspective_lh(fov_y_degrees.to_radians(), aspect, near, far)
    }
}

/// Input gathered since the last update
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct PendingMove {
    forward: f32,
    right: f32,
    up: f32,
    yaw: f32,
    pitch: f32,
}

/// Free-flying camera driven by accumulated move and turn requests
///
/// Requests are applied by [`CameraSource::update`], once per frame.
#[derive(Debug, Clone)]
pub struct FlyCamera {
    position: Vec3,
    /// Degrees around +Y, 0 faces +Z
    yaw: f32,
    /// Degrees, positive looks down
    pitch: f32,
    move_speed: f32,
    turn_speed: f32,
    pending: PendingMove,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::new(Vec3::new(50.0, 40.0, -20.0), 0.0, 30.0)
    }
}

impl FlyCamera {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch: pitch.clamp(-89.0, 89.0),
            move_speed: 1.0,
            turn_speed: 1.0,
            pending: PendingMove::default(),
        }
    }

    pub fn with_speed(mut self, move_speed: f32, turn_speed: f32) -> Self {
        self.move_speed = move_speed;
        self.turn_speed = turn_speed;
        self
    }

    pub fn move_forward(&mut self, amount: f32) {
        self.pending.forward += amount;
    }

    pub fn strafe(&mut self, amount: f32) {
        self.pending.right += amount;
    }

    pub fn rise(&mut self, amount: f32) {
        self.pending.up += amount;
    }

    pub fn turn(&mut self, yaw: f32, pitch: f32) {
        self.pending.yaw += yaw;
        self.pending.pitch += pitch;
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Unit view direction
    pub fn forward(&self) -> Vec3 {
        let (yaw_sin, yaw_cos) = self.yaw.to_radians().sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.to_radians().sin_cos();
        Vec3::new(yaw_sin * pitch_cos, -pitch_sin, yaw_cos * pitch_cos)
    }

    /// Unit vector to the camera's right, parallel to the ground
    pub fn right(&self) -> Vec3 {
        let (yaw_sin, yaw_cos) = self.yaw.to_radians().sin_cos();
        Vec3::new(yaw_cos, 0.0, -yaw_sin)
    }
}

impl CameraSource for FlyCamera {
    fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_lh(self.position, self.position + self.forward(), Vec3::Y)
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn update(&mut self) {
        let pending = std::mem::take(&mut self.pending);

        self.yaw = (self.yaw + pending.yaw * self.turn_speed).rem_euclid(360.0);
        self.pitch = (self.pitch + pending.pitch * self.turn_speed).clamp(-89.0, 89.0);

        let step = self.forward() * pending.forward
            + self.right() * pending.right
            + Vec3::Y * pending.up;
        self.position += step * self.move_speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn input_is_applied_once_per_update() {
        let mut camera = FlyCamera::new(Vec3::ZERO, 0.0, 0.0);
        camera.move_forward(2.0);
        camera.rise(1.0);

        assert_eq!(camera.position(), Vec3::ZERO);
        camera.update();
        assert_relative_eq!(camera.position().z, 2.0, epsilon = 1e-5);
        assert_relative_eq!(camera.position().y, 1.0, epsilon = 1e-5);

        camera.update();
        assert_relative_eq!(camera.position().z, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn strafe_moves_along_right() {
        let mut camera = FlyCamera::new(Vec3::ZERO, 90.0, 0.0);
        camera.strafe(1.0);
        camera.update();
        // facing +X, right is -Z
        assert_relative_eq!(camera.position().z, -1.0, epsilon = 1e-5);
        assert_relative_eq!(camera.position().x, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = FlyCamera::new(Vec3::ZERO, 0.0, 0.0);
        camera.turn(0.0, 500.0);
        camera.update();
        assert_eq!(camera.pitch(), 89.0);
        assert!(camera.view_matrix().is_finite());
    }

    #[test]
    fn view_places_forward_on_positive_z() {
        let camera = FlyCamera::new(Vec3::new(5.0, 3.0, 1.0), 45.0, 20.0);
        let ahead = camera.position() + camera.forward() * 4.0;
        let in_view = camera.view_matrix().transform_point3(ahead);
        assert_relative_eq!(in_view.z, 4.0, epsilon = 1e-4);
    }

    #[test]
    fn ortho_view_keeps_screen_plane_in_front() {
        let camera = FlyCamera::default();
        let origin = camera.ortho_view_matrix().transform_point3(Vec3::ZERO);
        assert_relative_eq!(origin.z, 10.0, epsilon = 1e-5);
    }
}
