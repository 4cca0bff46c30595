// ============================================================================
// camera.rs — Sim Engine
// Free-fly camera state (yaw/pitch/zoom) & GPU uniform for the 3D view.
// ============================================================================

use glam::{Mat4, Vec3};

use crate::config::{CameraSettings, FAR_PLANE, NEAR_PLANE};

pub const WORLD_UP: Vec3 = Vec3::Y;
pub const PITCH_LIMIT: f32 = 89.0;
pub const ZOOM_MIN: f32 = 1.0;
pub const ZOOM_MAX: f32 = 45.0;

/// GPU-side camera uniforms uploaded every frame.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub view_pos: [f32; 3],
    pub _pad: f32,
}

impl Default for CameraUniforms {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            view_pos: [0.0; 3],
            _pad: 0.0,
        }
    }
}

/// Direction of a single keyboard-driven displacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

/// CPU-side free-fly camera. Angles are in degrees.
///
/// `front`, `right` and `up` are derived from `yaw`/`pitch` and refreshed on
/// every look.
#[derive(Clone, Debug)]
pub struct CameraState {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub zoom: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    front: Vec3,
    right: Vec3,
    up: Vec3,
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new(CameraSettings::default())
    }
}

impl CameraState {
    pub fn new(settings: CameraSettings) -> Self {
        let mut camera = Self {
            position: settings.position,
            yaw: settings.yaw,
            pitch: settings.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            zoom: settings.zoom.clamp(ZOOM_MIN, ZOOM_MAX),
            movement_speed: settings.movement_speed,
            mouse_sensitivity: settings.mouse_sensitivity,
            front: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
        };
        camera.update_vectors();
        camera
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    /// Apply a mouse-look offset. `y_offset` is positive when the mouse moved
    /// up the screen.
    pub fn apply_look(&mut self, x_offset: f32, y_offset: f32) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch += y_offset * self.mouse_sensitivity;
        self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    /// Displace along the current basis for `dt` seconds.
    pub fn apply_move(&mut self, direction: CameraMovement, dt: f32) {
        let velocity = self.movement_speed * dt;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    /// Apply scroll-wheel zoom (narrows the field of view on scroll up).
    pub fn apply_scroll(&mut self, scroll_y: f32) {
        self.zoom -= scroll_y;
        self.zoom = self.zoom.clamp(ZOOM_MIN, ZOOM_MAX);
    }

    /// Right-handed look-at from the current position along `front`.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Perspective projection with the zoom as vertical field of view.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.zoom.to_radians(), aspect, NEAR_PLANE, FAR_PLANE)
    }

    /// Build the GPU uniform from current state.
    pub fn uniforms(&self, aspect: f32) -> CameraUniforms {
        CameraUniforms {
            view_proj: (self.projection_matrix(aspect) * self.view_matrix()).to_cols_array_2d(),
            view_pos: self.position.to_array(),
            _pad: 0.0,
        }
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
            .normalize();
        self.right = self.front.cross(WORLD_UP).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPS
    }

    #[test]
    fn test_default_basis() {
        let camera = CameraState::default();
        assert_eq!(camera.position, Vec3::new(1.0, 4.0, 7.0));
        assert!(approx(camera.front(), Vec3::NEG_Z));
        assert!(approx(camera.right, Vec3::X));
        assert!(approx(camera.up, Vec3::Y));
    }

    #[test]
    fn test_pitch_clamped() {
        let mut camera = CameraState::default();
        for _ in 0..100 {
            camera.apply_look(3.0, 250.0);
            assert!(camera.pitch <= PITCH_LIMIT);
        }
        assert_eq!(camera.pitch, PITCH_LIMIT);
        for _ in 0..100 {
            camera.apply_look(-7.0, -400.0);
            assert!(camera.pitch >= -PITCH_LIMIT);
        }
        assert_eq!(camera.pitch, -PITCH_LIMIT);
        assert!(camera.front().is_finite());
        assert!(camera.up.y > 0.0);
    }

    #[test]
    fn test_look_sign() {
        let mut camera = CameraState::default();
        camera.apply_look(0.0, 100.0);
        assert!((camera.pitch - 10.0).abs() < EPS);
        assert!(camera.front().y > 0.0);

        camera.apply_look(100.0, 0.0);
        assert!((camera.yaw - (-80.0)).abs() < EPS);
    }

    #[test]
    fn test_null_look_is_noop() {
        let mut camera = CameraState::default();
        camera.apply_look(12.0, -34.0);
        let before = camera.clone();
        let view_before = camera.view_matrix();

        camera.apply_look(0.0, 0.0);

        assert_eq!(camera.yaw, before.yaw);
        assert_eq!(camera.pitch, before.pitch);
        assert_eq!(camera.front(), before.front());
        assert_eq!(camera.view_matrix(), view_before);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut camera = CameraState::default();
        camera.apply_scroll(-10.0);
        assert_eq!(camera.zoom, ZOOM_MAX);
        camera.apply_scroll(30.0);
        assert!((camera.zoom - 15.0).abs() < EPS);
        camera.apply_scroll(1000.0);
        assert_eq!(camera.zoom, ZOOM_MIN);
        camera.apply_scroll(-1000.0);
        assert_eq!(camera.zoom, ZOOM_MAX);
    }

    #[test]
    fn test_move_along_basis() {
        let mut camera = CameraState::default();
        let start = camera.position;

        camera.apply_move(CameraMovement::Forward, 1.0);
        assert!(approx(camera.position, start + Vec3::new(0.0, 0.0, -2.5)));

        camera.apply_move(CameraMovement::Backward, 1.0);
        assert!(approx(camera.position, start));

        camera.apply_move(CameraMovement::Right, 0.5);
        assert!(approx(camera.position, start + Vec3::new(1.25, 0.0, 0.0)));

        camera.apply_move(CameraMovement::Left, 0.5);
        assert!(approx(camera.position, start));
    }

    #[test]
    fn test_move_zero_dt() {
        let mut camera = CameraState::default();
        let start = camera.position;
        camera.apply_move(CameraMovement::Forward, 0.0);
        assert_eq!(camera.position, start);
    }

    #[test]
    fn test_identical_state_identical_view() {
        let mut a = CameraState::default();
        let mut b = CameraState::default();
        for camera in [&mut a, &mut b] {
            camera.apply_look(31.0, -12.5);
            camera.apply_move(CameraMovement::Forward, 0.016);
        }
        assert_eq!(
            a.view_matrix().to_cols_array().map(f32::to_bits),
            b.view_matrix().to_cols_array().map(f32::to_bits)
        );
    }

    #[test]
    fn test_view_maps_eye_to_origin() {
        let mut camera = CameraState::default();
        camera.apply_look(45.0, 20.0);
        let eye = camera.view_matrix().transform_point3(camera.position);
        assert!(approx(eye, Vec3::ZERO));

        // Points ahead of the camera land on the -Z axis in eye space.
        let ahead = camera
            .view_matrix()
            .transform_point3(camera.position + camera.front() * 3.0);
        assert!(approx(ahead, Vec3::new(0.0, 0.0, -3.0)));
    }

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<CameraUniforms>(), 80);
        let camera = CameraState::default();
        let uniforms = camera.uniforms(800.0 / 600.0);
        assert_eq!(uniforms.view_pos, [1.0, 4.0, 7.0]);
    }
}
