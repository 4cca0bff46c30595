// ============================================================================
// config.rs — Sim Engine
// Compile-time scene constants and default camera parameters.
// ============================================================================

use glam::Vec3;

// ======================== Window ========================

pub const WINDOW_TITLE: &str = "Sim Engine";
pub const SCR_WIDTH: u32 = 800;
pub const SCR_HEIGHT: u32 = 600;
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.03,
    g: 0.04,
    b: 0.05,
    a: 1.0,
};

// ======================== Projection ========================

pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;

// ======================== Lighting ========================

pub const LIGHT_POSITION: Vec3 = Vec3::new(0.0, 3.0, -1.0);
pub const LIGHT_COLOR: Vec3 = Vec3::ONE;

// ======================== Scene Layout ========================

pub const GROUND_TILES: u32 = 10;
pub const GROUND_ORIGIN: f32 = -2.54;
pub const GROUND_SPACING: f32 = 1.02;
pub const GROUND_COLOR: Vec3 = Vec3::new(0.8, 0.8, 0.8);

/// Successive translations applied to one running model matrix.
pub const CUBE_STEPS: [Vec3; 4] = [
    Vec3::new(4.0, 0.5, 0.0),
    Vec3::new(0.0, 0.0, 4.0),
    Vec3::new(-4.0, 0.0, 0.0),
    Vec3::new(0.0, 0.0, -4.0),
];
pub const CUBE_COLORS: [Vec3; 4] = [
    Vec3::new(0.0, 0.5, 0.31),
    Vec3::new(1.0, 0.5, 0.31),
    Vec3::new(1.0, 0.5, 0.31),
    Vec3::new(1.0, 0.5, 0.31),
];

pub const TRAJECTORY_SEED: [f64; 3] = [1.0, 1.0, 1.0];
pub const TRAJECTORY_OFFSET: Vec3 = Vec3::new(1.0, 1.0, 0.0);
pub const TRAJECTORY_SCALE: f32 = 0.1;
pub const TRAJECTORY_COLOR: Vec3 = Vec3::ONE;

// ======================== Camera ========================

/// Initial camera pose and tuning.
#[derive(Clone, Copy, Debug)]
pub struct CameraSettings {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub zoom: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(1.0, 4.0, 7.0),
            yaw: -90.0,
            pitch: 0.0,
            zoom: 45.0,
            movement_speed: 2.5,
            mouse_sensitivity: 0.1,
        }
    }
}

/// Runtime display toggles adjustable via keyboard.
#[derive(Clone, Debug)]
pub struct DisplayParams {
    pub show_extended_ui: bool,
    pub vsync: bool,
}

impl Default for DisplayParams {
    fn default() -> Self {
        Self {
            show_extended_ui: false,
            vsync: true,
        }
    }
}

impl DisplayParams {
    pub fn present_mode(&self) -> wgpu::PresentMode {
        if self.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_defaults_to_vsync() {
        let params = DisplayParams::default();
        assert!(params.vsync);
        assert_eq!(params.present_mode(), wgpu::PresentMode::AutoVsync);

        let uncapped = DisplayParams {
            vsync: false,
            ..DisplayParams::default()
        };
        assert_eq!(uncapped.present_mode(), wgpu::PresentMode::AutoNoVsync);
    }
}
