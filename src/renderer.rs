// ============================================================================
// renderer.rs — Sim Engine
// HUD text rendering via glyphon: frame rate, camera readout, controls.
// ============================================================================

use glyphon::{
    Attrs, Buffer as TextBuffer, Cache as GlyphCache, Color as GlyphColor, Family, FontSystem,
    Metrics, PrepareError, RenderError, Resolution, Shaping, SwashCache, TextArea, TextAtlas,
    TextBounds, TextRenderer, Viewport as GlyphViewport,
};

use crate::camera::CameraState;
use crate::config::DisplayParams;
use crate::pipeline::DEPTH_FORMAT;

/// Values shown on the overlay for one frame.
pub struct HudStats<'a> {
    pub fps: f32,
    pub camera: &'a CameraState,
    pub trajectory_points: usize,
    pub display: &'a DisplayParams,
}

/// All glyphon resources needed for HUD text rendering.
pub struct HudRenderer {
    font_system: FontSystem,
    swash_cache: SwashCache,
    glyph_viewport: GlyphViewport,
    text_atlas: TextAtlas,
    text_renderer: TextRenderer,
    text_buffer: TextBuffer,
}

impl HudRenderer {
    /// Initialize the HUD text rendering subsystem. The text is drawn inside
    /// the scene pass, so its pipeline carries a pass-through depth state.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let mut font_system = FontSystem::new();
        let swash_cache = SwashCache::new();
        let glyph_cache = GlyphCache::new(device);
        let glyph_viewport = GlyphViewport::new(device, &glyph_cache);
        let mut text_atlas = TextAtlas::new(device, queue, &glyph_cache, surface_format);
        let text_renderer = TextRenderer::new(
            &mut text_atlas,
            device,
            wgpu::MultisampleState::default(),
            Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
        );
        let text_buffer = TextBuffer::new(&mut font_system, Metrics::new(14.0, 18.0));

        Self {
            font_system,
            swash_cache,
            glyph_viewport,
            text_atlas,
            text_renderer,
            text_buffer,
        }
    }

    /// Prepare HUD text for the current frame.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        stats: &HudStats<'_>,
        win_w: u32,
        win_h: u32,
    ) -> Result<(), PrepareError> {
        self.glyph_viewport.update(
            queue,
            Resolution {
                width: win_w,
                height: win_h,
            },
        );

        let hud_text = build_hud_text(stats);
        self.text_buffer
            .set_size(&mut self.font_system, Some(win_w as f32), Some(win_h as f32));
        self.text_buffer.set_text(
            &mut self.font_system,
            &hud_text,
            Attrs::new().family(Family::Monospace),
            Shaping::Basic,
        );
        self.text_buffer
            .shape_until_scroll(&mut self.font_system, false);

        self.text_renderer.prepare(
            device,
            queue,
            &mut self.font_system,
            &mut self.text_atlas,
            &self.glyph_viewport,
            [TextArea {
                buffer: &self.text_buffer,
                left: 10.0,
                top: 10.0,
                scale: 1.0,
                bounds: TextBounds {
                    left: 0,
                    top: 0,
                    right: win_w as i32,
                    bottom: win_h as i32,
                },
                default_color: GlyphColor::rgb(220, 220, 220),
                custom_glyphs: &[],
            }],
            &mut self.swash_cache,
        )
    }

    /// Render HUD overlay into an active render pass.
    pub fn render<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) -> Result<(), RenderError> {
        self.text_renderer
            .render(&self.text_atlas, &self.glyph_viewport, pass)
    }

    /// Trim the glyph atlas after presenting.
    pub fn trim(&mut self) {
        self.text_atlas.trim();
    }
}

// ======================== HUD Text Builder ========================

fn build_hud_text(stats: &HudStats<'_>) -> String {
    let camera = stats.camera;
    let p = camera.position;
    let f = camera.front();

    if stats.display.show_extended_ui {
        format!(
            "━━━ Sim Engine ━━━\n\
             FPS: {:.0}  |  Trajectory: {} points\n\
             \n\
             CAMERA:\n\
             • Position: ({:.2}, {:.2}, {:.2})\n\
             • Facing: ({:.2}, {:.2}, {:.2})\n\
             • Yaw: {:.1}°  Pitch: {:.1}°  FOV: {:.1}°\n\
             • Speed: {:.1}/s  |  Sensitivity: {:.2}\n\
             \n\
             CONTROLS:\n\
             • Move: WASD  |  Look: Mouse  |  Zoom: Mouse Wheel\n\
             • H: Toggle HUD  |  F12: Screenshot  |  ESC: Quit\n\
             • VSync: {} (V to toggle)",
            stats.fps,
            stats.trajectory_points,
            p.x,
            p.y,
            p.z,
            f.x,
            f.y,
            f.z,
            camera.yaw,
            camera.pitch,
            camera.zoom,
            camera.movement_speed,
            camera.mouse_sensitivity,
            if stats.display.vsync { "ON" } else { "OFF" },
        )
    } else {
        format!(
            "FPS: {:.0}   Pos: ({:.1}, {:.1}, {:.1})   FOV: {:.0}°\n\
             WASD: Move | Mouse: Look | H: Help",
            stats.fps, p.x, p.y, p.z, camera.zoom,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_hud() {
        let camera = CameraState::default();
        let display = DisplayParams::default();
        let text = build_hud_text(&HudStats {
            fps: 59.6,
            camera: &camera,
            trajectory_points: 10_000,
            display: &display,
        });
        assert!(text.starts_with("FPS: 60   Pos: (1.0, 4.0, 7.0)   FOV: 45°"));
        assert!(!text.contains("CONTROLS"));
    }

    #[test]
    fn test_extended_hud() {
        let camera = CameraState::default();
        let display = DisplayParams {
            show_extended_ui: true,
            vsync: false,
        };
        let text = build_hud_text(&HudStats {
            fps: 120.0,
            camera: &camera,
            trajectory_points: 10_000,
            display: &display,
        });
        assert!(text.contains("Trajectory: 10000 points"));
        assert!(text.contains("Yaw: -90.0°  Pitch: 0.0°  FOV: 45.0°"));
        assert!(text.contains("VSync: OFF"));
        assert!(text.contains("Facing: (-0.00, 0.00, -1.00)"));
    }
}
