// ============================================================================
// app.rs — Sim Engine
// Application context and winit event-loop handler: poll input, update the
// camera, draw the scene, present.
// ============================================================================

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, MouseScrollDelta, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowAttributes},
};

use crate::camera::CameraState;
use crate::config::{DisplayParams, CLEAR_COLOR, SCR_HEIGHT, SCR_WIDTH, TRAJECTORY_SEED, WINDOW_TITLE};
use crate::error::InitError;
use crate::input::{KeysHeld, MouseLook};
use crate::lorenz::{compute_lorenz, LorenzParams, TrajectoryPoint};
use crate::pipeline::{create_depth_view, create_pipelines, Pipelines};
use crate::renderer::{HudRenderer, HudStats};
use crate::scene::SceneBuffers;
use crate::screenshot::{save_screenshot, PendingCapture, SCREENSHOT_DIR};

// ======================== Application ========================

pub struct App {
    state: Option<AppState>,
    trajectory: Vec<TrajectoryPoint>,
    init_error: Option<InitError>,
}

struct AppState {
    // GPU
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    can_capture: bool,

    // Scene
    scene: SceneBuffers,
    pipelines: Pipelines,

    // Window
    window: Arc<Window>,

    // Camera & Input
    camera: CameraState,
    keys: KeysHeld,
    mouse: MouseLook,
    display: DisplayParams,

    // HUD
    hud: HudRenderer,
    screenshot_requested: bool,

    // Timing
    last_redraw: Instant,
    fps: f32,
    frame: u64,
}

impl App {
    /// The trajectory is integrated here, once, before any window exists.
    pub fn new() -> Self {
        let params = LorenzParams::default();
        let [x0, y0, z0] = TRAJECTORY_SEED;
        let trajectory = compute_lorenz(x0, y0, z0);
        log::info!(
            "Lorenz trajectory: {} points (sigma={}, rho={}, beta={:.4}, dt={})",
            trajectory.len(),
            params.sigma,
            params.rho,
            params.beta,
            params.dt
        );

        Self {
            state: None,
            trajectory,
            init_error: None,
        }
    }

    /// Consume the app after the loop has exited, surfacing any setup failure.
    pub fn finish(self) -> Result<(), InitError> {
        match self.init_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.init_error.is_some() {
            return;
        }

        match AppState::new(event_loop, &self.trajectory) {
            Ok(state) => {
                // Initial redraw, required on macOS with winit 0.30
                state.window.request_redraw();
                self.state = Some(state);
            }
            Err(e) => {
                self.init_error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        let Some(state) = &mut self.state else {
            return;
        };

        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            let (x_offset, y_offset) = state.mouse.on_motion(dx, dy);
            state.camera.apply_look(x_offset, y_offset);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::KeyboardInput { event, .. } => {
                handle_keyboard(state, event_loop, &event);
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match &delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.01,
                };
                state.camera.apply_scroll(scroll);
            }

            WindowEvent::Resized(new_size) => {
                if new_size.width > 0 && new_size.height > 0 {
                    state.surface_config.width = new_size.width;
                    state.surface_config.height = new_size.height;
                    state.surface.configure(&state.device, &state.surface_config);
                    state.depth_view =
                        create_depth_view(&state.device, new_size.width, new_size.height);
                }
            }

            WindowEvent::RedrawRequested => {
                redraw(state);
            }

            _ => {}
        }
    }
}

impl AppState {
    fn new(event_loop: &ActiveEventLoop, trajectory: &[TrajectoryPoint]) -> Result<Self, InitError> {
        let window_attrs = WindowAttributes::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(SCR_WIDTH, SCR_HEIGHT));

        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let display = DisplayParams::default();
        let (device, queue, surface_config) =
            pollster::block_on(init_gpu(&instance, &surface, &window, &display))?;

        surface.configure(&device, &surface_config);
        let can_capture = surface_config.usage.contains(wgpu::TextureUsages::COPY_SRC);
        if !can_capture {
            log::warn!("Surface does not support COPY_SRC; screenshots disabled");
        }

        let scene = SceneBuffers::new(&device, trajectory);
        let pipelines = create_pipelines(&device, &scene, surface_config.format);
        let depth_view = create_depth_view(&device, surface_config.width, surface_config.height);
        let hud = HudRenderer::new(&device, &queue, surface_config.format);

        grab_cursor(&window);

        log::info!(
            "Sim Engine initialized: {}x{}, {} trajectory vertices uploaded",
            surface_config.width,
            surface_config.height,
            scene.trajectory_vertices.count
        );

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            depth_view,
            can_capture,
            scene,
            pipelines,
            window,
            camera: CameraState::default(),
            keys: KeysHeld::default(),
            mouse: MouseLook::default(),
            display,
            hud,
            screenshot_requested: false,
            last_redraw: Instant::now(),
            fps: 0.0,
            frame: 0,
        })
    }

    fn aspect(&self) -> f32 {
        self.surface_config.width as f32 / self.surface_config.height.max(1) as f32
    }
}

// ======================== Window & GPU Initialization ========================

/// Relative mouse mode: lock the pointer (or confine it where locking is
/// unsupported) and hide it.
fn grab_cursor(window: &Window) {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    if let Err(e) = grabbed {
        log::warn!("Cursor grab unavailable: {}", e);
    }
    window.set_cursor_visible(false);
}

async fn init_gpu(
    instance: &wgpu::Instance,
    surface: &wgpu::Surface<'_>,
    window: &Window,
    display: &DisplayParams,
) -> Result<(wgpu::Device, wgpu::Queue, wgpu::SurfaceConfiguration), InitError> {
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(surface),
            force_fallback_adapter: false,
        })
        .await
        .ok_or(InitError::NoAdapter)?;

    log::info!("GPU: {}", adapter.get_info().name);

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("sim_engine_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        )
        .await?;

    let size = window.inner_size();
    let surface_caps = surface.get_capabilities(&adapter);
    let surface_format = surface_caps
        .formats
        .iter()
        .find(|f| f.is_srgb())
        .or_else(|| surface_caps.formats.first())
        .copied()
        .ok_or(InitError::NoSurfaceFormat)?;

    let mut usage = wgpu::TextureUsages::RENDER_ATTACHMENT;
    if surface_caps.usages.contains(wgpu::TextureUsages::COPY_SRC) {
        usage |= wgpu::TextureUsages::COPY_SRC;
    }

    let present_mode = display.present_mode();
    log::info!("Present mode: {:?}", present_mode);

    let surface_config = wgpu::SurfaceConfiguration {
        usage,
        format: surface_format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode,
        alpha_mode: surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto),
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };

    Ok((device, queue, surface_config))
}

// ======================== Keyboard Handling ========================

fn handle_keyboard(state: &mut AppState, event_loop: &ActiveEventLoop, event: &winit::event::KeyEvent) {
    let pressed = event.state.is_pressed();
    let PhysicalKey::Code(code) = event.physical_key else {
        return;
    };

    match code {
        KeyCode::Escape if pressed => event_loop.exit(),

        KeyCode::KeyW => state.keys.w = pressed,
        KeyCode::KeyS => state.keys.s = pressed,
        KeyCode::KeyA => state.keys.a = pressed,
        KeyCode::KeyD => state.keys.d = pressed,

        KeyCode::KeyH if pressed && !event.repeat => {
            state.display.show_extended_ui = !state.display.show_extended_ui;
        }
        KeyCode::KeyV if pressed && !event.repeat => {
            state.display.vsync = !state.display.vsync;
            state.surface_config.present_mode = state.display.present_mode();
            state.surface.configure(&state.device, &state.surface_config);
            log::info!("VSync: {}", if state.display.vsync { "ON" } else { "OFF" });
        }
        KeyCode::F12 if pressed && !event.repeat => {
            if state.can_capture {
                state.screenshot_requested = true;
            } else {
                log::warn!("Screenshot requested but the surface cannot be copied");
            }
        }
        _ => {}
    }
}

// ======================== Frame Rendering ========================

fn redraw(state: &mut AppState) {
    // Frame time & FPS (exponential moving average)
    let now = Instant::now();
    let dt = now.duration_since(state.last_redraw).as_secs_f32();
    state.last_redraw = now;
    state.fps = state.fps * 0.95 + (1.0 / dt.max(0.0001)) * 0.05;

    // Camera movement from held keys
    for movement in state.keys.movements() {
        state.camera.apply_move(movement, dt);
    }

    // Upload camera uniform
    state.queue.write_buffer(
        &state.pipelines.camera_buffer,
        0,
        bytemuck::bytes_of(&state.camera.uniforms(state.aspect())),
    );

    // ---- Prepare HUD ----
    let win_w = state.surface_config.width;
    let win_h = state.surface_config.height;
    let stats = HudStats {
        fps: state.fps,
        camera: &state.camera,
        trajectory_points: state.scene.trajectory_vertices.count as usize,
        display: &state.display,
    };
    if let Err(e) = state.hud.prepare(&state.device, &state.queue, &stats, win_w, win_h) {
        log::warn!("HUD prepare failed: {}", e);
    }

    let output = match state.surface.get_current_texture() {
        Ok(t) => t,
        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
            state.surface.configure(&state.device, &state.surface_config);
            return;
        }
        Err(e) => {
            log::error!("Surface error: {:?}", e);
            return;
        }
    };

    let view = output
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());

    let mut encoder = state
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

    // Scene render pass
    {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &state.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        encode_scene(&mut pass, &state.pipelines, &state.scene);

        if let Err(e) = state.hud.render(&mut pass) {
            log::warn!("HUD render failed: {}", e);
        }
    }

    let capture = state
        .screenshot_requested
        .then(|| PendingCapture::encode(&state.device, &mut encoder, &output.texture));
    state.screenshot_requested = false;

    state.queue.submit(std::iter::once(encoder.finish()));

    // ---- Read back screenshot ----
    if let Some(capture) = capture {
        let saved = capture
            .read_back(&state.device)
            .and_then(|(w, h, rgba)| save_screenshot(Path::new(SCREENSHOT_DIR), state.frame, w, h, &rgba));
        if let Err(e) = saved {
            log::error!("Screenshot failed: {}", e);
        }
    }

    output.present();
    state.hud.trim();
    state.frame += 1;
}

/// Ground tiles and cubes with the lit pipeline, then the trajectory strip.
fn encode_scene(pass: &mut wgpu::RenderPass<'_>, pipelines: &Pipelines, scene: &SceneBuffers) {
    pass.set_pipeline(&pipelines.lit_pipeline);
    pass.set_bind_group(0, &pipelines.bind_group, &[]);

    // Ground
    pass.set_vertex_buffer(0, scene.ground_vertices.slice(..));
    pass.set_vertex_buffer(1, scene.ground_instances.buffer.slice(..));
    pass.set_index_buffer(scene.ground_indices.buffer.slice(..), wgpu::IndexFormat::Uint32);
    pass.draw_indexed(
        0..scene.ground_indices.count,
        0,
        0..scene.ground_instances.count,
    );

    // Cubes
    pass.set_vertex_buffer(0, scene.cube_vertices.buffer.slice(..));
    pass.set_vertex_buffer(1, scene.cube_instances.buffer.slice(..));
    pass.draw(0..scene.cube_vertices.count, 0..scene.cube_instances.count);

    // Trajectory
    if scene.trajectory_vertices.count > 0 {
        pass.set_pipeline(&pipelines.line_pipeline);
        pass.set_vertex_buffer(0, scene.trajectory_vertices.buffer.slice(..));
        pass.set_vertex_buffer(1, scene.trajectory_instance.slice(..));
        pass.draw(0..scene.trajectory_vertices.count, 0..1);
    }
}
