// ============================================================================
// main.rs — Sim Engine
// Entry point. Initializes logging, runs the event loop, maps setup failures
// to exit code 1.
// ============================================================================

mod app;
mod camera;
mod config;
mod error;
mod input;
mod lorenz;
mod pipeline;
mod renderer;
mod scene;
mod screenshot;

use app::App;
use error::InitError;
use winit::event_loop::{ControlFlow, EventLoop};

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("Fatal: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), InitError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app)?;
    app.finish()
}
