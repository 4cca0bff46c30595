// ============================================================================
// error.rs — Sim Engine
// Fatal setup errors. Anything that fails here ends the process with code 1.
// ============================================================================

use std::fmt;

/// Errors that can occur while creating the window or the GPU context.
#[derive(Debug)]
pub enum InitError {
    /// The event loop could not be created or failed while running.
    EventLoop(winit::error::EventLoopError),
    /// The OS refused to create the window.
    Window(winit::error::OsError),
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// The surface reports no usable texture format.
    NoSurfaceFormat,
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::EventLoop(e) => write!(f, "Event loop failed: {}", e),
            InitError::Window(e) => write!(f, "Could not create window: {}", e),
            InitError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            InitError::NoAdapter => write!(
                f,
                "No compatible GPU adapter found. A GPU with Vulkan, Metal, DX12 or GL support is required."
            ),
            InitError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            InitError::NoSurfaceFormat => write!(f, "Surface supports no texture formats"),
        }
    }
}

impl std::error::Error for InitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InitError::EventLoop(e) => Some(e),
            InitError::Window(e) => Some(e),
            InitError::SurfaceCreation(e) => Some(e),
            InitError::DeviceCreation(e) => Some(e),
            InitError::NoAdapter | InitError::NoSurfaceFormat => None,
        }
    }
}

impl From<winit::error::EventLoopError> for InitError {
    fn from(e: winit::error::EventLoopError) -> Self {
        InitError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for InitError {
    fn from(e: winit::error::OsError) -> Self {
        InitError::Window(e)
    }
}

impl From<wgpu::CreateSurfaceError> for InitError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        InitError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for InitError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        InitError::DeviceCreation(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_messages() {
        assert!(InitError::NoAdapter.to_string().contains("No compatible GPU adapter"));
        assert_eq!(
            InitError::NoSurfaceFormat.to_string(),
            "Surface supports no texture formats"
        );
    }

    #[test]
    fn test_source_absent_for_plain_variants() {
        assert!(InitError::NoAdapter.source().is_none());
        assert!(InitError::NoSurfaceFormat.source().is_none());
    }
}
