//! Application-level errors.

use sim2d::{ConfigError, FluidError};

/// Everything that can stop the application from starting or running.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Fluid(#[from] FluidError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no compatible GPU adapter found")]
    NoAdapter,

    #[error("GPU device lost")]
    DeviceLost,

    #[error("failed to create GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}
