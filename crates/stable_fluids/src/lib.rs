//! Real-time stable fluids on the GPU.
//!
//! [`GpuBackend`] runs the `sim2d` pass sequence as fullscreen wgpu render
//! passes over float textures; [`app::run`] wraps it in a winit window with
//! mouse and touch forcing.

pub mod app;
pub mod error;
pub mod gpu;

pub use app::{AppConfig, PointerTracker};
pub use error::AppError;
pub use gpu::{GpuBackend, GpuContext};
