//! Windowed app: configuration, pointer input and the winit event loop.

pub mod config;
pub mod input;
pub mod runner;

pub use config::{AppConfig, WindowConfig};
pub use input::PointerTracker;
pub use runner::run;
