//! 2D Stable Fluids
//!
//! A grid-based incompressible fluid solver in the style of Stam's stable
//! fluids: splat forces, semi-Lagrangian advection and a Jacobi pressure
//! projection, run over double-buffered fields.
//!
//! The pass sequence lives in [`Simulation`] and is generic over a
//! [`FluidBackend`], which owns the field storage and executes each pass.
//! [`CpuBackend`] runs everything on host memory and is the reference the
//! GPU backend is tested against.
//!
//! # Example
//!
//! ```
//! use sim2d::{CpuBackend, FluidConfig, PointerRecord, Simulation, Splat, SurfaceSize};
//! use glam::{Vec2, Vec3};
//!
//! let mut backend = CpuBackend::new();
//! let config = FluidConfig {
//!     sim_resolution: 32,
//!     dye_resolution: 64,
//!     ..Default::default()
//! };
//! let surface = SurfaceSize::new(320, 320);
//! let mut sim = Simulation::new(&mut backend, config, surface).unwrap();
//!
//! sim.inject(
//!     &mut backend,
//!     &Splat::new(Vec2::splat(0.5), Vec2::new(50.0, 0.0), Vec3::X, 0.01),
//! );
//! let report = sim.step(&mut backend, surface, &PointerRecord::default()).unwrap();
//! assert_eq!(report.frame, 1);
//! ```

pub mod advection;
pub mod backend;
pub mod buffer;
pub mod config;
pub mod constants;
pub mod cpu;
pub mod diagnostics;
pub mod error;
pub mod field;
pub mod fields;
pub mod forces;
pub mod grid;
pub mod kernels;
pub mod pressure;
pub mod resize;
pub mod serde_utils;
pub mod stepper;

pub use backend::{AdvectParams, FluidBackend, GridTarget, SplatParams, StencilParams};
pub use buffer::DoubleBuffer;
pub use config::{DriverConfig, FluidConfig, SplatStyle};
pub use cpu::{CpuBackend, Frame};
pub use error::{ConfigError, FluidError};
pub use field::{Field, Texel};
pub use fields::FieldSet;
pub use forces::{AutoDriver, PointerRecord, Splat};
pub use glam::{Vec2, Vec3, Vec4};
pub use grid::{Grid, Grids, SurfaceSize};
pub use pressure::PressureProjector;
pub use stepper::{FrameReport, Simulation};
