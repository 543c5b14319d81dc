//! Default simulation constants.
//!
//! Values are fixed once a [`Simulation`](crate::Simulation) is created;
//! [`FluidConfig`](crate::FluidConfig) starts from these.

/// Rows of the Simulation Grid (velocity, divergence, pressure)
pub const SIM_RESOLUTION: u32 = 128;

/// Rows of the Display Grid (dye)
pub const DYE_RESOLUTION: u32 = 512;

/// Jacobi iterations per frame. Fixed; there is no convergence test.
pub const PRESSURE_ITERATIONS: u32 = 20;

/// Fixed time step (seconds)
pub const DT: f32 = 0.016;

/// Per-frame decay applied when advecting velocity
pub const VELOCITY_DISSIPATION: f32 = 0.995;

/// Per-frame decay applied when advecting dye
pub const DYE_DISSIPATION: f32 = 0.995;

/// Cell size used by the pressure stencils, in texels
pub const CELL_SIZE: f32 = 1.0;

// =============================================================================
// FORCING
// =============================================================================

/// Dye color injected by pointer drags
pub const POINTER_COLOR: [f32; 3] = [1.0, 0.5, 0.1];

/// Splat radius for pointer drags (normalized, squared-distance scale)
pub const POINTER_RADIUS: f32 = 0.03;

/// Pointer displacement gain applied by the input tracker
pub const POINTER_FORCE: f32 = 5.0;

/// Dye color injected by the synthetic driver
pub const DRIVER_COLOR: [f32; 3] = [1.0, 0.6, 0.1];

/// Splat radius for the synthetic driver
pub const DRIVER_RADIUS: f32 = 0.02;

/// Driver clock at the first frame
pub const DRIVER_START_TIME: f32 = 0.6;

/// Driver clock increment per frame
pub const DRIVER_TIME_STEP: f32 = 0.015;

/// Driver stops once its effective angle reaches this value
pub const DRIVER_DURATION: f32 = 6.7;

/// Gain from driver path displacement (pixels) to velocity impulse
pub const DRIVER_FORCE: f32 = 6.0;

/// Driver start position as a fraction of the surface
pub const DRIVER_ORIGIN: [f32; 2] = [0.65, 0.5];
