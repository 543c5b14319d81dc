//! Semi-Lagrangian advection of velocity and dye.

use crate::backend::{AdvectParams, FluidBackend, GridTarget};
use crate::fields::FieldSet;

/// Transport velocity along itself, then swap.
pub fn advect_velocity<B: FluidBackend>(
    backend: &mut B,
    fields: &mut FieldSet<B>,
    dt: f32,
    dissipation: f32,
) {
    let (src, dst) = fields.velocity.split();
    let params = AdvectParams {
        texel_size: src.grid().texel_size(),
        dt,
        dissipation,
    };
    backend.advect_vector(src, src, dst, &params);
    fields.velocity.swap();
}

/// Transport dye along the current velocity, then swap.
///
/// Velocity lives on the coarser grid and is resampled at each dye texel.
pub fn advect_dye<B: FluidBackend>(
    backend: &mut B,
    fields: &mut FieldSet<B>,
    dt: f32,
    dissipation: f32,
) {
    let velocity = fields.velocity.read();
    let (src, dst) = fields.dye.split();
    let params = AdvectParams {
        texel_size: src.grid().texel_size(),
        dt,
        dissipation,
    };
    backend.advect_color(velocity, src, dst, &params);
    fields.dye.swap();
}
