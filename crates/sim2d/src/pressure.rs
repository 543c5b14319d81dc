//! Pressure projection: divergence, Jacobi relaxation, gradient subtraction.
//!
//! Solves the discrete Poisson equation `laplacian(p) = div(u)` with a fixed
//! number of Jacobi sweeps, then removes `grad(p)` from velocity so the
//! result is approximately divergence-free. There is no convergence test;
//! the sweep count is part of the visual behavior.

use crate::backend::{FluidBackend, StencilParams};
use crate::fields::FieldSet;

#[derive(Clone, Copy, Debug)]
pub struct PressureProjector {
    /// Jacobi sweeps per projection
    pub iterations: u32,
    pub stencil: StencilParams,
}

impl PressureProjector {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations,
            stencil: StencilParams::default(),
        }
    }

    /// Run all three stages in order.
    pub fn project<B: FluidBackend>(&self, backend: &mut B, fields: &mut FieldSet<B>) {
        self.compute_divergence(backend, fields);
        self.relax(backend, fields);
        self.subtract_gradient(backend, fields);
    }

    /// Write the divergence of the current velocity. Single-buffered, no swap.
    pub fn compute_divergence<B: FluidBackend>(&self, backend: &mut B, fields: &mut FieldSet<B>) {
        backend.divergence(fields.velocity.read(), &mut fields.divergence, &self.stencil);
    }

    /// Jacobi sweeps starting from the previous frame's pressure.
    pub fn relax<B: FluidBackend>(&self, backend: &mut B, fields: &mut FieldSet<B>) {
        for _ in 0..self.iterations {
            let (src, dst) = fields.pressure.split();
            backend.jacobi(src, &fields.divergence, dst, &self.stencil);
            fields.pressure.swap();
        }
    }

    pub fn subtract_gradient<B: FluidBackend>(&self, backend: &mut B, fields: &mut FieldSet<B>) {
        let pressure = fields.pressure.read();
        let (src, dst) = fields.velocity.split();
        backend.subtract_gradient(pressure, src, dst, &self.stencil);
        fields.velocity.swap();
    }
}
