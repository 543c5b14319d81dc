//! Field reallocation when the presentation surface changes size.

use crate::backend::FluidBackend;
use crate::error::FluidError;
use crate::fields::FieldSet;
use crate::grid::{Grids, SurfaceSize};
use crate::stepper::Simulation;

impl<B: FluidBackend> Simulation<B> {
    /// Reallocate if `surface` differs from the size the fields were built for.
    ///
    /// Returns whether a reallocation happened.
    pub fn resize_if_needed(&mut self, backend: &mut B, surface: SurfaceSize) -> Result<bool, FluidError> {
        if surface == self.surface || surface.is_empty() {
            return Ok(false);
        }
        self.reallocate(backend, surface)?;
        Ok(true)
    }

    /// Replace the whole Field Set with fresh fields for `surface`, then re-seed.
    ///
    /// On failure the previous fields and surface are left untouched.
    pub fn reallocate(&mut self, backend: &mut B, surface: SurfaceSize) -> Result<(), FluidError> {
        let grids = Grids::for_surface(
            surface,
            self.config.sim_resolution,
            self.config.dye_resolution,
        );
        log::info!(
            "Surface resized {}x{} -> {}x{}",
            self.surface.width,
            self.surface.height,
            surface.width,
            surface.height
        );
        let fields = FieldSet::allocate(backend, grids)?;
        self.fields = fields;
        self.surface = surface;
        self.seed(backend);
        Ok(())
    }
}
