//! The named fields of one simulation.

use crate::backend::{FluidBackend, GridTarget};
use crate::buffer::DoubleBuffer;
use crate::error::FluidError;
use crate::grid::{Grid, Grids};

/// Velocity, Dye and Pressure are double-buffered; Divergence is rewritten
/// in full every frame and never swapped.
pub struct FieldSet<B: FluidBackend> {
    pub velocity: DoubleBuffer<B::Vector>,
    pub dye: DoubleBuffer<B::Color>,
    pub pressure: DoubleBuffer<B::Scalar>,
    pub divergence: B::Scalar,
    grids: Grids,
}

impl<B: FluidBackend> FieldSet<B> {
    /// Allocate every field. Either all targets are created or none are returned.
    pub fn allocate(backend: &mut B, grids: Grids) -> Result<Self, FluidError> {
        let sim = grids.simulation;
        let display = grids.display;
        log::info!("Allocating fields: simulation {}, display {}", sim, display);

        let velocity = DoubleBuffer::new(
            backend.create_vector(sim, "Velocity A")?,
            backend.create_vector(sim, "Velocity B")?,
        );
        let dye = DoubleBuffer::new(
            backend.create_color(display, "Dye A")?,
            backend.create_color(display, "Dye B")?,
        );
        let pressure = DoubleBuffer::new(
            backend.create_scalar(sim, "Pressure A")?,
            backend.create_scalar(sim, "Pressure B")?,
        );
        let divergence = backend.create_scalar(sim, "Divergence")?;

        let fields = Self {
            velocity,
            dye,
            pressure,
            divergence,
            grids,
        };
        fields.check_grids()?;
        Ok(fields)
    }

    pub fn grids(&self) -> Grids {
        self.grids
    }

    /// Verify every member still matches the grid it was allocated against.
    pub fn check_grids(&self) -> Result<(), FluidError> {
        let sim = self.grids.simulation;
        let display = self.grids.display;
        check("velocity", sim, self.velocity.targets())?;
        check("pressure", sim, self.pressure.targets())?;
        check("divergence", sim, std::slice::from_ref(&self.divergence))?;
        check("dye", display, self.dye.targets())?;
        Ok(())
    }
}

fn check<T: GridTarget>(field: &'static str, expected: Grid, targets: &[T]) -> Result<(), FluidError> {
    for target in targets {
        let actual = target.grid();
        if actual != expected {
            return Err(FluidError::GridMismatch {
                field,
                expected,
                actual,
            });
        }
    }
    Ok(())
}
