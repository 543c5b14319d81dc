//! The per-frame pass sequence.

use crate::advection;
use crate::backend::FluidBackend;
use crate::config::FluidConfig;
use crate::error::FluidError;
use crate::fields::FieldSet;
use crate::forces::{self, AutoDriver, PointerRecord, Splat};
use crate::grid::{Grids, SurfaceSize};
use crate::pressure::PressureProjector;

/// What a call to [`Simulation::step`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Frames completed so far, including this one
    pub frame: u64,
    /// Splats injected this frame
    pub splats: u32,
    /// Fields were reallocated before the passes ran
    pub resized: bool,
    /// The surface had a zero dimension and no pass ran
    pub skipped: bool,
}

/// One simulation instance: configuration, fields and forcing state.
///
/// Every backend call goes through the `backend` argument, so a context can
/// be stepped by whichever backend allocated its fields.
pub struct Simulation<B: FluidBackend> {
    pub(crate) config: FluidConfig,
    pub(crate) fields: FieldSet<B>,
    pub(crate) surface: SurfaceSize,
    projector: PressureProjector,
    driver: Option<AutoDriver>,
    frame: u64,
    /// Last surface seen by `step` was empty
    paused: bool,
}

impl<B: FluidBackend> Simulation<B> {
    /// Validate `config`, allocate all fields for `surface` and inject the seed splats.
    pub fn new(backend: &mut B, config: FluidConfig, surface: SurfaceSize) -> Result<Self, FluidError> {
        config.validate()?;
        let surface = SurfaceSize::new(surface.width.max(1), surface.height.max(1));
        let grids = Grids::for_surface(surface, config.sim_resolution, config.dye_resolution);
        let fields = FieldSet::allocate(backend, grids)?;

        let mut sim = Self {
            projector: PressureProjector::new(config.pressure_iterations),
            driver: config.driver.enabled.then(AutoDriver::new),
            config,
            fields,
            surface,
            frame: 0,
            paused: false,
        };
        sim.seed(backend);
        Ok(sim)
    }

    /// Run one frame: forces, velocity advection, projection, dye advection, present.
    ///
    /// A changed `surface` reallocates every field before any pass reads one.
    pub fn step(
        &mut self,
        backend: &mut B,
        surface: SurfaceSize,
        pointer: &PointerRecord,
    ) -> Result<FrameReport, FluidError> {
        if surface.is_empty() {
            if !self.paused {
                log::warn!(
                    "Surface is {}x{}, skipping frames until it has an area",
                    surface.width,
                    surface.height
                );
                self.paused = true;
            }
            return Ok(FrameReport {
                frame: self.frame,
                skipped: true,
                ..Default::default()
            });
        }

        if self.paused {
            log::info!("Surface restored at {}x{}", surface.width, surface.height);
            self.paused = false;
        }

        let resized = self.resize_if_needed(backend, surface)?;
        self.fields.check_grids()?;

        let aspect_ratio = surface.aspect_ratio();
        let mut splats = 0;

        if let Some(driver) = &mut self.driver {
            if let Some(splat) = driver.next_splat(surface, &self.config.driver.style) {
                forces::inject(backend, &mut self.fields, &splat, aspect_ratio);
                splats += 1;
            }
            if driver.is_finished() {
                self.driver = None;
            }
        }

        if let Some(splat) = pointer.splat(surface, &self.config.pointer) {
            log::debug!(
                "Pointer splat at ({:.3}, {:.3}) impulse ({:.1}, {:.1})",
                splat.point.x,
                splat.point.y,
                splat.velocity.x,
                splat.velocity.y
            );
            forces::inject(backend, &mut self.fields, &splat, aspect_ratio);
            splats += 1;
        }

        advection::advect_velocity(
            backend,
            &mut self.fields,
            self.config.dt,
            self.config.velocity_dissipation,
        );
        self.projector.project(backend, &mut self.fields);
        advection::advect_dye(
            backend,
            &mut self.fields,
            self.config.dt,
            self.config.dye_dissipation,
        );
        backend.present(self.fields.dye.read())?;

        self.frame += 1;
        Ok(FrameReport {
            frame: self.frame,
            splats,
            resized,
            skipped: false,
        })
    }

    /// Inject a splat outside the regular forcing, using the current surface aspect.
    pub fn inject(&mut self, backend: &mut B, splat: &Splat) {
        forces::inject(backend, &mut self.fields, splat, self.surface.aspect_ratio());
    }

    pub(crate) fn seed(&mut self, backend: &mut B) {
        let aspect_ratio = self.surface.aspect_ratio();
        for splat in &self.config.seed {
            forces::inject(backend, &mut self.fields, splat, aspect_ratio);
        }
        if !self.config.seed.is_empty() {
            log::debug!("Seeded {} splats", self.config.seed.len());
        }
    }

    pub fn fields(&self) -> &FieldSet<B> {
        &self.fields
    }

    pub fn config(&self) -> &FluidConfig {
        &self.config
    }

    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// True while frames are being skipped on an empty surface.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// True while the opening animation is still producing splats.
    pub fn driver_active(&self) -> bool {
        self.driver.is_some()
    }
}
