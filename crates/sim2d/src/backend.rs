//! The seam between the stepper and whatever executes the passes.
//!
//! A backend owns pass programs and field storage. The stepper only decides
//! which target each pass reads and writes and in what order; every pass
//! writes exactly one destination and never reads it.

use glam::{Vec2, Vec4};

use crate::constants::CELL_SIZE;
use crate::error::FluidError;
use crate::grid::Grid;

/// A field target with known dimensions.
pub trait GridTarget {
    fn grid(&self) -> Grid;
}

/// Uniforms of the splat program.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplatParams {
    /// Normalized center, y-up
    pub point: Vec2,
    pub radius: f32,
    /// Surface width / height, keeps the falloff circular on screen
    pub aspect_ratio: f32,
    /// Added at the center, scaled by the falloff elsewhere
    pub value: Vec4,
}

/// Uniforms of the advection program.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdvectParams {
    /// Texel size of the advected quantity's grid
    pub texel_size: Vec2,
    pub dt: f32,
    pub dissipation: f32,
}

/// Uniforms shared by the divergence, Jacobi and gradient programs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StencilParams {
    /// 0.5 / cell size, for central differences
    pub half_rdx: f32,
    /// -(cell size)^2
    pub alpha: f32,
    /// Reciprocal of the neighbor count
    pub rbeta: f32,
}

impl StencilParams {
    pub fn for_cell_size(cell_size: f32) -> Self {
        Self {
            half_rdx: 0.5 / cell_size,
            alpha: -(cell_size * cell_size),
            rbeta: 0.25,
        }
    }
}

impl Default for StencilParams {
    fn default() -> Self {
        Self::for_cell_size(CELL_SIZE)
    }
}

/// Executes the simulation passes on some storage.
///
/// `Scalar` holds divergence and pressure, `Vector` holds velocity and
/// `Color` holds dye.
pub trait FluidBackend {
    type Scalar: GridTarget;
    type Vector: GridTarget;
    type Color: GridTarget;

    fn create_scalar(&mut self, grid: Grid, label: &str) -> Result<Self::Scalar, FluidError>;
    fn create_vector(&mut self, grid: Grid, label: &str) -> Result<Self::Vector, FluidError>;
    fn create_color(&mut self, grid: Grid, label: &str) -> Result<Self::Color, FluidError>;

    /// `dst = src + falloff * value.xy`
    fn splat_vector(&mut self, src: &Self::Vector, dst: &mut Self::Vector, params: &SplatParams);
    /// `dst = src + falloff * value`
    fn splat_color(&mut self, src: &Self::Color, dst: &mut Self::Color, params: &SplatParams);

    /// Semi-Lagrangian transport of `src` along `velocity`.
    fn advect_vector(
        &mut self,
        velocity: &Self::Vector,
        src: &Self::Vector,
        dst: &mut Self::Vector,
        params: &AdvectParams,
    );
    fn advect_color(
        &mut self,
        velocity: &Self::Vector,
        src: &Self::Color,
        dst: &mut Self::Color,
        params: &AdvectParams,
    );

    fn divergence(&mut self, velocity: &Self::Vector, dst: &mut Self::Scalar, params: &StencilParams);

    /// One relaxation sweep of the pressure Poisson equation.
    fn jacobi(
        &mut self,
        pressure: &Self::Scalar,
        divergence: &Self::Scalar,
        dst: &mut Self::Scalar,
        params: &StencilParams,
    );

    /// `dst = velocity - grad(pressure)`
    fn subtract_gradient(
        &mut self,
        pressure: &Self::Scalar,
        velocity: &Self::Vector,
        dst: &mut Self::Vector,
        params: &StencilParams,
    );

    /// Composite dye onto the output.
    fn present(&mut self, dye: &Self::Color) -> Result<(), FluidError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_cell_stencil() {
        let params = StencilParams::default();
        assert_eq!(params.half_rdx, 0.5);
        assert_eq!(params.alpha, -1.0);
        assert_eq!(params.rbeta, 0.25);
    }
}
