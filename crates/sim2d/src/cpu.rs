//! Reference backend that runs every pass on host memory.
//!
//! Rows are rendered in parallel with rayon; each pass reads only its
//! sources and writes only its destination, so rows are independent.

use glam::{Vec2, Vec4};
use rayon::prelude::*;

use crate::backend::{AdvectParams, FluidBackend, SplatParams, StencilParams};
use crate::error::FluidError;
use crate::field::{Field, Texel};
use crate::grid::{Grid, SurfaceSize};
use crate::kernels;

/// An RGBA8 image of the composited dye, row 0 at the top.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub size: SurfaceSize,
    pub pixels: Vec<[u8; 4]>,
}

impl Frame {
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels[y as usize * self.size.width as usize + x as usize]
    }
}

#[derive(Debug, Default)]
pub struct CpuBackend {
    output: Option<Frame>,
    frames_presented: u64,
}

impl CpuBackend {
    /// Backend whose `present` only counts frames.
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that composites dye into an image of `size` on every present.
    pub fn with_output(size: SurfaceSize) -> Self {
        Self {
            output: Some(Frame {
                size,
                pixels: vec![[0; 4]; size.width as usize * size.height as usize],
            }),
            frames_presented: 0,
        }
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.output.as_ref()
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    fn render<T: Texel>(dst: &mut Field<T>, texel: impl Fn(u32, u32) -> T + Sync) {
        let width = dst.grid().width as usize;
        dst.data_mut()
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(j, row)| {
                for (i, out) in row.iter_mut().enumerate() {
                    *out = texel(i as u32, j as u32);
                }
            });
    }

    fn allocate<T: Texel>(grid: Grid, label: &str) -> Result<Field<T>, FluidError> {
        log::trace!("Allocating {} ({})", label, grid);
        Field::zeros(grid, label)
    }
}

impl FluidBackend for CpuBackend {
    type Scalar = Field<f32>;
    type Vector = Field<Vec2>;
    type Color = Field<Vec4>;

    fn create_scalar(&mut self, grid: Grid, label: &str) -> Result<Self::Scalar, FluidError> {
        Self::allocate(grid, label)
    }

    fn create_vector(&mut self, grid: Grid, label: &str) -> Result<Self::Vector, FluidError> {
        Self::allocate(grid, label)
    }

    fn create_color(&mut self, grid: Grid, label: &str) -> Result<Self::Color, FluidError> {
        Self::allocate(grid, label)
    }

    fn splat_vector(&mut self, src: &Self::Vector, dst: &mut Self::Vector, params: &SplatParams) {
        Self::render(dst, |i, j| kernels::splat(src, i, j, params));
    }

    fn splat_color(&mut self, src: &Self::Color, dst: &mut Self::Color, params: &SplatParams) {
        Self::render(dst, |i, j| kernels::splat(src, i, j, params));
    }

    fn advect_vector(
        &mut self,
        velocity: &Self::Vector,
        src: &Self::Vector,
        dst: &mut Self::Vector,
        params: &AdvectParams,
    ) {
        Self::render(dst, |i, j| kernels::advect(velocity, src, i, j, params));
    }

    fn advect_color(
        &mut self,
        velocity: &Self::Vector,
        src: &Self::Color,
        dst: &mut Self::Color,
        params: &AdvectParams,
    ) {
        Self::render(dst, |i, j| kernels::advect(velocity, src, i, j, params));
    }

    fn divergence(&mut self, velocity: &Self::Vector, dst: &mut Self::Scalar, params: &StencilParams) {
        Self::render(dst, |i, j| kernels::divergence(velocity, i, j, params));
    }

    fn jacobi(
        &mut self,
        pressure: &Self::Scalar,
        divergence: &Self::Scalar,
        dst: &mut Self::Scalar,
        params: &StencilParams,
    ) {
        Self::render(dst, |i, j| kernels::jacobi(pressure, divergence, i, j, params));
    }

    fn subtract_gradient(
        &mut self,
        pressure: &Self::Scalar,
        velocity: &Self::Vector,
        dst: &mut Self::Vector,
        params: &StencilParams,
    ) {
        Self::render(dst, |i, j| {
            kernels::subtract_gradient(pressure, velocity, i, j, params)
        });
    }

    fn present(&mut self, dye: &Self::Color) -> Result<(), FluidError> {
        if let Some(frame) = &mut self.output {
            let size = frame.size;
            let width = size.width.max(1) as usize;
            frame
                .pixels
                .par_chunks_mut(width)
                .enumerate()
                .for_each(|(y, row)| {
                    for (x, px) in row.iter_mut().enumerate() {
                        // Surface rows run top-down, field rows bottom-up.
                        let uv = Vec2::new(
                            (x as f32 + 0.5) / size.width as f32,
                            1.0 - (y as f32 + 0.5) / size.height as f32,
                        );
                        let color = kernels::display(dye.sample(uv)) * 255.0;
                        *px = color.round().to_array().map(|c| c as u8);
                    }
                });
        }
        self.frames_presented += 1;
        Ok(())
    }
}
