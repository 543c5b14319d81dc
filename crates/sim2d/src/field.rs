//! Host-memory field storage used by the CPU backend and diagnostics.

use std::ops::{Add, Mul, Sub};

use glam::{Vec2, Vec4};

use crate::backend::GridTarget;
use crate::error::FluidError;
use crate::grid::Grid;

/// Element type of a field: 1, 2 or 4 float components.
pub trait Texel:
    Copy
    + Default
    + PartialEq
    + std::fmt::Debug
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f32, Output = Self>
    + 'static
{
    const COMPONENTS: usize;

    /// Take the leading components of a 4-vector.
    fn from_vec4(v: Vec4) -> Self;

    /// Widen to a 4-vector, missing components are zero.
    fn to_vec4(self) -> Vec4;

    #[inline]
    fn lerp(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Texel for f32 {
    const COMPONENTS: usize = 1;

    fn from_vec4(v: Vec4) -> Self {
        v.x
    }

    fn to_vec4(self) -> Vec4 {
        Vec4::new(self, 0.0, 0.0, 0.0)
    }
}

impl Texel for Vec2 {
    const COMPONENTS: usize = 2;

    fn from_vec4(v: Vec4) -> Self {
        v.truncate().truncate()
    }

    fn to_vec4(self) -> Vec4 {
        self.extend(0.0).extend(0.0)
    }
}

impl Texel for Vec4 {
    const COMPONENTS: usize = 4;

    fn from_vec4(v: Vec4) -> Self {
        v
    }

    fn to_vec4(self) -> Vec4 {
        self
    }
}

/// A 2-D array of texels, row-major with row 0 at the bottom.
#[derive(Clone, Debug, PartialEq)]
pub struct Field<T> {
    grid: Grid,
    data: Vec<T>,
}

impl<T: Texel> Field<T> {
    /// Zero-filled field. Fails instead of aborting when memory is short.
    pub fn zeros(grid: Grid, label: &str) -> Result<Self, FluidError> {
        let len = grid.texel_count();
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|e| FluidError::Allocation {
                label: label.to_string(),
                grid,
                reason: e.to_string(),
            })?;
        data.resize(len, T::default());
        Ok(Self { grid, data })
    }

    pub fn from_fn(grid: Grid, f: impl Fn(u32, u32) -> T) -> Self {
        let mut data = Vec::with_capacity(grid.texel_count());
        for j in 0..grid.height {
            for i in 0..grid.width {
                data.push(f(i, j));
            }
        }
        Self { grid, data }
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    #[inline]
    pub fn get(&self, i: u32, j: u32) -> T {
        self.data[self.grid.index(i, j)]
    }

    #[inline]
    pub fn set(&mut self, i: u32, j: u32, value: T) {
        let idx = self.grid.index(i, j);
        self.data[idx] = value;
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Texel fetch with clamp-to-edge addressing.
    #[inline]
    pub fn load(&self, i: i32, j: i32) -> T {
        let i = i.clamp(0, self.grid.width as i32 - 1) as u32;
        let j = j.clamp(0, self.grid.height as i32 - 1) as u32;
        self.get(i, j)
    }

    /// Bilinear sample at a normalized position, clamped to the edge texels.
    pub fn sample(&self, uv: Vec2) -> T {
        let size = Vec2::new(self.grid.width as f32, self.grid.height as f32);
        let st = uv * size - Vec2::splat(0.5);
        let base = st.floor();
        let f = st - base;
        // Clamp one texel past each edge so the `+ 1` neighbor cannot overflow.
        let i = base.x.clamp(-1.0, size.x) as i32;
        let j = base.y.clamp(-1.0, size.y) as i32;

        let bottom = self.load(i, j).lerp(self.load(i + 1, j), f.x);
        let top = self.load(i, j + 1).lerp(self.load(i + 1, j + 1), f.x);
        bottom.lerp(top, f.y)
    }

    pub fn sum(&self) -> T {
        self.data.iter().fold(T::default(), |acc, &v| acc + v)
    }
}

impl<T> GridTarget for Field<T> {
    fn grid(&self) -> Grid {
        self.grid
    }
}
