//! Per-texel pass kernels.
//!
//! Each function computes one output texel of a pass. The WGSL programs in
//! the GPU backend evaluate the same expressions, so these double as the
//! reference the GPU output is checked against.

use glam::{Vec2, Vec4};

use crate::backend::{AdvectParams, SplatParams, StencilParams};
use crate::field::{Field, Texel};

/// Radial splat weight at `uv`: `exp(-|p|^2 / radius)` with x scaled by aspect.
#[inline]
pub fn splat_falloff(uv: Vec2, params: &SplatParams) -> f32 {
    let mut p = uv - params.point;
    p.x *= params.aspect_ratio;
    (-p.dot(p) / params.radius).exp()
}

#[inline]
pub fn splat<T: Texel>(src: &Field<T>, i: u32, j: u32, params: &SplatParams) -> T {
    let uv = src.grid().texel_center(i, j);
    src.get(i, j) + T::from_vec4(params.value * splat_falloff(uv, params))
}

/// Back-trace the texel center along `velocity` and resample `src` there.
#[inline]
pub fn advect<T: Texel>(
    velocity: &Field<Vec2>,
    src: &Field<T>,
    i: u32,
    j: u32,
    params: &AdvectParams,
) -> T {
    let uv = src.grid().texel_center(i, j);
    let coord = uv - velocity.sample(uv) * params.dt * params.texel_size;
    src.sample(coord) * params.dissipation
}

#[inline]
pub fn divergence(velocity: &Field<Vec2>, i: u32, j: u32, params: &StencilParams) -> f32 {
    let (i, j) = (i as i32, j as i32);
    let l = velocity.load(i - 1, j).x;
    let r = velocity.load(i + 1, j).x;
    let b = velocity.load(i, j - 1).y;
    let t = velocity.load(i, j + 1).y;
    params.half_rdx * ((r - l) + (t - b))
}

#[inline]
pub fn jacobi(
    pressure: &Field<f32>,
    divergence: &Field<f32>,
    i: u32,
    j: u32,
    params: &StencilParams,
) -> f32 {
    let div = divergence.get(i, j);
    let (i, j) = (i as i32, j as i32);
    let l = pressure.load(i - 1, j);
    let r = pressure.load(i + 1, j);
    let b = pressure.load(i, j - 1);
    let t = pressure.load(i, j + 1);
    (l + r + b + t + params.alpha * div) * params.rbeta
}

#[inline]
pub fn subtract_gradient(
    pressure: &Field<f32>,
    velocity: &Field<Vec2>,
    i: u32,
    j: u32,
    params: &StencilParams,
) -> Vec2 {
    let v = velocity.get(i, j);
    let (i, j) = (i as i32, j as i32);
    let l = pressure.load(i - 1, j);
    let r = pressure.load(i + 1, j);
    let b = pressure.load(i, j - 1);
    let t = pressure.load(i, j + 1);
    v - Vec2::new(r - l, t - b) * params.half_rdx
}

/// Display color of a dye sample: RGB clamped to [0, 1], opaque.
#[inline]
pub fn display(dye: Vec4) -> Vec4 {
    dye.truncate().clamp(glam::Vec3::ZERO, glam::Vec3::ONE).extend(1.0)
}
