//! Scalar summaries of host fields for tests and logging.

use glam::{Vec2, Vec4};

use crate::backend::StencilParams;
use crate::field::Field;
use crate::kernels;

/// Sum of the RGB channels over every dye texel.
pub fn dye_mass(dye: &Field<Vec4>) -> f32 {
    dye.data().iter().map(|c| c.x + c.y + c.z).sum()
}

/// Mass-weighted mean texel center of the dye, `None` for an empty field.
pub fn dye_centroid(dye: &Field<Vec4>) -> Option<Vec2> {
    let grid = dye.grid();
    let mut weighted = Vec2::ZERO;
    let mut mass = 0.0;
    for j in 0..grid.height {
        for i in 0..grid.width {
            let c = dye.get(i, j);
            let m = c.x + c.y + c.z;
            weighted += grid.texel_center(i, j) * m;
            mass += m;
        }
    }
    (mass > 0.0).then(|| weighted / mass)
}

pub fn mean_velocity(velocity: &Field<Vec2>) -> Vec2 {
    velocity.sum() / velocity.grid().texel_count() as f32
}

pub fn max_abs(field: &Field<f32>) -> f32 {
    field.data().iter().fold(0.0f32, |m, v| m.max(v.abs()))
}

/// Largest absolute divergence of `velocity`, with the same stencil as the projector.
pub fn max_abs_divergence(velocity: &Field<Vec2>) -> f32 {
    let params = StencilParams::default();
    let grid = velocity.grid();
    let mut max = 0.0f32;
    for j in 0..grid.height {
        for i in 0..grid.width {
            max = max.max(kernels::divergence(velocity, i, j, &params).abs());
        }
    }
    max
}

/// True if any component of any texel is NaN or infinite.
pub fn has_non_finite(velocity: &Field<Vec2>) -> bool {
    velocity.data().iter().any(|v| !v.is_finite())
}
