//! Pressure projection tests
//!
//! Tests divergence computation, Jacobi relaxation, and gradient subtraction
//! on the CPU backend.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sim2d::diagnostics::{has_non_finite, max_abs, max_abs_divergence};
use sim2d::{
    CpuBackend, Field, FieldSet, FluidBackend, Grid, Grids, PressureProjector, StencilParams, Vec2,
    Vec4,
};

fn field_set(backend: &mut CpuBackend, sim: Grid) -> FieldSet<CpuBackend> {
    FieldSet::allocate(
        backend,
        Grids {
            simulation: sim,
            display: Grid::new(sim.width * 2, sim.height * 2),
        },
    )
    .unwrap()
}

/// Radially outward blob: a smooth source with positive divergence at its center.
fn source_blob(grid: Grid) -> Field<Vec2> {
    let center = Vec2::splat(0.5);
    Field::from_fn(grid, |i, j| {
        let p = (grid.texel_center(i, j) - center) * Vec2::new(grid.width as f32, grid.height as f32);
        p * (-p.length_squared() / 16.0).exp()
    })
}

/// Test that divergence of a uniform velocity field is zero everywhere
#[test]
fn test_divergence_uniform_velocity() {
    let mut backend = CpuBackend::new();
    let grid = Grid::new(24, 16);
    let velocity = Field::from_fn(grid, |_, _| Vec2::new(2.5, -1.25));
    let mut divergence = backend.create_scalar(grid, "Divergence").unwrap();

    backend.divergence(&velocity, &mut divergence, &StencilParams::default());

    for &div in divergence.data() {
        assert!(
            div.abs() < 1e-6,
            "Divergence should be zero for uniform velocity, got: {}",
            div
        );
    }
}

/// Test that projecting a divergence-free field leaves it unchanged
#[test]
fn test_projection_of_divergence_free_field_is_noop() {
    let mut backend = CpuBackend::new();
    let grid = Grid::new(32, 32);
    let mut fields = field_set(&mut backend, grid);

    // Horizontal shear: u depends only on y, v = 0.
    let shear = Field::from_fn(grid, |_, j| {
        Vec2::new((j as f32 * std::f32::consts::TAU / 32.0).sin(), 0.0)
    });
    *fields.velocity.write_mut() = shear.clone();
    fields.velocity.swap();

    PressureProjector::new(20).project(&mut backend, &mut fields);

    assert_eq!(max_abs(&fields.divergence), 0.0);
    assert_eq!(max_abs(fields.pressure.read()), 0.0);
    for (out, input) in fields.velocity.read().data().iter().zip(shear.data()) {
        assert!((*out - *input).length() < 1e-6);
    }
}

/// Test that the projection reduces divergence of a smooth source
#[test]
fn test_projection_reduces_divergence() {
    let mut backend = CpuBackend::new();
    let grid = Grid::new(32, 32);
    let mut fields = field_set(&mut backend, grid);

    let blob = source_blob(grid);
    let before = max_abs_divergence(&blob);
    assert!(before > 0.1);

    *fields.velocity.write_mut() = blob;
    fields.velocity.swap();
    PressureProjector::new(20).project(&mut backend, &mut fields);
    let after = max_abs_divergence(fields.velocity.read());

    assert!(
        after < before,
        "Projection should reduce divergence: before {}, after {}",
        before,
        after
    );
}

/// Test that more sweeps converge closer to a divergence-free field
#[test]
fn test_more_iterations_converge_further() {
    let grid = Grid::new(32, 32);
    let blob = source_blob(grid);
    let before = max_abs_divergence(&blob);

    let mut results = Vec::new();
    for iterations in [5, 500] {
        let mut backend = CpuBackend::new();
        let mut fields = field_set(&mut backend, grid);
        *fields.velocity.write_mut() = blob.clone();
        fields.velocity.swap();
        PressureProjector::new(iterations).project(&mut backend, &mut fields);
        results.push(max_abs_divergence(fields.velocity.read()));
    }

    assert!(results[1] < results[0]);
    assert!(
        results[1] < 0.5 * before,
        "500 sweeps should at least halve divergence: before {}, after {}",
        before,
        results[1]
    );
}

/// Test that pressure carries over between projections
#[test]
fn test_pressure_is_warm_started() {
    let mut backend = CpuBackend::new();
    let grid = Grid::new(16, 16);
    let mut fields = field_set(&mut backend, grid);
    *fields.velocity.write_mut() = source_blob(grid);
    fields.velocity.swap();

    let projector = PressureProjector::new(20);
    projector.compute_divergence(&mut backend, &mut fields);
    projector.relax(&mut backend, &mut fields);
    let first = fields.pressure.read().clone();
    projector.relax(&mut backend, &mut fields);

    assert!(max_abs(&first) > 0.0);
    // A second round continues from the first instead of restarting at zero.
    assert_ne!(fields.pressure.read(), &first);
    assert_eq!(fields.pressure.read_index(), 0, "40 swaps return to the start");
}

/// Test that Jacobi sweeps on random input stay finite and bounded
#[test]
fn test_relaxation_of_random_divergence_is_finite() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut backend = CpuBackend::new();
    let grid = Grid::new(20, 12);
    let mut fields = field_set(&mut backend, grid);
    let noise = Field::from_fn(grid, |_, _| Vec2::ZERO);
    *fields.velocity.write_mut() = noise;
    fields.velocity.swap();
    for v in fields.divergence.data_mut() {
        *v = rng.gen_range(-1.0..1.0);
    }

    PressureProjector::new(20).relax(&mut backend, &mut fields);
    let p = fields.pressure.read();
    assert!(p.data().iter().all(|v| v.is_finite()));
    // Each sweep adds at most |div| / 4 to the max norm.
    assert!(max_abs(p) <= 20.0 * 0.25 + 1e-4);
}

/// Test that non-finite values propagate without stopping the pipeline
#[test]
fn test_non_finite_velocity_does_not_panic() {
    let mut backend = CpuBackend::new();
    let grid = Grid::new(8, 8);
    let mut fields = field_set(&mut backend, grid);
    fields.velocity.write_mut().set(4, 4, Vec2::new(f32::NAN, 0.0));
    fields.velocity.swap();

    PressureProjector::new(20).project(&mut backend, &mut fields);
    sim2d::advection::advect_dye(&mut backend, &mut fields, 0.016, 0.995);

    assert!(has_non_finite(fields.velocity.read()));
    assert!(fields.dye.read().data().iter().all(|c| *c == Vec4::ZERO || !c.is_finite()));
}

/// Test that a blown-up but finite velocity clamps its back-trace to the edge
#[test]
fn test_huge_velocity_advection_does_not_panic() {
    let mut backend = CpuBackend::new();
    let grid = Grid::new(8, 8);
    let mut fields = field_set(&mut backend, grid);
    fields.velocity.write_mut().fill(Vec2::new(0.0, -1.0e12));
    fields.velocity.swap();
    fields.dye.write_mut().fill(Vec4::new(1.0, 0.5, 0.25, 0.0));
    fields.dye.swap();

    sim2d::advection::advect_velocity(&mut backend, &mut fields, 0.016, 1.0);
    sim2d::advection::advect_dye(&mut backend, &mut fields, 0.016, 1.0);

    // Uniform fields sampled at the clamped edge come back unchanged
    assert!(fields
        .velocity
        .read()
        .data()
        .iter()
        .all(|v| *v == Vec2::new(0.0, -1.0e12)));
    assert!(fields
        .dye
        .read()
        .data()
        .iter()
        .all(|c| *c == Vec4::new(1.0, 0.5, 0.25, 0.0)));

    fields.velocity.write_mut().fill(Vec2::new(3.0e20, 3.0e20));
    fields.velocity.swap();
    sim2d::advection::advect_velocity(&mut backend, &mut fields, 0.016, 0.995);
    assert!(fields.velocity.read().data().iter().all(|v| v.is_finite()));
}
