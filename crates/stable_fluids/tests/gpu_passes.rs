//! GPU pass tests
//!
//! Every pass is run on a headless wgpu device and read back against the
//! CPU backend, which implements the same per-texel kernels. Tests skip
//! with a message when no adapter is available.

use sim2d::diagnostics::{dye_mass, max_abs_divergence};
use sim2d::{
    CpuBackend, Field, FluidBackend, FluidConfig, Grid, PointerRecord, Simulation, Splat,
    SplatParams, StencilParams, SurfaceSize, Texel, Vec2, Vec3, Vec4,
};
use stable_fluids::{GpuBackend, GpuContext};

const TOLERANCE: f32 = 1e-4;

/// Headless backend rendering into an offscreen output of `width` x `height`.
/// Returns None if no compatible GPU adapter is found.
fn init_backend(width: u32, height: u32) -> Option<GpuBackend> {
    let ctx = match pollster::block_on(GpuContext::headless(width, height)) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("No usable GPU adapter ({}); skipping test.", e);
            return None;
        }
    };
    match GpuBackend::new(ctx) {
        Ok(backend) => Some(backend),
        Err(e) => panic!("GPU backend failed to initialize: {}", e),
    }
}

fn max_diff<T: Texel>(a: &Field<T>, b: &Field<T>) -> f32 {
    assert_eq!(a.grid(), b.grid());
    a.data()
        .iter()
        .zip(b.data())
        .map(|(x, y)| (x.to_vec4() - y.to_vec4()).abs().max_element())
        .fold(0.0, f32::max)
}

fn small_config() -> FluidConfig {
    let mut config = FluidConfig {
        sim_resolution: 24,
        dye_resolution: 48,
        ..Default::default()
    };
    config.driver.enabled = false;
    config
}

#[test]
fn test_gpu_splat_matches_cpu() {
    let Some(mut gpu) = init_backend(64, 64) else {
        return;
    };
    let mut cpu = CpuBackend::new();
    let grid = Grid::new(40, 30);
    let params = SplatParams {
        point: Vec2::new(0.3, 0.6),
        radius: 0.01,
        aspect_ratio: 4.0 / 3.0,
        value: Vec4::new(2.0, -1.0, 0.0, 0.0),
    };

    let src = gpu.create_vector(grid, "src").unwrap();
    let mut dst = gpu.create_vector(grid, "dst").unwrap();
    gpu.splat_vector(&src, &mut dst, &params);
    let gpu_result: Field<Vec2> = gpu.read_field(&dst).unwrap();

    let cpu_src = cpu.create_vector(grid, "src").unwrap();
    let mut cpu_dst = cpu.create_vector(grid, "dst").unwrap();
    cpu.splat_vector(&cpu_src, &mut cpu_dst, &params);

    let diff = max_diff(&gpu_result, &cpu_dst);
    assert!(diff < TOLERANCE, "splat differs by {}", diff);
    // Row 0 is the bottom of the field on both backends
    assert!(gpu_result.get(12, 17).x > gpu_result.get(12, 12).x);
}

#[test]
fn test_gpu_divergence_of_uniform_flow_is_zero() {
    let Some(mut gpu) = init_backend(64, 64) else {
        return;
    };
    let grid = Grid::new(16, 16);
    let src = gpu.create_vector(grid, "src").unwrap();
    let mut velocity = gpu.create_vector(grid, "velocity").unwrap();
    // A splat with a huge radius is uniform to within float precision
    gpu.splat_vector(
        &src,
        &mut velocity,
        &SplatParams {
            point: Vec2::splat(0.5),
            radius: 1e9,
            aspect_ratio: 1.0,
            value: Vec4::new(3.0, -2.0, 0.0, 0.0),
        },
    );
    let mut divergence = gpu.create_scalar(grid, "divergence").unwrap();
    gpu.divergence(&velocity, &mut divergence, &StencilParams::default());

    let result: Field<f32> = gpu.read_field(&divergence).unwrap();
    assert!(result.data().iter().all(|d| d.abs() < 1e-5));
}

/// Test a full frame (splat, advection, 20 Jacobi iterations, gradient) on both backends
#[test]
fn test_gpu_frame_matches_cpu() {
    let surface = SurfaceSize::new(96, 64);
    let Some(mut gpu) = init_backend(surface.width, surface.height) else {
        return;
    };
    let mut cpu = CpuBackend::new();
    let config = small_config();
    let mut gpu_sim = Simulation::new(&mut gpu, config.clone(), surface).unwrap();
    let mut cpu_sim = Simulation::new(&mut cpu, config, surface).unwrap();

    let pointer = PointerRecord {
        x: 40.0,
        y: 30.0,
        dx: 60.0,
        dy: 25.0,
        is_down: true,
    };
    for frame in 0..3 {
        let record = if frame == 0 { pointer } else { PointerRecord::default() };
        gpu_sim.step(&mut gpu, surface, &record).unwrap();
        cpu_sim.step(&mut cpu, surface, &record).unwrap();
    }

    let gpu_velocity: Field<Vec2> = gpu.read_field(gpu_sim.fields().velocity.read()).unwrap();
    let gpu_pressure: Field<f32> = gpu.read_field(gpu_sim.fields().pressure.read()).unwrap();
    let gpu_dye: Field<Vec4> = gpu.read_field(gpu_sim.fields().dye.read()).unwrap();

    let fields = cpu_sim.fields();
    let velocity_diff = max_diff(&gpu_velocity, fields.velocity.read());
    let pressure_diff = max_diff(&gpu_pressure, fields.pressure.read());
    let dye_diff = max_diff(&gpu_dye, fields.dye.read());

    assert!(velocity_diff < 1e-3, "velocity differs by {}", velocity_diff);
    assert!(pressure_diff < 1e-3, "pressure differs by {}", pressure_diff);
    assert!(dye_diff < 1e-3, "dye differs by {}", dye_diff);
    assert!(dye_mass(&gpu_dye) > 0.0);
    assert!(max_abs_divergence(&gpu_velocity).is_finite());
}

#[test]
fn test_gpu_offscreen_present_matches_cpu() {
    let surface = SurfaceSize::new(32, 32);
    let Some(mut gpu) = init_backend(surface.width, surface.height) else {
        return;
    };
    let mut cpu = CpuBackend::with_output(surface);
    let mut config = small_config();
    config.seed = vec![Splat::new(
        Vec2::new(0.5, 0.75),
        Vec2::ZERO,
        Vec3::new(1.0, 0.0, 0.0),
        0.005,
    )];
    let mut gpu_sim = Simulation::new(&mut gpu, config.clone(), surface).unwrap();
    let mut cpu_sim = Simulation::new(&mut cpu, config, surface).unwrap();
    gpu_sim.step(&mut gpu, surface, &PointerRecord::default()).unwrap();
    cpu_sim.step(&mut cpu, surface, &PointerRecord::default()).unwrap();

    let pixels = gpu.read_output().expect("headless backend has an output").unwrap();
    let frame = cpu.frame().unwrap();
    assert_eq!(pixels.len(), frame.pixels.len());
    for (gpu_px, cpu_px) in pixels.iter().zip(&frame.pixels) {
        for c in 0..4 {
            let d = (gpu_px[c] as i32 - cpu_px[c] as i32).abs();
            assert!(d <= 2, "pixel {:?} vs {:?}", gpu_px, cpu_px);
        }
    }

    // The dye sits in the upper half of the image
    let upper = pixels[8 * 32 + 16][0];
    let lower = pixels[24 * 32 + 16][0];
    assert!(upper > lower);
}

#[test]
fn test_gpu_resize_reallocates_textures() {
    let Some(mut gpu) = init_backend(64, 32) else {
        return;
    };
    let mut sim = Simulation::new(&mut gpu, small_config(), SurfaceSize::new(64, 32)).unwrap();
    assert_eq!(sim.fields().grids().simulation, Grid::new(48, 24));

    gpu.resize_surface(32, 64);
    let report = sim
        .step(&mut gpu, SurfaceSize::new(32, 64), &PointerRecord::default())
        .unwrap();
    assert!(report.resized);
    let grids = sim.fields().grids();
    assert_eq!(grids.simulation, Grid::new(12, 24));
    assert_eq!(grids.display, Grid::new(24, 48));

    let dye: Field<Vec4> = gpu.read_field(sim.fields().dye.read()).unwrap();
    assert_eq!(dye.grid(), grids.display);
    assert_eq!(gpu.read_output().unwrap().unwrap().len(), 32 * 64);
}
