//! Force injection: splats from pointer drags and the synthetic driver.

use glam::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::backend::{FluidBackend, SplatParams};
use crate::config::SplatStyle;
use crate::constants::{
    DRIVER_DURATION, DRIVER_FORCE, DRIVER_ORIGIN, DRIVER_START_TIME, DRIVER_TIME_STEP,
};
use crate::fields::FieldSet;
use crate::grid::SurfaceSize;
use crate::serde_utils::{deserialize_rgb, deserialize_vec2, serialize_rgb, serialize_vec2};

/// A localized impulse of velocity and color.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Splat {
    /// Normalized center, y-up
    #[serde(serialize_with = "serialize_vec2", deserialize_with = "deserialize_vec2")]
    pub point: Vec2,
    /// Velocity added at the center
    #[serde(serialize_with = "serialize_vec2", deserialize_with = "deserialize_vec2")]
    pub velocity: Vec2,
    /// Dye added at the center
    #[serde(serialize_with = "serialize_rgb", deserialize_with = "deserialize_rgb")]
    pub color: Vec3,
    pub radius: f32,
}

impl Splat {
    pub fn new(point: Vec2, velocity: Vec2, color: Vec3, radius: f32) -> Self {
        Self {
            point,
            velocity,
            color,
            radius,
        }
    }

    /// Splat at a surface pixel position (y-down) with an impulse in pixels.
    pub fn at_pixel(position: Vec2, impulse: Vec2, surface: SurfaceSize, style: &SplatStyle) -> Self {
        let point = Vec2::new(
            position.x / surface.width as f32,
            1.0 - position.y / surface.height as f32,
        );
        Self::new(point, impulse, style.color, style.radius)
    }
}

/// Per-frame pointer state delivered by the input layer. Read-only here.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerRecord {
    /// Surface pixels, y-down
    pub x: f32,
    pub y: f32,
    /// Scaled displacement since the last consumed frame
    pub dx: f32,
    pub dy: f32,
    pub is_down: bool,
}

impl PointerRecord {
    /// A drag produces a splat only while pressed and moving.
    pub fn splat(&self, surface: SurfaceSize, style: &SplatStyle) -> Option<Splat> {
        if !self.is_down || (self.dx == 0.0 && self.dy == 0.0) {
            return None;
        }
        Some(Splat::at_pixel(
            Vec2::new(self.x, self.y),
            Vec2::new(self.dx, self.dy),
            surface,
            style,
        ))
    }
}

/// Opening animation that drags a virtual pointer along a closed curve.
#[derive(Clone, Debug)]
pub struct AutoDriver {
    time: f32,
    position: Option<Vec2>,
    finished: bool,
}

impl Default for AutoDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl AutoDriver {
    pub fn new() -> Self {
        Self {
            time: DRIVER_START_TIME,
            position: None,
            finished: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advance one frame and return the splat for it, or `None` once finished.
    ///
    /// The frame that reaches the end of the path still splats.
    pub fn next_splat(&mut self, surface: SurfaceSize, style: &SplatStyle) -> Option<Splat> {
        if self.finished {
            return None;
        }
        let size = Vec2::new(surface.width as f32, surface.height as f32);
        let previous = self
            .position
            .unwrap_or_else(|| Vec2::from(DRIVER_ORIGIN) * size);

        self.time += DRIVER_TIME_STEP;
        let t = self.time * std::f32::consts::PI * 0.3;
        if t >= DRIVER_DURATION {
            self.finished = true;
            log::debug!("Synthetic driver finished");
        }

        let target = Vec2::new(0.5 + 0.25 * t.cos(), 0.55 + 0.3 * t.sin() * t.cos()) * size;
        // Pixel delta, y not flipped.
        let impulse = (target - previous) * DRIVER_FORCE;
        self.position = Some(target);

        Some(Splat::at_pixel(target, impulse, surface, style))
    }
}

/// Splat velocity and dye, swapping each buffer after its pass.
pub fn inject<B: FluidBackend>(
    backend: &mut B,
    fields: &mut FieldSet<B>,
    splat: &Splat,
    aspect_ratio: f32,
) {
    let mut params = SplatParams {
        point: splat.point,
        radius: splat.radius,
        aspect_ratio,
        value: Vec4::new(splat.velocity.x, splat.velocity.y, 0.0, 0.0),
    };
    {
        let (src, dst) = fields.velocity.split();
        backend.splat_vector(src, dst, &params);
    }
    fields.velocity.swap();

    params.value = splat.color.extend(0.0);
    {
        let (src, dst) = fields.dye.split();
        backend.splat_color(src, dst, &params);
    }
    fields.dye.swap();
}
