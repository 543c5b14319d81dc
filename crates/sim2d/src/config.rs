//! Simulation configuration.
//!
//! Every field has a default from [`constants`](crate::constants), so a
//! config file only needs the values it overrides.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{ConfigError, FluidError};
use crate::forces::Splat;
use crate::serde_utils::{deserialize_rgb, serialize_rgb};

/// Color and radius of a family of splats.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplatStyle {
    #[serde(serialize_with = "serialize_rgb", deserialize_with = "deserialize_rgb")]
    pub color: Vec3,
    pub radius: f32,
}

/// Synthetic driver settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Run the opening animation at startup
    pub enabled: bool,
    pub style: SplatStyle,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            style: SplatStyle {
                color: Vec3::from(DRIVER_COLOR),
                radius: DRIVER_RADIUS,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FluidConfig {
    /// Rows of the Simulation Grid
    pub sim_resolution: u32,
    /// Rows of the Display Grid
    pub dye_resolution: u32,
    /// Jacobi iterations per frame
    pub pressure_iterations: u32,
    pub dt: f32,
    pub velocity_dissipation: f32,
    pub dye_dissipation: f32,
    /// Splat style for pointer drags
    pub pointer: SplatStyle,
    pub driver: DriverConfig,
    /// Splats injected after every (re)allocation of the fields
    pub seed: Vec<Splat>,
}

impl Default for FluidConfig {
    fn default() -> Self {
        Self {
            sim_resolution: SIM_RESOLUTION,
            dye_resolution: DYE_RESOLUTION,
            pressure_iterations: PRESSURE_ITERATIONS,
            dt: DT,
            velocity_dissipation: VELOCITY_DISSIPATION,
            dye_dissipation: DYE_DISSIPATION,
            pointer: SplatStyle {
                color: Vec3::from(POINTER_COLOR),
                radius: POINTER_RADIUS,
            },
            driver: DriverConfig::default(),
            seed: Vec::new(),
        }
    }
}

impl FluidConfig {
    /// Reject values the passes cannot run with.
    pub fn validate(&self) -> Result<(), FluidError> {
        if self.sim_resolution == 0 || self.dye_resolution == 0 {
            return Err(FluidError::InvalidConfig(format!(
                "resolutions must be non-zero (sim {}, dye {})",
                self.sim_resolution, self.dye_resolution
            )));
        }
        if self.pressure_iterations == 0 {
            return Err(FluidError::InvalidConfig(
                "pressure_iterations must be at least 1".to_string(),
            ));
        }
        if !(self.dt > 0.0 && self.dt.is_finite()) {
            return Err(FluidError::InvalidConfig(format!(
                "dt must be positive, got {}",
                self.dt
            )));
        }
        for (name, value) in [
            ("velocity_dissipation", self.velocity_dissipation),
            ("dye_dissipation", self.dye_dissipation),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(FluidError::InvalidConfig(format!(
                    "{name} must be in (0, 1], got {value}"
                )));
            }
        }
        let radii = [self.pointer.radius, self.driver.style.radius]
            .into_iter()
            .chain(self.seed.iter().map(|s| s.radius));
        for radius in radii {
            if !(radius > 0.0) {
                return Err(FluidError::InvalidConfig(format!(
                    "splat radius must be positive, got {radius}"
                )));
            }
        }
        Ok(())
    }

    /// Save configuration to a JSON file.
    pub fn save_json(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load and validate configuration from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}
