use std::path::Path;

use serde::{Deserialize, Serialize};
use sim2d::{ConfigError, FluidConfig};

/// Window settings for the interactive app
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    /// Logical size at startup
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Stable Fluids".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// App configuration file: a `window` table plus the fluid settings at the top level.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    #[serde(flatten)]
    pub fluid: FluidConfig,
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.fluid.validate()?;
        Ok(config)
    }

    pub fn load_json(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
