//! Error types for field allocation, pass setup and configuration.

use crate::grid::Grid;

/// Fatal errors raised while establishing or stepping the simulation.
///
/// None of these are retried: every pass is deterministic given its inputs,
/// so a failure is an environment or programming error.
#[derive(Debug, thiserror::Error)]
pub enum FluidError {
    /// A field target could not be created.
    #[error("failed to allocate {label} ({grid}): {reason}")]
    Allocation {
        label: String,
        grid: Grid,
        reason: String,
    },

    /// A pass program failed to compile or link.
    #[error("failed to build {program} program: {reason}")]
    ProgramBuild { program: String, reason: String },

    /// The device lacks a capability the fields require (renderable float textures).
    #[error("missing required capability: {0}")]
    MissingCapability(String),

    /// A field was about to be read at dimensions that do not match its grid.
    #[error("{field} is {actual} but its grid is {expected}")]
    GridMismatch {
        field: &'static str,
        expected: Grid,
        actual: Grid,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Presenting the composited frame failed for a reason other than a stale surface.
    #[error("presentation failed: {0}")]
    Present(String),
}

/// Errors loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] FluidError),
}
