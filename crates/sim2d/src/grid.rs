//! Texel grids for the simulation and display fields.
//!
//! Two grids are derived from the output surface: a coarse Simulation Grid
//! (velocity, divergence, pressure) and a fine Display Grid (dye). Both keep
//! the surface aspect ratio with a fixed number of rows.

use glam::Vec2;

/// Pixel dimensions of the presentation surface.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A minimized window reports a zero dimension; nothing can be derived from it.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Immutable texel dimensions of a field.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Grid {
    /// Number of texels in X
    pub width: u32,
    /// Number of texels in Y
    pub height: u32,
}

impl Grid {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Grid with `resolution` rows and `floor(resolution * aspect)` columns.
    pub fn from_resolution(resolution: u32, aspect_ratio: f32) -> Self {
        let width = (resolution as f32 * aspect_ratio).floor() as u32;
        Self {
            width: width.max(1),
            height: resolution.max(1),
        }
    }

    /// Reciprocal of the grid dimensions, the normalized size of one texel.
    pub fn texel_size(&self) -> Vec2 {
        Vec2::new(1.0 / self.width as f32, 1.0 / self.height as f32)
    }

    pub fn texel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    #[inline]
    pub fn index(&self, i: u32, j: u32) -> usize {
        j as usize * self.width as usize + i as usize
    }

    /// Normalized center of texel (i, j); `j` grows upward.
    #[inline]
    pub fn texel_center(&self, i: u32, j: u32) -> Vec2 {
        Vec2::new(
            (i as f32 + 0.5) / self.width as f32,
            (j as f32 + 0.5) / self.height as f32,
        )
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// The pair of grids every Field Set is allocated against.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Grids {
    pub simulation: Grid,
    pub display: Grid,
}

impl Grids {
    pub fn for_surface(size: SurfaceSize, sim_resolution: u32, dye_resolution: u32) -> Self {
        let aspect = size.aspect_ratio();
        Self {
            simulation: Grid::from_resolution(sim_resolution, aspect),
            display: Grid::from_resolution(dye_resolution, aspect),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_from_wide_surface() {
        let grids = Grids::for_surface(SurfaceSize::new(1920, 1080), 128, 512);
        assert_eq!(grids.simulation, Grid::new(227, 128));
        assert_eq!(grids.display, Grid::new(910, 512));
    }

    #[test]
    fn test_grid_never_zero() {
        let grid = Grid::from_resolution(4, 0.01);
        assert_eq!(grid.width, 1);
        assert_eq!(grid.height, 4);
    }

    #[test]
    fn test_texel_center() {
        let grid = Grid::new(4, 2);
        assert_eq!(grid.texel_center(0, 0), Vec2::new(0.125, 0.25));
        assert_eq!(grid.texel_center(3, 1), Vec2::new(0.875, 0.75));
        assert_eq!(grid.index(3, 1), 7);
    }
}
