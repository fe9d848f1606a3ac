//! Procedural heightmap core: grid topology, erosion field, update loop.
//!
//! This module provides:
//! - [`GridTopology`] - Static wireframe grid positions and line indices
//! - [`HeightField`] - Mutable height channel with stochastic circle passes
//! - [`Simulation`] - Interval-driven update state machine with sink syncing
//! - [`MapConfig`] - Tunable generation parameters

pub mod field;
pub mod random;
pub mod simulate;
pub mod topology;

pub use field::HeightField;
pub use random::{RandomSource, SeededRandom};
pub use simulate::{HeightSink, Phase, Simulation};
pub use topology::GridTopology;

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum TerrainError {
    #[error("grid needs at least 2 vertices per side, got {0}")]
    InvalidDimension(usize),
    #[error("iteration count must be at least 1")]
    InvalidIterations,
    #[error("map size must be positive, got {0}")]
    InvalidMapSize(f32),
    #[error("max circle radius must be positive, got {0}")]
    InvalidCircleRadius(f32),
    #[error("max displacement must be positive, got {0}")]
    InvalidDisplacement(f32),
    #[error("update interval must be positive, got {0}")]
    InvalidInterval(f32),
}

/// Parameters for grid construction and the erosion process.
///
/// Defaults match the classic heightmap demo: an 80x80 vertex grid spanning
/// 10 world units, perturbed by one circle pass every 0.2 seconds until 999
/// passes have accumulated.
#[derive(Debug, Clone, Copy)]
pub struct MapConfig {
    /// Vertices per grid side (the grid is square)
    pub side_count: usize,
    /// Physical extent of the grid in world units
    pub map_size: f32,
    /// Upper bound for the sampled perturbation circle diameter
    pub max_circle_radius: f32,
    /// Upper bound for the sampled displacement magnitude
    pub max_displacement: f32,
    /// Sign draws below this value dig a crater instead of raising a dome
    pub sign_flip_threshold: f32,
    /// Total circle passes before the terrain is considered settled
    pub max_iterations: u32,
    /// Passes applied per triggered update
    pub iterations_per_step: u32,
    /// Seconds between triggered updates
    pub step_interval: f32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            side_count: 80,
            map_size: 10.0,
            max_circle_radius: 5.0,
            max_displacement: 1.0,
            sign_flip_threshold: 0.3,
            max_iterations: 999,
            iterations_per_step: 1,
            step_interval: 0.2,
        }
    }
}

impl MapConfig {
    /// Spacing between adjacent vertices along one axis.
    pub fn vertex_step(&self) -> f32 {
        self.map_size / (self.side_count - 1) as f32
    }

    /// Total vertex count for the configured grid.
    pub fn vertex_count(&self) -> usize {
        self.side_count * self.side_count
    }

    pub fn validate(&self) -> Result<(), TerrainError> {
        if self.side_count < 2 {
            return Err(TerrainError::InvalidDimension(self.side_count));
        }
        if self.map_size <= 0.0 {
            return Err(TerrainError::InvalidMapSize(self.map_size));
        }
        // The circle sampler draws over these ranges; an empty range aborts.
        if self.max_circle_radius <= 0.0 {
            return Err(TerrainError::InvalidCircleRadius(self.max_circle_radius));
        }
        if self.max_displacement <= 0.0 {
            return Err(TerrainError::InvalidDisplacement(self.max_displacement));
        }
        if self.iterations_per_step == 0 {
            return Err(TerrainError::InvalidIterations);
        }
        if self.step_interval <= 0.0 {
            return Err(TerrainError::InvalidInterval(self.step_interval));
        }
        Ok(())
    }
}
