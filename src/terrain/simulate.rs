//! Interval-driven erosion loop, decoupled from windowing.
//!
//! The render loop feeds elapsed time into [`Simulation::advance`]; whenever
//! the configured interval elapses the simulation applies a batch of circle
//! passes and reports how many landed, at which point the caller pushes the
//! heights to its [`HeightSink`] once. The sink never sees a half-applied
//! batch.

use super::field::HeightField;
use super::random::RandomSource;
use super::{MapConfig, TerrainError};

/// Receiver for full height-array updates, typically a GPU vertex buffer.
pub trait HeightSink {
    fn write_heights(&mut self, heights: &[f32]);
}

/// What the simulation is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the next trigger interval (or paused/settled)
    Idle,
    /// A batch of circle passes was applied on the most recent advance
    Eroding,
}

/// Owns the height field and meters out erosion batches over time.
pub struct Simulation {
    field: HeightField,
    phase: Phase,
    since_step: f32,
    completed: u32,
    paused: bool,
}

impl Simulation {
    pub fn new(config: MapConfig) -> Result<Self, TerrainError> {
        Ok(Self {
            field: HeightField::new(config)?,
            phase: Phase::Idle,
            since_step: 0.0,
            completed: 0,
            paused: false,
        })
    }

    /// Feed `dt` seconds of elapsed time. Applies at most one batch and
    /// returns the number of passes applied; a non-zero return means the
    /// heights changed and should be synced.
    pub fn advance<R: RandomSource + ?Sized>(&mut self, dt: f32, rng: &mut R) -> u32 {
        if self.paused || self.is_settled() {
            self.phase = Phase::Idle;
            return 0;
        }

        self.since_step += dt;
        if self.since_step < self.field.config().step_interval {
            self.phase = Phase::Idle;
            return 0;
        }
        self.since_step = 0.0;

        let remaining = self.field.config().max_iterations - self.completed;
        let batch = self.field.config().iterations_per_step.min(remaining);
        for _ in 0..batch {
            self.field.apply_pass(rng);
        }
        self.completed += batch;
        self.phase = Phase::Eroding;
        batch
    }

    /// Push the current heights to the sink. Called between batches only.
    pub fn sync_to<S: HeightSink + ?Sized>(&self, sink: &mut S) {
        sink.write_heights(self.field.heights());
    }

    /// Flatten the terrain and start the erosion schedule over.
    pub fn restart(&mut self) {
        self.field.reset();
        self.phase = Phase::Idle;
        self.since_step = 0.0;
        self.completed = 0;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// True once the configured pass budget is exhausted.
    pub fn is_settled(&self) -> bool {
        self.completed >= self.field.config().max_iterations
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn completed_iterations(&self) -> u32 {
        self.completed
    }

    pub fn config(&self) -> &MapConfig {
        self.field.config()
    }

    pub fn heights(&self) -> &[f32] {
        self.field.heights()
    }
}
