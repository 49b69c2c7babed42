//! Progress reporting for long-running searches and traces.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Progress callback for long-running operations.
pub type ProgressCallback = Box<dyn Fn(ProgressInfo) + Send + Sync>;

/// Progress information emitted during a search or a trace.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProgressInfo {
    /// Current iteration (candidates tested, or walker iterations).
    pub iteration: u32,
    /// Total expected iterations (0 if unknown).
    pub total_iterations: u32,
    /// Best item count found so far.
    pub items_placed: usize,
    /// Current phase/stage description.
    pub phase: String,
    /// Human-readable status line.
    pub message: String,
    /// Whether the operation is still running.
    pub running: bool,
}

impl ProgressInfo {
    /// Creates a new progress info with default values.
    pub fn new() -> Self {
        Self {
            running: true,
            ..Default::default()
        }
    }

    /// Sets the iteration info.
    pub fn with_iteration(mut self, current: u32, total: u32) -> Self {
        self.iteration = current;
        self.total_iterations = total;
        self
    }

    /// Sets the best item count.
    pub fn with_items(mut self, placed: usize) -> Self {
        self.items_placed = placed;
        self
    }

    /// Sets the phase description.
    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = phase.into();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Marks the operation as finished.
    pub fn finished(mut self) -> Self {
        self.running = false;
        self
    }

    /// Progress in percent (0 to 100). Unknown totals report 0.
    pub fn percent(&self) -> f64 {
        if self.total_iterations > 0 {
            (f64::from(self.iteration) / f64::from(self.total_iterations) * 100.0).min(100.0)
        } else {
            0.0
        }
    }
}
