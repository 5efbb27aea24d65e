//! Core library for the 3-D leapfrog wave solver.
//! Defines the grid layout, the analytic reference mode, the finite-difference
//! kernels and the simulation runner that ties them together.

use thiserror::Error;

// Module declarations (keep public if they contain public items)
/// Error measurement against the analytic solution.
pub mod accuracy;
/// Dirichlet faces and the periodic y-coupling.
pub mod boundary;
/// Initial time levels 0 and 1.
pub mod bootstrap;
/// Immutable run configuration and derived discretization.
pub mod config;
/// Grid indexing and the rotating set of time-level buffers.
pub mod grid;
/// The simulation runner.
pub mod runner;
/// Closed-form reference solution.
pub mod solution;
/// Discrete Laplacian.
pub mod stencil;
/// Leapfrog interior update.
pub mod stepper;

// Re-export core public items

/// Maximum-error evaluator.
pub use crate::accuracy::ErrorEvaluator;
/// Start-up of levels 0 and 1.
pub use crate::bootstrap::bootstrap;
/// Boundary filler for a single time level.
pub use crate::boundary::BoundaryFiller;
/// Run configuration and its builder.
pub use crate::config::{Discretization, SimulationConfig, SimulationConfigBuilder};
/// Grid indexer and owned time levels.
pub use crate::grid::{GridIndexer, LevelSlots, StepBuffers, TimeLevels};
/// Runner entry points.
pub use crate::runner::{ProgressCallback, ProgressInfo, RunSummary, Simulation, StepError};
/// Analytic eigenmode.
pub use crate::solution::AnalyticSolution;
/// Discrete Laplacian operator.
pub use crate::stencil::Laplacian;
/// Interior time stepper.
pub use crate::stepper::{leapfrog_update, TimeStepper};

/// Errors that can occur while configuring or running a simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// A configuration value is missing, non-positive or inconsistent.
    #[error("Configuration error: {0}")]
    InvalidConfig(String),
    /// The three time-level buffers could not be allocated.
    #[error("Failed to allocate {bytes} bytes for the time-level buffers")]
    Allocation {
        /// Total number of bytes requested (saturated on overflow).
        bytes: usize,
    },
    /// The field became non-finite or grew beyond the configured limit.
    #[error("Numerical instability at step {step}: magnitude {magnitude} (check the Courant number)")]
    NumericalInstability {
        /// Step at which the instability was detected.
        step: usize,
        /// Offending magnitude (may be NaN or infinite).
        magnitude: f64,
    },
    /// The worker pool could not be created.
    #[error("Worker pool error: {0}")]
    WorkerPool(String),
    /// A progress callback requested the run to stop.
    #[error("Progress callback failed: {0}")]
    Callback(String),
}
