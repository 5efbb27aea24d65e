use crate::{
    accuracy::ErrorEvaluator, bootstrap::bootstrap, config::Discretization, grid::TimeLevels,
    stepper::TimeStepper, SimulationConfig, SolverError,
};
use log::{debug, info, trace, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};
#[cfg(feature = "serde")] // Guard serde imports
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Alias for the progress callback function type.
///
/// Returning an error aborts the run.
pub type ProgressCallback = Box<dyn Fn(ProgressInfo) -> Result<(), SolverError> + Send + Sync>;

/// Snapshot handed to the progress callback after each completed level.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProgressInfo {
    /// Level that was just completed.
    pub step: usize,
    /// Number of steps the run will execute.
    pub total_steps: usize,
    /// Physical time of `step`.
    pub time: f64,
    /// Wall-clock time since the run started.
    pub elapsed: Duration,
    /// Largest `|u|` on the completed level.
    pub max_amplitude: f64,
}

/// Maximum error recorded for one level.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepError {
    /// Level index.
    pub step: usize,
    /// Physical time of the level.
    pub time: f64,
    /// Maximum absolute deviation from the analytic solution.
    pub max_error: f64,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunSummary {
    /// Level at which the error was measured (the last executed step).
    pub step: usize,
    /// Maximum absolute error at `step`.
    pub max_error: f64,
    /// Wall-clock duration of the run, allocation excluded.
    pub elapsed: Duration,
    /// Per-level errors, empty unless the history was requested.
    pub error_history: Vec<StepError>,
}

/// Owns everything a run needs: configuration, derived discretization,
/// the three time levels and the worker pool.
pub struct Simulation {
    config: SimulationConfig,
    disc: Discretization,
    levels: TimeLevels,
    pool: ThreadPool,
    progress_callback: Option<ProgressCallback>,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("config", &self.config)
            .field("workers", &self.pool.current_num_threads())
            .field("progress_callback", &self.progress_callback.is_some())
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Validates `config`, builds the worker pool and allocates the time levels.
    ///
    /// # Errors
    ///
    /// * `SolverError::InvalidConfig` for out-of-range settings.
    /// * `SolverError::WorkerPool` if the threads cannot be spawned.
    /// * `SolverError::Allocation` if the buffers do not fit in memory.
    pub fn new(config: SimulationConfig) -> Result<Self, SolverError> {
        let disc = Discretization::new(&config)?;

        let courant = disc.courant_number();
        if courant > 1.0 {
            warn!(
                "Courant number {courant:.4} exceeds 1: the leapfrog scheme is unstable for this tau and h"
            );
        } else {
            debug!("Courant number {courant:.3e}");
        }

        let mut builder = ThreadPoolBuilder::new();
        if let Some(workers) = config.workers {
            builder = builder.num_threads(workers);
        }
        let pool = builder
            .build()
            .map_err(|e| SolverError::WorkerPool(e.to_string()))?;

        let levels = TimeLevels::allocate(disc.indexer)?;

        Ok(Self {
            config,
            disc,
            levels,
            pool,
            progress_callback: None,
        })
    }

    /// Sets the progress callback invoked after every completed level.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// The configuration this simulation was built from.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Derived grid and time quantities.
    #[must_use]
    pub const fn discretization(&self) -> &Discretization {
        &self.disc
    }

    /// The three time levels as left by the last run.
    #[must_use]
    pub const fn levels(&self) -> &TimeLevels {
        &self.levels
    }

    /// Size of the worker pool.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Runs bootstrap, steps `2..=steps` and the final error evaluation.
    ///
    /// Every completed level is checked for non-finite values and for growth
    /// beyond the configured limit. Running again starts from scratch and
    /// reproduces the same result.
    ///
    /// # Errors
    ///
    /// * `SolverError::NumericalInstability` if the field blows up.
    /// * `SolverError::Callback` (or whatever the callback returns) if progress reporting fails.
    pub fn run(&mut self) -> Result<RunSummary, SolverError> {
        let Self {
            config,
            disc,
            levels,
            pool,
            progress_callback,
        } = self;
        let steps = config.steps;

        info!(
            "Starting leapfrog run: L = {}, N = {}, tau = {}, steps = {}, workers = {}",
            config.domain_length,
            config.resolution,
            disc.tau,
            steps,
            pool.current_num_threads()
        );
        let start_time = Instant::now();

        pool.install(|| -> Result<RunSummary, SolverError> {
            let stepper = TimeStepper::new(*disc);
            let evaluator = ErrorEvaluator::new(*disc);
            let mut error_history = Vec::new();

            bootstrap(disc, levels);

            for step in 0..=steps {
                if step >= 2 {
                    stepper.advance(levels, step);
                }

                let max_amplitude = evaluator.max_amplitude(levels, step);
                if !max_amplitude.is_finite() || max_amplitude > config.growth_limit {
                    warn!("Level {step} blew up (max |u| = {max_amplitude})");
                    return Err(SolverError::NumericalInstability {
                        step,
                        magnitude: max_amplitude,
                    });
                }

                if config.record_error_history {
                    let max_error = evaluator.max_error(levels, step)?;
                    trace!("step {step}: max error {max_error:e}");
                    error_history.push(StepError {
                        step,
                        time: disc.time_at(step),
                        max_error,
                    });
                }

                if let Some(callback) = progress_callback.as_ref() {
                    callback(ProgressInfo {
                        step,
                        total_steps: steps,
                        time: disc.time_at(step),
                        elapsed: start_time.elapsed(),
                        max_amplitude,
                    })?;
                }
            }

            let max_error = match error_history.last() {
                Some(last) => last.max_error,
                None => evaluator.max_error(levels, steps)?,
            };
            let elapsed = start_time.elapsed();
            info!(
                "Run finished: max error {max_error:e} at step {steps} in {:.3?}",
                elapsed
            );

            Ok(RunSummary {
                step: steps,
                max_error,
                elapsed,
                error_history,
            })
        })
    }
}
