use crate::{grid::GridIndexer, solution::AnalyticSolution, stencil::Laplacian, SolverError};

/// Default simulation horizon `T`.
pub const DEFAULT_HORIZON: f64 = 2.0;
/// Default number of steps the horizon is divided into (`K`).
pub const DEFAULT_TOTAL_STEPS: usize = 1000;
/// Default wave coefficient `a_2`.
pub const DEFAULT_COEFFICIENT: f64 = 0.25;
/// Default number of steps actually executed.
pub const DEFAULT_STEPS: usize = 20;
/// Default bound on `|u|` before a run is declared unstable.
pub const DEFAULT_GROWTH_LIMIT: f64 = 1.0e6;

/// Immutable configuration for a single simulation run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationConfig {
    /// Edge length `L` of the cubic domain.
    pub domain_length: f64,
    /// Grid intervals per axis (`N`).
    pub resolution: usize,
    /// Simulation horizon `T`.
    pub horizon: f64,
    /// Number of steps `K` the horizon is divided into; `tau = T / K`.
    pub total_steps: usize,
    /// Wave coefficient `a_2` in `u_tt = a_2 * laplacian(u)`.
    pub coefficient: f64,
    /// Number of steps actually executed (the error is reported at this step).
    pub steps: usize,
    /// Worker thread count. `None` uses the available hardware parallelism.
    pub workers: Option<usize>,
    /// Largest `|u|` tolerated before the run aborts as unstable.
    pub growth_limit: f64,
    /// Record the maximum error after every step, not just the last one.
    pub record_error_history: bool,
}

impl SimulationConfig {
    /// Creates a new builder for `SimulationConfig`.
    pub fn builder(domain_length: f64, resolution: usize) -> SimulationConfigBuilder {
        SimulationConfigBuilder::new(domain_length, resolution)
    }

    /// Checks every invariant the kernels rely on.
    ///
    /// # Errors
    ///
    /// Returns `SolverError::InvalidConfig` describing the first violated invariant.
    pub fn validate(&self) -> Result<(), SolverError> {
        let invalid = |msg: String| Err(SolverError::InvalidConfig(msg));
        if !(self.domain_length.is_finite() && self.domain_length > 0.0) {
            return invalid(format!(
                "domain length must be a positive number, got {}",
                self.domain_length
            ));
        }
        if self.resolution == 0 {
            return invalid("grid resolution must be a positive integer, got 0".to_string());
        }
        if !(self.horizon.is_finite() && self.horizon > 0.0) {
            return invalid(format!(
                "simulation horizon must be positive, got {}",
                self.horizon
            ));
        }
        if self.total_steps == 0 {
            return invalid("total step count must be positive".to_string());
        }
        if self.steps > self.total_steps {
            return invalid(format!(
                "cannot execute {} steps: the horizon is divided into only {}",
                self.steps, self.total_steps
            ));
        }
        if !self.coefficient.is_finite() {
            return invalid(format!("wave coefficient must be finite, got {}", self.coefficient));
        }
        if self.workers == Some(0) {
            return invalid("worker count must be at least 1".to_string());
        }
        if !(self.growth_limit > 0.0) {
            return invalid(format!(
                "growth limit must be positive, got {}",
                self.growth_limit
            ));
        }
        Ok(())
    }

    /// Grid spacing `h = L / N` (identical on all axes).
    #[must_use]
    pub fn spacing(&self) -> f64 {
        self.domain_length / self.resolution as f64
    }

    /// Time increment `tau = T / K`.
    #[must_use]
    pub fn tau(&self) -> f64 {
        self.horizon / self.total_steps as f64
    }
}

/// Builder for `SimulationConfig`.
///
/// Starts from the reference constants and lets callers override them.
#[derive(Debug, Clone)]
pub struct SimulationConfigBuilder {
    config: SimulationConfig,
}

impl SimulationConfigBuilder {
    fn new(domain_length: f64, resolution: usize) -> Self {
        Self {
            config: SimulationConfig {
                domain_length,
                resolution,
                horizon: DEFAULT_HORIZON,
                total_steps: DEFAULT_TOTAL_STEPS,
                coefficient: DEFAULT_COEFFICIENT,
                steps: DEFAULT_STEPS,
                workers: None,
                growth_limit: DEFAULT_GROWTH_LIMIT,
                record_error_history: false,
            },
        }
    }

    /// Sets the simulation horizon `T`.
    pub fn horizon(mut self, horizon: f64) -> Self {
        self.config.horizon = horizon;
        self
    }

    /// Sets the number of steps `K` the horizon is divided into.
    pub fn total_steps(mut self, total_steps: usize) -> Self {
        self.config.total_steps = total_steps;
        self
    }

    /// Sets the wave coefficient `a_2`.
    pub fn coefficient(mut self, coefficient: f64) -> Self {
        self.config.coefficient = coefficient;
        self
    }

    /// Sets the number of executed steps.
    pub fn steps(mut self, steps: usize) -> Self {
        self.config.steps = steps;
        self
    }

    /// Sets the worker thread count.
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = Some(workers);
        self
    }

    /// Sets the growth limit used for instability detection.
    pub fn growth_limit(mut self, growth_limit: f64) -> Self {
        self.config.growth_limit = growth_limit;
        self
    }

    /// Enables or disables the per-step error history.
    pub fn record_error_history(mut self, record: bool) -> Self {
        self.config.record_error_history = record;
        self
    }

    /// Validates and returns the configuration.
    ///
    /// # Errors
    ///
    /// Returns `SolverError::InvalidConfig` if any value is out of range.
    pub fn build(self) -> Result<SimulationConfig, SolverError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Quantities derived once from a validated configuration and shared by every kernel.
#[derive(Debug, Clone, Copy)]
pub struct Discretization {
    /// Grid layout.
    pub indexer: GridIndexer,
    /// Reference solution on this domain.
    pub solution: AnalyticSolution,
    /// Laplacian with this grid's spacings.
    pub laplacian: Laplacian,
    /// Grid spacing along x.
    pub hx: f64,
    /// Grid spacing along y.
    pub hy: f64,
    /// Grid spacing along z.
    pub hz: f64,
    /// Time increment.
    pub tau: f64,
    /// Wave coefficient.
    pub coefficient: f64,
}

impl Discretization {
    /// Derives the discretization for `config`.
    ///
    /// # Errors
    ///
    /// Propagates validation and grid-size errors.
    pub fn new(config: &SimulationConfig) -> Result<Self, SolverError> {
        config.validate()?;
        let indexer = GridIndexer::new(config.resolution)?;
        let h = config.spacing();
        Ok(Self {
            indexer,
            solution: AnalyticSolution::cube(config.domain_length),
            laplacian: Laplacian::new(indexer, h, h, h),
            hx: h,
            hy: h,
            hz: h,
            tau: config.tau(),
            coefficient: config.coefficient,
        })
    }

    /// `tau^2 * a_2`, the weight of the Laplacian in the leapfrog update.
    #[must_use]
    pub fn update_weight(&self) -> f64 {
        self.tau * self.tau * self.coefficient
    }

    /// Courant number `a_2 tau^2 (1/hx^2 + 1/hy^2 + 1/hz^2)`.
    ///
    /// The leapfrog scheme with this stencil is stable only while this stays at or below 1.
    #[must_use]
    pub fn courant_number(&self) -> f64 {
        self.update_weight()
            * (1.0 / (self.hx * self.hx) + 1.0 / (self.hy * self.hy) + 1.0 / (self.hz * self.hz))
    }

    /// Physical time of `step`.
    #[must_use]
    pub fn time_at(&self, step: usize) -> f64 {
        step as f64 * self.tau
    }
}
