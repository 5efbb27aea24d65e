use crate::config::Discretization;
use crate::grid::TimeLevels;
use crate::SolverError;
use float_ord::FloatOrd;
use rayon::prelude::*;

/// Measures how far a computed level is from the analytic solution.
#[derive(Debug, Clone, Copy)]
pub struct ErrorEvaluator {
    disc: Discretization,
}

impl ErrorEvaluator {
    /// Creates an evaluator for the given discretization.
    #[must_use]
    pub const fn new(disc: Discretization) -> Self {
        Self { disc }
    }

    /// Maximum `|u - f(x, y, z, step * tau)|` over every physical point `[0, N]^3`
    /// of level `step`. Ghost planes are not part of the domain and are skipped.
    ///
    /// Each worker reduces its own x-planes to a private maximum; the partial
    /// maxima are combined once all workers are done.
    ///
    /// # Errors
    ///
    /// Returns `SolverError::NumericalInstability` if the maximum is not finite.
    pub fn max_error(&self, levels: &TimeLevels, step: usize) -> Result<f64, SolverError> {
        let disc = self.disc;
        let idx = disc.indexer;
        let n = idx.resolution();
        let t = disc.time_at(step);
        let u = levels.level(step);

        let FloatOrd(err) = (0..=n)
            .into_par_iter()
            .fold(
                || FloatOrd(0.0),
                |acc, i| {
                    let x = i as f64 * disc.hx;
                    let mut local = acc;
                    for j in 0..=n {
                        let y = j as f64 * disc.hy;
                        for k in 0..=n {
                            let z = k as f64 * disc.hz;
                            // abs() clears the sign bit, so a NaN sorts above every number.
                            let diff = (u[idx.index(i, j, k)] - disc.solution.eval(x, y, z, t)).abs();
                            local = local.max(FloatOrd(diff));
                        }
                    }
                    local
                },
            )
            .reduce(|| FloatOrd(0.0), Ord::max);

        if err.is_finite() {
            Ok(err)
        } else {
            Err(SolverError::NumericalInstability {
                step,
                magnitude: err,
            })
        }
    }

    /// Largest `|u|` over the whole buffer of level `step`, NaN if any value is NaN.
    #[must_use]
    pub fn max_amplitude(&self, levels: &TimeLevels, step: usize) -> f64 {
        let FloatOrd(amplitude) = levels
            .level(step)
            .par_iter()
            .fold(|| FloatOrd(0.0), |acc, v| acc.max(FloatOrd(v.abs())))
            .reduce(|| FloatOrd(0.0), Ord::max);
        amplitude
    }
}
