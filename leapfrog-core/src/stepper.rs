use crate::boundary::BoundaryFiller;
use crate::config::Discretization;
use crate::grid::{StepBuffers, TimeLevels};
use rayon::prelude::*;

/// One leapfrog step for a single point:
/// `2 u_prev - u_prev2 + tau^2 a_2 laplacian(u_prev)`.
#[inline]
#[must_use]
pub fn leapfrog_update(previous: f64, before_previous: f64, weight: f64, laplacian: f64) -> f64 {
    2.0 * previous - before_previous + weight * laplacian
}

/// Advances the solution from levels `step - 1` and `step - 2` to level `step`.
#[derive(Debug, Clone, Copy)]
pub struct TimeStepper {
    disc: Discretization,
    boundary: BoundaryFiller,
}

impl TimeStepper {
    /// Creates a stepper for the given discretization.
    #[must_use]
    pub const fn new(disc: Discretization) -> Self {
        Self {
            disc,
            boundary: BoundaryFiller::new(disc),
        }
    }

    /// Computes level `step` (`step >= 2`): interior sweep, then the boundary fill.
    pub fn advance(&self, levels: &mut TimeLevels, step: usize) {
        debug_assert!(step >= 2, "steps 0 and 1 come from the bootstrap");
        self.update_interior(levels.split(step));
        self.boundary.fill(levels, step);
    }

    fn update_interior(&self, buffers: StepBuffers<'_>) {
        let disc = self.disc;
        let idx = disc.indexer;
        let n = idx.resolution();
        let weight = disc.update_weight();
        let StepBuffers {
            current,
            previous,
            before_previous,
        } = buffers;

        // Each worker owns whole x-planes of the new level.
        current
            .par_chunks_mut(idx.slab_len())
            .enumerate()
            .skip(1)
            .take(n.saturating_sub(1))
            .for_each(|(i, plane)| {
                for j in 1..n {
                    for k in 1..n {
                        let g = idx.index(i, j, k);
                        plane[idx.slab_index(j, k)] = leapfrog_update(
                            previous[g],
                            before_previous[g],
                            weight,
                            disc.laplacian.apply(previous, i, j, k),
                        );
                    }
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::bootstrap;
    use crate::config::SimulationConfig;

    #[test]
    fn test_leapfrog_update() {
        assert!((leapfrog_update(1.0, 0.5, 0.1, 2.0) - 1.7).abs() < 1e-15);
    }

    #[test]
    fn test_advance_only_writes_current_level() {
        let config = SimulationConfig::builder(1.0, 6).build().unwrap();
        let disc = Discretization::new(&config).unwrap();
        let mut levels = TimeLevels::allocate(disc.indexer).unwrap();
        bootstrap(&disc, &mut levels);
        let level0 = levels.level(0).to_vec();
        TimeStepper::new(disc).advance(&mut levels, 2);
        assert_eq!(levels.level(0), level0.as_slice());
        assert!(levels.level(2).iter().any(|v| *v != 0.0));
    }
}
