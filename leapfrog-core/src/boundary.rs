use crate::config::Discretization;
use crate::grid::{StepBuffers, TimeLevels};
use crate::stepper::leapfrog_update;
use rayon::prelude::*;

/// Completes a time level by imposing the boundary conditions:
///
/// * x- and z-normal faces are held at zero (Dirichlet);
/// * the y = 0 and y = N faces are periodic images of each other. During the
///   bootstrap steps (0 and 1) they are taken from the analytic solution;
///   afterwards the y = N face is advanced with the leapfrog update using a
///   wrapped ghost plane, and copied onto y = 0.
///
/// Every pass partitions work by x-plane, so writes from different workers
/// never touch the same point.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryFiller {
    disc: Discretization,
}

impl BoundaryFiller {
    /// Creates a filler for the given discretization.
    #[must_use]
    pub const fn new(disc: Discretization) -> Self {
        Self { disc }
    }

    /// Fills the boundary of level `step`.
    ///
    /// For `step > 1` this must run after the interior update of `step`; it
    /// also writes the y = N + 1 ghost plane of level `step - 1`.
    pub fn fill(&self, levels: &mut TimeLevels, step: usize) {
        if step <= 1 {
            let current = levels.level_mut(step);
            self.zero_faces(current);
            self.fill_from_solution(current, step);
        } else {
            self.zero_faces(levels.level_mut(step));
            self.wrap_ghost_plane(levels.level_mut(step - 1));
            self.couple_periodic_faces(levels.split(step));
        }
    }

    /// Zeroes x in {0, N} and z in {0, N} over `[0, N] x [0, N]`.
    fn zero_faces(&self, current: &mut [f64]) {
        let idx = self.disc.indexer;
        let n = idx.resolution();
        current
            .par_chunks_mut(idx.slab_len())
            .enumerate()
            .take(n + 1)
            .for_each(|(i, plane)| {
                for p in 0..=n {
                    if i == 0 || i == n {
                        for q in 0..=n {
                            plane[idx.slab_index(p, q)] = 0.0;
                        }
                    } else {
                        plane[idx.slab_index(p, 0)] = 0.0;
                        plane[idx.slab_index(p, n)] = 0.0;
                    }
                }
            });
    }

    /// Bootstrap steps: y faces straight from the analytic solution.
    fn fill_from_solution(&self, current: &mut [f64], step: usize) {
        let disc = self.disc;
        let idx = disc.indexer;
        let n = idx.resolution();
        let t = disc.time_at(step);
        let far_y = disc.solution.ly();
        current
            .par_chunks_mut(idx.slab_len())
            .enumerate()
            .skip(1)
            .take(n.saturating_sub(1))
            .for_each(|(i, plane)| {
                let x = i as f64 * disc.hx;
                for q in 1..n {
                    let z = q as f64 * disc.hz;
                    plane[idx.slab_index(0, q)] = disc.solution.eval(x, 0.0, z, t);
                    plane[idx.slab_index(n, q)] = disc.solution.eval(x, far_y, z, t);
                }
            });
    }

    /// Copies y = 1 of the previous level into its y = N + 1 ghost plane.
    fn wrap_ghost_plane(&self, previous: &mut [f64]) {
        let idx = self.disc.indexer;
        let n = idx.resolution();
        previous
            .par_chunks_mut(idx.slab_len())
            .skip(1)
            .take(n.saturating_sub(1))
            .for_each(|plane| {
                for q in 1..n {
                    plane[idx.slab_index(n + 1, q)] = plane[idx.slab_index(1, q)];
                }
            });
    }

    /// Advances y = N with the leapfrog update and mirrors it onto y = 0.
    fn couple_periodic_faces(&self, buffers: StepBuffers<'_>) {
        let disc = self.disc;
        let idx = disc.indexer;
        let n = idx.resolution();
        let weight = disc.update_weight();
        let StepBuffers {
            current,
            previous,
            before_previous,
        } = buffers;
        current
            .par_chunks_mut(idx.slab_len())
            .enumerate()
            .skip(1)
            .take(n.saturating_sub(1))
            .for_each(|(i, plane)| {
                for q in 1..n {
                    let g = idx.index(i, n, q);
                    let value = leapfrog_update(
                        previous[g],
                        before_previous[g],
                        weight,
                        disc.laplacian.apply(previous, i, n, q),
                    );
                    plane[idx.slab_index(n, q)] = value;
                    plane[idx.slab_index(0, q)] = value;
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::grid::GridIndexer;

    fn setup(n: usize) -> (Discretization, TimeLevels) {
        let config = SimulationConfig::builder(1.0, n).build().unwrap();
        let disc = Discretization::new(&config).unwrap();
        let levels = TimeLevels::allocate(GridIndexer::new(n).unwrap()).unwrap();
        (disc, levels)
    }

    #[test]
    fn test_faces_are_zeroed() {
        let (disc, mut levels) = setup(4);
        levels.level_mut(0).fill(7.0);
        BoundaryFiller::new(disc).fill(&mut levels, 0);
        let idx = disc.indexer;
        let u = levels.level(0);
        for p in 0..=4 {
            for q in 0..=4 {
                assert_eq!(u[idx.index(0, p, q)], 0.0);
                assert_eq!(u[idx.index(4, p, q)], 0.0);
                assert_eq!(u[idx.index(p, q, 0)], 0.0);
                assert_eq!(u[idx.index(p, q, 4)], 0.0);
            }
        }
        // Interior and ghost planes are untouched.
        assert_eq!(u[idx.index(2, 2, 2)], 7.0);
        assert_eq!(u[idx.index(5, 2, 2)], 7.0);
    }

    #[test]
    fn test_bootstrap_faces_follow_solution() {
        let (disc, mut levels) = setup(6);
        BoundaryFiller::new(disc).fill(&mut levels, 1);
        let idx = disc.indexer;
        let u = levels.level(1);
        let t = disc.time_at(1);
        for i in 1..6 {
            for q in 1..6 {
                let (x, z) = (i as f64 * disc.hx, q as f64 * disc.hz);
                assert_eq!(u[idx.index(i, 0, q)], disc.solution.eval(x, 0.0, z, t));
                assert_eq!(u[idx.index(i, 6, q)], disc.solution.eval(x, 1.0, z, t));
            }
        }
    }

    #[test]
    fn test_periodic_faces_match_and_ghost_wraps() {
        let (disc, mut levels) = setup(5);
        // Arbitrary but deterministic history.
        for step in 0..2 {
            for (n, v) in levels.level_mut(step).iter_mut().enumerate() {
                *v = ((n * 31 + step * 7) % 17) as f64 * 0.01;
            }
        }
        BoundaryFiller::new(disc).fill(&mut levels, 2);
        let idx = disc.indexer;
        for i in 1..5 {
            for q in 1..5 {
                let prev = levels.level(1);
                assert_eq!(prev[idx.index(i, 6, q)], prev[idx.index(i, 1, q)]);
                let cur = levels.level(2);
                assert_eq!(cur[idx.index(i, 0, q)], cur[idx.index(i, 5, q)]);
            }
        }
    }

    #[test]
    fn test_periodic_face_follows_leapfrog_update() {
        let (disc, mut levels) = setup(5);
        for step in 0..2 {
            for (n, v) in levels.level_mut(step).iter_mut().enumerate() {
                *v = ((n * 31 + step * 7) % 17) as f64 * 0.01;
            }
        }
        BoundaryFiller::new(disc).fill(&mut levels, 2);

        let idx = disc.indexer;
        let weight = disc.update_weight();
        let prev = levels.level(1);
        let prev2 = levels.level(0);
        let cur = levels.level(2);
        let mut nonzero = 0;
        for i in 1..5 {
            for q in 1..5 {
                let g = idx.index(i, 5, q);
                let expected = leapfrog_update(
                    prev[g],
                    prev2[g],
                    weight,
                    disc.laplacian.apply(prev, i, 5, q),
                );
                assert_eq!(cur[g], expected, "y = N face at ({i}, {q})");
                assert_eq!(cur[idx.index(i, 0, q)], expected);
                if expected != 0.0 {
                    nonzero += 1;
                }
            }
        }
        assert!(nonzero > 0);
    }

    #[test]
    fn test_fill_is_idempotent() {
        let (disc, mut levels) = setup(5);
        for step in 0..3 {
            for (n, v) in levels.level_mut(step).iter_mut().enumerate() {
                *v = ((n * 13 + step) % 11) as f64 * 0.1;
            }
        }
        let filler = BoundaryFiller::new(disc);
        for step in [1, 2] {
            filler.fill(&mut levels, step);
            let once = levels.clone();
            filler.fill(&mut levels, step);
            assert_eq!(once, levels);
        }
    }
}
