//! Start-up of the three-level recurrence.
//!
//! The leapfrog update needs two earlier levels, so levels 0 and 1 are built
//! directly: level 0 samples the analytic solution at `t = 0`, and level 1 is
//! a second-order Taylor step. The analytic mode has `u_t(0) = 0`, leaving
//! only the `tau^2 / 2 * u_tt = tau^2 / 2 * a_2 * laplacian(u)` term.

use crate::boundary::BoundaryFiller;
use crate::config::Discretization;
use crate::grid::{StepBuffers, TimeLevels};
use rayon::prelude::*;

/// Fills levels 0 and 1, boundaries first.
///
/// The bootstrap boundary values come from the analytic solution alone, so
/// they can be written before either interior.
pub fn bootstrap(disc: &Discretization, levels: &mut TimeLevels) {
    let filler = BoundaryFiller::new(*disc);
    filler.fill(levels, 0);
    filler.fill(levels, 1);

    seed_initial_level(disc, levels.level_mut(0));
    taylor_step(disc, levels.split(1));
    log::debug!("Bootstrapped levels 0 and 1 (tau = {})", disc.tau);
}

fn seed_initial_level(disc: &Discretization, level0: &mut [f64]) {
    let idx = disc.indexer;
    let n = idx.resolution();
    level0
        .par_chunks_mut(idx.slab_len())
        .enumerate()
        .skip(1)
        .take(n.saturating_sub(1))
        .for_each(|(i, plane)| {
            let x = i as f64 * disc.hx;
            for j in 1..n {
                let y = j as f64 * disc.hy;
                for k in 1..n {
                    let z = k as f64 * disc.hz;
                    plane[idx.slab_index(j, k)] = disc.solution.eval(x, y, z, 0.0);
                }
            }
        });
}

fn taylor_step(disc: &Discretization, buffers: StepBuffers<'_>) {
    let idx = disc.indexer;
    let n = idx.resolution();
    let half_weight = 0.5 * disc.update_weight();
    let StepBuffers {
        current: level1,
        previous: level0,
        ..
    } = buffers;
    level1
        .par_chunks_mut(idx.slab_len())
        .enumerate()
        .skip(1)
        .take(n.saturating_sub(1))
        .for_each(|(i, plane)| {
            for j in 1..n {
                for k in 1..n {
                    plane[idx.slab_index(j, k)] = level0[idx.index(i, j, k)]
                        + half_weight * disc.laplacian.apply(level0, i, j, k);
                }
            }
        });
}
