use crate::grid::GridIndexer;

/// Seven-point central-difference Laplacian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Laplacian {
    indexer: GridIndexer,
    inv_hx2: f64,
    inv_hy2: f64,
    inv_hz2: f64,
}

impl Laplacian {
    /// Creates the operator for the given per-axis spacings.
    #[must_use]
    pub fn new(indexer: GridIndexer, hx: f64, hy: f64, hz: f64) -> Self {
        Self {
            indexer,
            inv_hx2: 1.0 / (hx * hx),
            inv_hy2: 1.0 / (hy * hy),
            inv_hz2: 1.0 / (hz * hz),
        }
    }

    /// Evaluates the Laplacian of `u` at `(i, j, k)`.
    ///
    /// All six axis neighbours must already hold valid values for this level,
    /// so `i`, `j` and `k` must each lie in `1..=N`.
    #[inline]
    #[must_use]
    pub fn apply(&self, u: &[f64], i: usize, j: usize, k: usize) -> f64 {
        let idx = &self.indexer;
        let center = 2.0 * u[idx.index(i, j, k)];
        (u[idx.index(i - 1, j, k)] - center + u[idx.index(i + 1, j, k)]) * self.inv_hx2
            + (u[idx.index(i, j - 1, k)] - center + u[idx.index(i, j + 1, k)]) * self.inv_hy2
            + (u[idx.index(i, j, k - 1)] - center + u[idx.index(i, j, k + 1)]) * self.inv_hz2
    }
}
