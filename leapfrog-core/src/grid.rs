use crate::SolverError;

/// Maps 3-D grid coordinates onto offsets of a flat time-level buffer.
///
/// The grid holds `N + 2` points per axis (indices `0..=N+1`): `0` and `N` are
/// the physical boundary faces, `N + 1` is a ghost plane used for wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridIndexer {
    resolution: usize,
    stride: usize,
}

impl GridIndexer {
    /// Creates an indexer for `resolution` intervals per axis.
    ///
    /// # Errors
    ///
    /// * `SolverError::InvalidConfig` if `resolution` is zero.
    /// * `SolverError::Allocation` if `(N + 2)^3` points would overflow `usize`.
    pub fn new(resolution: usize) -> Result<Self, SolverError> {
        if resolution == 0 {
            return Err(SolverError::InvalidConfig(
                "grid resolution must be a positive integer".to_string(),
            ));
        }
        let stride = resolution
            .checked_add(2)
            .ok_or(SolverError::Allocation { bytes: usize::MAX })?;
        // Reject sizes whose byte count for all three levels cannot be represented.
        stride
            .checked_mul(stride)
            .and_then(|s| s.checked_mul(stride))
            .and_then(|points| points.checked_mul(3 * std::mem::size_of::<f64>()))
            .ok_or(SolverError::Allocation { bytes: usize::MAX })?;
        Ok(Self { resolution, stride })
    }

    /// Number of grid intervals per axis (`N`).
    #[must_use]
    pub const fn resolution(&self) -> usize {
        self.resolution
    }

    /// Number of stored points per axis, ghost plane included (`N + 2`).
    #[must_use]
    pub const fn points_per_axis(&self) -> usize {
        self.stride
    }

    /// Length of one x-plane (`(N + 2)^2`). This is the unit of parallel work.
    #[must_use]
    pub const fn slab_len(&self) -> usize {
        self.stride * self.stride
    }

    /// Total buffer length (`(N + 2)^3`).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.stride * self.stride * self.stride
    }

    /// Always false: a valid indexer has at least 27 points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Offset of `(i, j, k)` in a flat buffer.
    ///
    /// Callers guarantee every coordinate lies in `0..=N+1`.
    #[inline]
    #[must_use]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        debug_assert!(
            i < self.stride && j < self.stride && k < self.stride,
            "grid coordinate ({i}, {j}, {k}) out of range for N = {}",
            self.resolution
        );
        (i * self.stride + j) * self.stride + k
    }

    /// Offset of `(j, k)` inside a single x-plane.
    #[inline]
    #[must_use]
    pub fn slab_index(&self, j: usize, k: usize) -> usize {
        debug_assert!(j < self.stride && k < self.stride);
        j * self.stride + k
    }
}

/// Buffer slots used by a single step of the rotating three-level scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSlots {
    /// Slot being written (`step mod 3`).
    pub current: usize,
    /// Slot holding level `step - 1`.
    pub previous: usize,
    /// Slot holding level `step - 2`.
    pub before_previous: usize,
}

impl LevelSlots {
    /// Maps a step index to its three buffer slots.
    #[must_use]
    pub const fn for_step(step: usize) -> Self {
        Self {
            current: step % 3,
            previous: (step + 2) % 3,
            before_previous: (step + 1) % 3,
        }
    }
}

/// Borrowed view of the three levels for one step: one writable, two read-only.
#[derive(Debug)]
pub struct StepBuffers<'a> {
    /// Level `step`.
    pub current: &'a mut [f64],
    /// Level `step - 1`.
    pub previous: &'a [f64],
    /// Level `step - 2`.
    pub before_previous: &'a [f64],
}

/// The rotating set of three time-level buffers, owned for a whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeLevels {
    indexer: GridIndexer,
    buffers: [Vec<f64>; 3],
}

impl TimeLevels {
    /// Allocates three zero-filled buffers of `(N + 2)^3` values.
    ///
    /// # Errors
    ///
    /// Returns `SolverError::Allocation` if the memory cannot be reserved.
    pub fn allocate(indexer: GridIndexer) -> Result<Self, SolverError> {
        let len = indexer.len();
        let bytes = len.saturating_mul(3 * std::mem::size_of::<f64>());
        let alloc = || -> Result<Vec<f64>, SolverError> {
            let mut buffer = Vec::new();
            buffer
                .try_reserve_exact(len)
                .map_err(|_| SolverError::Allocation { bytes })?;
            buffer.resize(len, 0.0);
            Ok(buffer)
        };
        let buffers = [alloc()?, alloc()?, alloc()?];
        log::debug!("Allocated 3 time levels of {len} points ({bytes} bytes)");
        Ok(Self { indexer, buffers })
    }

    /// Indexer shared by all three buffers.
    #[must_use]
    pub const fn indexer(&self) -> GridIndexer {
        self.indexer
    }

    /// Read access to the buffer holding level `step`.
    #[must_use]
    pub fn level(&self, step: usize) -> &[f64] {
        &self.buffers[LevelSlots::for_step(step).current]
    }

    /// Write access to the buffer holding level `step`.
    pub fn level_mut(&mut self, step: usize) -> &mut [f64] {
        &mut self.buffers[LevelSlots::for_step(step).current]
    }

    /// Splits the set into the writable level `step` and the two levels before it.
    pub fn split(&mut self, step: usize) -> StepBuffers<'_> {
        let [a, b, c] = &mut self.buffers;
        let (current, previous, before_previous) = match LevelSlots::for_step(step).current {
            0 => (a, &*c, &*b),
            1 => (b, &*a, &*c),
            _ => (c, &*b, &*a),
        };
        StepBuffers {
            current,
            previous,
            before_previous,
        }
    }
}
