//! Lattice geometry: sizes, row-major strides, index ↔ coordinate maps.

use crate::types::{FieldError, MAX_DIM};

/// Immutable description of a regular N-dimensional lattice, N ∈ [1, MAX_DIM].
///
/// Dimension 0 is fastest-varying: `strides[0] = 1`,
/// `strides[d] = strides[d-1] * sizes[d-1]`. Cell values are the unknowns of
/// the reconstruction, addressed by the linear index `Σ coord[d] * strides[d]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lattice {
    sizes: Vec<usize>,
    strides: Vec<usize>,
    num_cells: usize,
}

impl Lattice {
    /// Build a lattice from per-dimension sizes.
    ///
    /// Fails when the dimension count is outside `[1, MAX_DIM]` or any size
    /// is zero.
    pub fn new(sizes: &[usize]) -> Result<Self, FieldError> {
        let num_dim = sizes.len();
        if num_dim < 1 || num_dim > MAX_DIM {
            return Err(FieldError::InvalidLattice(format!(
                "dimension count must be in [1, {MAX_DIM}], got {num_dim}"
            )));
        }
        if let Some(d) = sizes.iter().position(|&s| s < 1) {
            return Err(FieldError::InvalidLattice(format!(
                "sizes[{d}] must be at least 1, got {}",
                sizes[d]
            )));
        }

        let mut strides = Vec::with_capacity(num_dim);
        let mut stride = 1;
        for &size in sizes {
            strides.push(stride);
            stride *= size;
        }

        Ok(Self {
            sizes: sizes.to_vec(),
            strides,
            num_cells: stride,
        })
    }

    pub fn num_dim(&self) -> usize {
        self.sizes.len()
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Total number of cells, i.e. the number of unknowns.
    pub fn num_cells(&self) -> usize {
        self.num_cells
    }

    /// Linear index of an in-bounds lattice coordinate. No bounds check.
    pub fn index_of(&self, coord: &[usize]) -> usize {
        debug_assert_eq!(coord.len(), self.num_dim());
        coord
            .iter()
            .zip(&self.strides)
            .map(|(&c, &s)| c * s)
            .sum()
    }

    /// Inverse of [`Lattice::index_of`]. Unused trailing dimensions are zero.
    pub fn coord_of(&self, index: usize) -> [usize; MAX_DIM] {
        let mut coord = [0; MAX_DIM];
        let mut rest = index;
        for (d, &size) in self.sizes.iter().enumerate() {
            coord[d] = rest % size;
            rest /= size;
        }
        coord
    }

    /// True iff `0 ≤ coord[d] < sizes[d]` for every dimension.
    pub fn in_bounds(&self, coord: &[isize]) -> bool {
        debug_assert_eq!(coord.len(), self.num_dim());
        coord
            .iter()
            .zip(&self.sizes)
            .all(|(&c, &size)| 0 <= c && (c as usize) < size)
    }
}
