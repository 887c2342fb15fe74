//! Multilinear interpolation kernel: map a continuous position to the
//! lattice corners that straddle it, with standard multilinear weights.

use crate::lattice::Lattice;
use crate::types::{MAX_CORNERS, MAX_DIM};

// ─────────────────────────────────────────────────────────────
//  Corner samples
// ─────────────────────────────────────────────────────────────

/// Up to 2^N `(linear index, weight)` pairs produced by
/// [`multilinear_samples`]. Fixed capacity, lives on the stack.
///
/// The weights do *not* sum to one in general: corners that fall outside the
/// lattice (or too close to its far edge to fit the caller's stencil) are
/// dropped, and no renormalization is applied here. Callers that need
/// normalization handle it through the weight sum.
#[derive(Debug, Clone, Copy)]
pub struct CornerSamples {
    indices: [usize; MAX_CORNERS],
    weights: [f64; MAX_CORNERS],
    len: usize,
}

impl CornerSamples {
    fn empty() -> Self {
        Self {
            indices: [0; MAX_CORNERS],
            weights: [0.0; MAX_CORNERS],
            len: 0,
        }
    }

    fn push(&mut self, index: usize, weight: f64) {
        self.indices[self.len] = index;
        self.weights[self.len] = weight;
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over `(linear index, weight)` pairs in corner order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices[..self.len]
            .iter()
            .copied()
            .zip(self.weights[..self.len].iter().copied())
    }

    /// Sum of the admitted corner weights.
    pub fn weight_sum(&self) -> f64 {
        self.weights[..self.len].iter().sum()
    }
}

// ─────────────────────────────────────────────────────────────
//  Multilinear sampling
// ─────────────────────────────────────────────────────────────

/// Compute the multilinear interpolation stencil at `pos`.
///
/// For each of the 2^N corners of the cell containing `pos`, the weight is
/// `Π_d (bit_d ? t[d] : 1 - t[d])` with `t[d] = pos[d] - ⌊pos[d]⌋`. A corner
/// is admitted iff `0 ≤ coord[d]` and `coord[d] + extra_bound < sizes[d]`
/// for every dimension; `extra_bound` is 0 for plain value sampling and 1
/// when the caller will also address `coord[d] + 1` (forward-difference
/// stencils). With no admitted corner the result is empty.
pub fn multilinear_samples(lattice: &Lattice, pos: &[f64], extra_bound: usize) -> CornerSamples {
    let num_dim = lattice.num_dim();
    assert_eq!(pos.len(), num_dim, "position dimensionality mismatch");

    let mut floored = [0isize; MAX_DIM];
    let mut t = [0.0f64; MAX_DIM];
    for d in 0..num_dim {
        let f = pos[d].floor();
        floored[d] = f as isize;
        t[d] = pos[d] - f;
    }

    let sizes = lattice.sizes();
    let strides = lattice.strides();
    let mut samples = CornerSamples::empty();

    for corner in 0..(1usize << num_dim) {
        let mut index = 0isize;
        let mut weight = 1.0;
        let mut inside = true;
        for d in 0..num_dim {
            let set = (corner >> d) & 1;
            let coord = floored[d] + set as isize;
            index += strides[d] as isize * coord;
            weight *= if set == 1 { t[d] } else { 1.0 - t[d] };
            inside &= 0 <= coord && coord + (extra_bound as isize) < sizes[d] as isize;
        }
        if inside {
            samples.push(index as usize, weight);
        }
    }

    samples
}

/// Linear index of the cell containing `pos`, requiring the full forward
/// cell (`⌊pos[d]⌋ + 1 < sizes[d]` in every dimension) to fit the lattice.
/// `None` when the cell does not fit.
pub fn cell_index(lattice: &Lattice, pos: &[f64]) -> Option<usize> {
    let num_dim = lattice.num_dim();
    assert_eq!(pos.len(), num_dim, "position dimensionality mismatch");

    let mut index = 0;
    for d in 0..num_dim {
        let coord = pos[d].floor() as isize;
        if coord < 0 || coord + 1 >= lattice.sizes()[d] as isize {
            return None;
        }
        index += coord as usize * lattice.strides()[d];
    }
    Some(index)
}
