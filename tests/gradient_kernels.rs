//! Gradient-constraint tests, one block per kernel.
//!
//! All three kernels interpret the gradient in value change per unit
//! lattice step and emit one equation per dimension. In 2D the containing
//! cell has the corners
//!
//!     A B        A = idx,      B = idx + strides[0]
//!     C D        C = idx + strides[1],  D = idx + both
//!
//! which the CellEdges expectations below refer to.

use fieldfit::assemble::add_gradient_constraint;
use fieldfit::lattice::Lattice;
use fieldfit::types::{GradientKernel, LinearSystem};

// ─────────────────────────────────────────────────────────────
//  Helpers
// ─────────────────────────────────────────────────────────────

fn lattice(sizes: &[usize]) -> Lattice {
    Lattice::new(sizes).unwrap()
}

fn rows_of(eq: &LinearSystem) -> Vec<Vec<(usize, f64)>> {
    let mut rows = vec![Vec::new(); eq.row_count()];
    for t in &eq.triplets {
        rows[t.row].push((t.col, t.value));
    }
    rows
}

// ─────────────────────────────────────────────────────────────
//  NearestNeighbor
// ─────────────────────────────────────────────────────────────

/// 2D lattice, strides (1, 3): one forward difference per axis from the
/// containing cell.
#[test]
fn nearest_neighbor_one_difference_per_axis() {
    let lat = lattice(&[3, 3]);
    let mut eq = LinearSystem::new();
    assert!(add_gradient_constraint(
        &mut eq,
        &lat,
        &[1.0, 1.0],
        &[1.0, 0.0],
        1.0,
        GradientKernel::NearestNeighbor,
    ));

    assert_eq!(eq.row_count(), 2);
    assert_eq!(eq.rhs, vec![1.0, 0.0]);
    let rows = rows_of(&eq);
    assert_eq!(rows[0], vec![(4, -1.0), (5, 1.0)]);
    assert_eq!(rows[1], vec![(4, -1.0), (7, 1.0)]);
}

#[test]
fn nearest_neighbor_requires_the_forward_cell() {
    let lat = lattice(&[3, 3]);
    let mut eq = LinearSystem::new();
    // floor(pos) = (2, 1) and 2 + 1 is not < 3, so no stencil fits.
    assert!(!add_gradient_constraint(
        &mut eq,
        &lat,
        &[2.0, 1.0],
        &[1.0, 0.0],
        1.0,
        GradientKernel::NearestNeighbor,
    ));
    assert_eq!(eq.row_count(), 0);
    assert_eq!(eq.triplet_count(), 0);
}

// ─────────────────────────────────────────────────────────────
//  CellEdges
// ─────────────────────────────────────────────────────────────

/// Averages directional differences over all parallel edges of the cell:
/// in 2D each equation has 2^2 terms of magnitude 2/2^2 = 0.5.
#[test]
fn cell_edges_averages_parallel_edges() {
    let lat = lattice(&[3, 3]);
    let mut eq = LinearSystem::new();
    assert!(add_gradient_constraint(
        &mut eq,
        &lat,
        &[1.0, 1.0],
        &[1.0, 0.0],
        1.0,
        GradientKernel::CellEdges,
    ));

    assert_eq!(eq.row_count(), 2);
    assert_eq!(eq.rhs, vec![1.0, 0.0]);
    let rows = rows_of(&eq);
    // d = 0: ((B - A) + (D - C)) / 2
    assert_eq!(rows[0], vec![(4, -0.5), (5, 0.5), (7, -0.5), (8, 0.5)]);
    // d = 1: ((C - A) + (D - B)) / 2
    assert_eq!(rows[1], vec![(4, -0.5), (5, -0.5), (7, 0.5), (8, 0.5)]);
}

#[test]
fn cell_edges_scales_with_the_constraint_weight() {
    let lat = lattice(&[3, 3]);
    let mut eq = LinearSystem::new();
    assert!(add_gradient_constraint(
        &mut eq,
        &lat,
        &[0.5, 0.5],
        &[2.0, -1.0],
        3.0,
        GradientKernel::CellEdges,
    ));

    assert_eq!(eq.rhs, vec![6.0, -3.0]);
    for t in &eq.triplets {
        assert_eq!(t.value.abs(), 1.5); // 3 · 2/4
    }
}

// ─────────────────────────────────────────────────────────────
//  LinearInterpolation
// ─────────────────────────────────────────────────────────────

/// Half-integer position: the staggered sample lands on a lattice point and
/// all weight goes to a single forward difference.
#[test]
fn linear_interpolation_at_half_integer_position() {
    let lat = lattice(&[8]);
    let mut eq = LinearSystem::new();
    assert!(add_gradient_constraint(
        &mut eq,
        &lat,
        &[3.5],
        &[2.0],
        1.0,
        GradientKernel::LinearInterpolation,
    ));

    assert_eq!(eq.row_count(), 1);
    assert_eq!(eq.rhs, vec![2.0]);
    let rows = rows_of(&eq);
    // (x[4] - x[3] = dx) · 1.0; the zero-weight neighbor is dropped.
    assert_eq!(rows[0], vec![(3, -1.0), (4, 1.0)]);
}

/// Integer position: the weight is split equally over the two neighboring
/// differences, combined into one equation.
#[test]
fn linear_interpolation_at_integer_position() {
    let lat = lattice(&[8]);
    let mut eq = LinearSystem::new();
    assert!(add_gradient_constraint(
        &mut eq,
        &lat,
        &[3.0],
        &[1.0],
        1.0,
        GradientKernel::LinearInterpolation,
    ));

    assert_eq!(eq.row_count(), 1);
    assert_eq!(eq.rhs, vec![1.0]);
    let rows = rows_of(&eq);
    // (x[3] - x[2]) · 0.5 + (x[4] - x[3]) · 0.5 = dx
    assert_eq!(
        rows[0],
        vec![(2, -0.5), (3, 0.5), (3, -0.5), (4, 0.5)]
    );
}

/// Near the lattice edge the staggered kernel is truncated; the rhs carries
/// the truncated weight sum.
#[test]
fn linear_interpolation_truncates_at_the_boundary() {
    let lat = lattice(&[8]);
    let mut eq = LinearSystem::new();
    assert!(add_gradient_constraint(
        &mut eq,
        &lat,
        &[0.25],
        &[4.0],
        1.0,
        GradientKernel::LinearInterpolation,
    ));

    assert_eq!(eq.row_count(), 1);
    let rows = rows_of(&eq);
    assert_eq!(rows[0], vec![(0, -0.75), (1, 0.75)]);
    assert_eq!(eq.rhs, vec![0.75 * 4.0]);
}

#[test]
fn linear_interpolation_outside_the_lattice_is_skipped() {
    let lat = lattice(&[8]);
    let mut eq = LinearSystem::new();
    assert!(!add_gradient_constraint(
        &mut eq,
        &lat,
        &[-1.0],
        &[1.0],
        1.0,
        GradientKernel::LinearInterpolation,
    ));
    assert_eq!(eq.row_count(), 0);
    assert_eq!(eq.triplet_count(), 0);
}

/// 2D: one equation per dimension, sharing the staggered kernel.
#[test]
fn linear_interpolation_emits_one_row_per_dimension() {
    let lat = lattice(&[4, 4]);
    let mut eq = LinearSystem::new();
    assert!(add_gradient_constraint(
        &mut eq,
        &lat,
        &[1.5, 1.5],
        &[1.0, -2.0],
        1.0,
        GradientKernel::LinearInterpolation,
    ));

    assert_eq!(eq.row_count(), 2);
    assert_eq!(eq.rhs, vec![1.0, -2.0]);
    let rows = rows_of(&eq);
    // Adjusted position (1.0, 1.0) puts all weight on cell (1, 1) = index 5.
    assert_eq!(rows[0], vec![(5, -1.0), (6, 1.0)]);
    assert_eq!(rows[1], vec![(5, -1.0), (9, 1.0)]);
}

// ─────────────────────────────────────────────────────────────
//  Common behavior
// ─────────────────────────────────────────────────────────────

#[test]
fn zero_weight_skips_every_kernel() {
    let lat = lattice(&[4, 4]);
    for kernel in [
        GradientKernel::NearestNeighbor,
        GradientKernel::CellEdges,
        GradientKernel::LinearInterpolation,
    ] {
        let mut eq = LinearSystem::new();
        assert!(!add_gradient_constraint(
            &mut eq,
            &lat,
            &[1.5, 1.5],
            &[1.0, 1.0],
            0.0,
            kernel,
        ));
        assert_eq!(eq.row_count(), 0);
        assert_eq!(eq.triplet_count(), 0);
    }
}
