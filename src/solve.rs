//! Reference least-squares solver: normal equations + sparse LDLᵀ.
//!
//! The assembler produces an over-determined unsymmetric triplet system;
//! this module forms `AᵀA x = Aᵀb` and solves it with `sprs-ldl`. Any
//! solver satisfying `Ax ≈ b` in the least-squares sense is an acceptable
//! substitute; the core never depends on this module.

use sprs::{FillInReduction, SymmetryCheck};
use sprs_ldl::Ldl;
use tracing::{debug, warn};

use crate::types::{FieldError, LinearSystem};

/// Solve `min ‖A x − rhs‖²` for the assembled system.
///
/// `num_unknowns` is the column count of `A` (the lattice cell count).
/// Duplicate triplets are summed when the matrix is materialized. Fails
/// when the normal equations are not positive definite, which happens when
/// some unknown is touched by no equation (e.g. all model weights zero and
/// too few data constraints).
pub fn solve_least_squares(
    num_unknowns: usize,
    eq: &LinearSystem,
) -> Result<Vec<f64>, FieldError> {
    if eq.row_count() == 0 || num_unknowns == 0 {
        // Every x minimizes an empty system; zeros is the minimum-norm pick.
        return Ok(vec![0.0; num_unknowns]);
    }

    debug!(
        rows = eq.row_count(),
        cols = num_unknowns,
        nnz = eq.triplet_count(),
        "solving normal equations"
    );

    let a = eq.to_csr(num_unknowns);
    let at = a.transpose_view().to_csr();
    let ata = &at * &a;

    let mut atb = vec![0.0; num_unknowns];
    for (&value, (row, col)) in a.iter() {
        atb[col] += value * eq.rhs[row];
    }

    let ldl = Ldl::new()
        .fill_in_reduction(FillInReduction::ReverseCuthillMcKee)
        .check_symmetry(SymmetryCheck::DontCheckSymmetry)
        .numeric(ata.view())?;

    // AᵀA must be positive definite for the fit to be determined.
    for (i, &di) in ldl.d().iter().enumerate() {
        if !(di > 0.0) {
            return Err(FieldError::Linalg(sprs::errors::LinalgError::SingularMatrix(
                sprs::errors::SingularMatrixInfo {
                    index: i,
                    reason: "D <= 0 in LDL of the normal equations (underdetermined fit)",
                },
            )));
        }
    }

    Ok(ldl.solve(&atb))
}

/// Driver policy around [`solve_least_squares`]: on failure, log and return
/// the all-zeros field instead of propagating the error.
pub fn solve_or_zeros(num_unknowns: usize, eq: &LinearSystem) -> Vec<f64> {
    match solve_least_squares(num_unknowns, eq) {
        Ok(solution) => solution,
        Err(e) => {
            warn!(error = %e, "least-squares solve failed, substituting zeros");
            vec![0.0; num_unknowns]
        }
    }
}
