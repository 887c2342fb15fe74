//! Residual blame heatmap: share each equation's squared residual among its
//! unknowns in proportion to their squared coefficients.

use crate::types::Triplet;

/// Distribute per-row squared residuals onto the unknowns.
///
/// For each row `r`, `residual[r] = rhs[r] − Σ v·x[col]` over the row's
/// triplets and `rowEnergy[r] = Σ v²`. Each unknown in the row is blamed
/// for `(v² / rowEnergy[r]) · residual[r]²`, a leverage-weighted
/// attribution, so the heatmap sums to the total squared residual whenever
/// every row has at least one nonzero coefficient.
///
/// The result has one entry per unknown (`solution.len()`).
pub fn error_heatmap(triplets: &[Triplet], rhs: &[f64], solution: &[f64]) -> Vec<f64> {
    let mut row_errors = rhs.to_vec();
    let mut sum_of_value_sq = vec![0.0; rhs.len()];

    for triplet in triplets {
        row_errors[triplet.row] -= solution[triplet.col] * triplet.value;
        sum_of_value_sq[triplet.row] += triplet.value * triplet.value;
    }

    for error in &mut row_errors {
        *error *= *error;
    }

    let mut heatmap = vec![0.0; solution.len()];

    for triplet in triplets {
        if sum_of_value_sq[triplet.row] != 0.0 {
            let blame_fraction = (triplet.value * triplet.value) / sum_of_value_sq[triplet.row];
            heatmap[triplet.col] += blame_fraction * row_errors[triplet.row];
        }
    }

    heatmap
}
