//! High-level driver: assemble the full reconstruction system for a point
//! cloud with optional normals.
//!
//! Sample positions are constrained to value zero, which is what makes the
//! reconstructed field a signed distance field: the samples lie on the zero
//! level set and the gradient constraints orient the normal direction.

use ndarray::ArrayView2;
use tracing::{debug, info};

use crate::assemble::{add_gradient_constraint, add_model_constraints, add_value_constraint};
use crate::lattice::Lattice;
use crate::types::{FieldError, LinearSystem, Weights, MAX_DIM};

// ─────────────────────────────────────────────────────────────
//  Assembled system
// ─────────────────────────────────────────────────────────────

/// A lattice together with its assembled constraint system, ready for a
/// least-squares solver.
#[derive(Debug, Clone)]
pub struct FieldSystem {
    pub lattice: Lattice,
    pub eq: LinearSystem,
}

impl FieldSystem {
    /// Number of columns of the constraint matrix (one unknown per cell).
    pub fn num_unknowns(&self) -> usize {
        self.lattice.num_cells()
    }
}

// ─────────────────────────────────────────────────────────────
//  SDF assembly from a point cloud
// ─────────────────────────────────────────────────────────────

/// Assemble the signed-distance-field system for a point cloud.
///
/// `positions` (and `normals`, when given) are `num_points × N` arrays in
/// lattice coordinates: one unit equals one cell step, so callers working
/// in world units scale by `resolution - 1` first. Normals are interpreted
/// as the field gradient at the sample, per unit lattice step.
///
/// Model priors are installed for every cell, then per point a value
/// constraint with target zero and weight `point_weight · data_pos`, and,
/// when normals are supplied, a gradient constraint with weight
/// `point_weight · data_gradient` under the configured kernel. Points whose
/// stencil falls outside the lattice are skipped; they never abort the
/// build.
pub fn sdf_from_points(
    sizes: &[usize],
    weights: &Weights,
    positions: ArrayView2<'_, f64>,
    normals: Option<ArrayView2<'_, f64>>,
    point_weights: Option<&[f64]>,
) -> Result<FieldSystem, FieldError> {
    let lattice = Lattice::new(sizes)?;
    let num_dim = lattice.num_dim();
    let num_points = positions.nrows();

    if positions.ncols() != num_dim {
        return Err(FieldError::Shape(format!(
            "positions are {}-dimensional but the lattice is {num_dim}-dimensional",
            positions.ncols()
        )));
    }
    if let Some(normals) = &normals {
        if normals.dim() != positions.dim() {
            return Err(FieldError::Shape(format!(
                "normals shape {:?} does not match positions shape {:?}",
                normals.dim(),
                positions.dim()
            )));
        }
    }
    if let Some(pw) = point_weights {
        if pw.len() != num_points {
            return Err(FieldError::Shape(format!(
                "{} point weights for {num_points} points",
                pw.len()
            )));
        }
    }

    debug!(num_points, num_unknowns = lattice.num_cells(), "assembling field system");

    let mut eq = LinearSystem::new();
    add_model_constraints(&mut eq, &lattice, weights);

    let mut pos = [0.0f64; MAX_DIM];
    let mut normal = [0.0f64; MAX_DIM];
    for i in 0..num_points {
        let point_weight = point_weights.map_or(1.0, |pw| pw[i]);
        for d in 0..num_dim {
            pos[d] = positions[[i, d]];
        }

        add_value_constraint(
            &mut eq,
            &lattice,
            &pos[..num_dim],
            0.0,
            point_weight * weights.data_pos,
        );

        if let Some(normals) = &normals {
            for d in 0..num_dim {
                normal[d] = normals[[i, d]];
            }
            add_gradient_constraint(
                &mut eq,
                &lattice,
                &pos[..num_dim],
                &normal[..num_dim],
                point_weight * weights.data_gradient,
                weights.gradient_kernel,
            );
        }
    }

    info!(
        equations = eq.row_count(),
        matrix_values = eq.triplet_count(),
        "field system assembled"
    );

    Ok(FieldSystem { lattice, eq })
}
