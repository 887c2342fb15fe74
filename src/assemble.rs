//! Constraint assembler: translate continuous-domain observations and
//! smoothness priors into weighted equations of the sparse system.
//!
//! All equations flow through [`LinearSystem::append_equation`], which is
//! the only place weights are applied; everything here passes natural-scale
//! coefficients plus a separate weight.

use crate::interpolate::{cell_index, multilinear_samples};
use crate::lattice::Lattice;
use crate::types::{GradientKernel, LinearSystem, Weights, MAX_CORNERS, MAX_DIM};

// ─────────────────────────────────────────────────────────────
//  Value constraints
// ─────────────────────────────────────────────────────────────

/// Constrain the interpolated field at `pos` to equal `value`.
///
/// The equation is `Σ kᵢ·w · x_i = (Σ kᵢ·w) · value` over the admitted
/// interpolation corners. Near the lattice boundary some corners are
/// dropped and the `weight_sum · value` right-hand side implicitly
/// renormalizes the remaining kernel; no bias correction is applied, so
/// boundary cells are slightly less constrained by data. When no corner is
/// admitted the constraint is skipped and `false` is returned.
pub fn add_value_constraint(
    eq: &mut LinearSystem,
    lattice: &Lattice,
    pos: &[f64],
    value: f64,
    constraint_weight: f64,
) -> bool {
    if constraint_weight == 0.0 {
        return false;
    }

    let samples = multilinear_samples(lattice, pos, 0);
    if samples.is_empty() {
        return false;
    }

    let mut terms = [(0usize, 0.0f64); MAX_CORNERS];
    for (i, (index, kernel_weight)) in samples.iter().enumerate() {
        terms[i] = (index, kernel_weight);
    }
    eq.append_equation(
        constraint_weight,
        samples.weight_sum() * value,
        &terms[..samples.len()],
    );

    true
}

// ─────────────────────────────────────────────────────────────
//  Gradient constraints
// ─────────────────────────────────────────────────────────────

/// Constrain the field gradient at `pos` to equal `gradient`, expressed in
/// value change per unit lattice step.
///
/// Emits one equation per dimension under the selected kernel. Returns
/// `false` (leaving the system unchanged) when the required stencil does
/// not fit the lattice at `pos`.
pub fn add_gradient_constraint(
    eq: &mut LinearSystem,
    lattice: &Lattice,
    pos: &[f64],
    gradient: &[f64],
    constraint_weight: f64,
    kernel: GradientKernel,
) -> bool {
    if constraint_weight == 0.0 {
        return false;
    }

    let num_dim = lattice.num_dim();
    assert_eq!(gradient.len(), num_dim, "gradient dimensionality mismatch");

    match kernel {
        GradientKernel::NearestNeighbor => {
            let Some(index) = cell_index(lattice, pos) else {
                return false;
            };

            for d in 0..num_dim {
                // d f(x, y) / dx = gradient[0]
                // d f(x, y) / dy = gradient[1]
                // ...
                eq.append_equation(
                    constraint_weight,
                    gradient[d],
                    &[
                        (index, -1.0),
                        (index + lattice.strides()[d], 1.0),
                    ],
                );
            }
            true
        }

        GradientKernel::CellEdges => {
            // Find the cell containing the point. In 2D, with corners
            //     A B
            //     C D
            // the constraints are
            //     ((B - A) + (D - C)) / 2 = dx
            //     ((C - A) + (D - B)) / 2 = dy
            // i.e. num_dim equations with 2^num_dim terms each.
            let Some(index) = cell_index(lattice, pos) else {
                return false;
            };

            let num_corners = 1usize << num_dim;
            let term_weight = 2.0 / num_corners as f64;

            for d in 0..num_dim {
                let mut terms = [(0usize, 0.0f64); MAX_CORNERS];
                for (corner, term) in terms[..num_corners].iter_mut().enumerate() {
                    let mut corner_index = index;
                    for (axis, &stride) in lattice.strides().iter().enumerate() {
                        corner_index += stride * ((corner >> axis) & 1);
                    }
                    let sign = if (corner >> d) & 1 == 1 { 1.0 } else { -1.0 };
                    *term = (corner_index, sign * term_weight);
                }
                eq.append_equation(constraint_weight, gradient[d], &terms[..num_corners]);
            }
            true
        }

        GradientKernel::LinearInterpolation => {
            // Spread forward differences over the staggered cells around the
            // position. In 1D:
            //     pos = 3.5: all weight on one difference:
            //         (x[4] - x[3] = dx) * 1.0
            //     pos = 3.0: split equally over the two neighbors:
            //         (x[3] - x[2] = dx) * 0.5
            //         (x[4] - x[3] = dx) * 0.5
            // The split differences combine into one equation per dimension.
            let mut adjusted_pos = [0.0f64; MAX_DIM];
            for d in 0..num_dim {
                adjusted_pos[d] = pos[d] - 0.5;
            }

            let samples = multilinear_samples(lattice, &adjusted_pos[..num_dim], 1);
            if samples.is_empty() {
                return false;
            }

            for d in 0..num_dim {
                let stride = lattice.strides()[d];
                let mut terms = [(0usize, 0.0f64); 2 * MAX_CORNERS];
                for (i, (index, kernel_weight)) in samples.iter().enumerate() {
                    terms[2 * i] = (index, -kernel_weight);
                    terms[2 * i + 1] = (index + stride, kernel_weight);
                }
                eq.append_equation(
                    constraint_weight,
                    samples.weight_sum() * gradient[d],
                    &terms[..2 * samples.len()],
                );
            }
            true
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Model (smoothness) priors
// ─────────────────────────────────────────────────────────────

/// Emit the smoothness priors for one cell along one dimension.
///
/// The stencil coefficients are finite-difference weights, i.e. rows of
/// Pascal's triangle with alternating sign. Each order is emitted only when
/// its full stencil fits inside the lattice along `d`.
fn add_cell_constraints(
    eq: &mut LinearSystem,
    lattice: &Lattice,
    weights: &Weights,
    coordinate: &[usize; MAX_DIM],
    index: usize,
    d: usize,
) {
    let size = lattice.sizes()[d];
    let stride = lattice.strides()[d];
    let dim_coord = coordinate[d];

    if weights.model_0 > 0.0 && dim_coord < size {
        // f(x) = 0, Tikhonov diagonal regularization
        eq.append_equation(weights.model_0, 0.0, &[(index, 1.0)]);
    }

    if weights.model_1 > 0.0 && dim_coord + 1 < size {
        // f'(x) = 0   ⇔   f(x) = f(x + 1)
        eq.append_equation(
            weights.model_1,
            0.0,
            &[(index, -1.0), (index + stride, 1.0)],
        );
    }

    if weights.model_2 > 0.0 && dim_coord + 2 < size {
        // f''(x) = 0   ⇔   f'(x - ½) = f'(x + ½)
        eq.append_equation(
            weights.model_2,
            0.0,
            &[
                (index, 1.0),
                (index + stride, -2.0),
                (index + 2 * stride, 1.0),
            ],
        );
    }

    if weights.model_3 > 0.0 && dim_coord + 3 < size {
        eq.append_equation(
            weights.model_3,
            0.0,
            &[
                (index, 1.0),
                (index + stride, -3.0),
                (index + 2 * stride, 3.0),
                (index + 3 * stride, -1.0),
            ],
        );
    }

    if weights.model_4 > 0.0 && dim_coord + 4 < size {
        eq.append_equation(
            weights.model_4,
            0.0,
            &[
                (index, 1.0),
                (index + stride, -4.0),
                (index + 2 * stride, 6.0),
                (index + 3 * stride, -4.0),
                (index + 4 * stride, 1.0),
            ],
        );
    }

    if weights.gradient_smoothness > 0.0 && dim_coord + 1 < size {
        // The difference along d should be equal in neighboring edges:
        // penalizes the mixed partial ∂²f/∂d∂e.
        for e in 0..lattice.num_dim() {
            if e == d {
                continue;
            }
            if coordinate[e] + 1 >= lattice.sizes()[e] {
                continue;
            }
            let stride_e = lattice.strides()[e];
            eq.append_equation(
                weights.gradient_smoothness,
                0.0,
                &[
                    (index, -1.0),
                    (index + stride, 1.0),
                    (index + stride_e, 1.0),
                    (index + stride_e + stride, -1.0),
                ],
            );
        }
    }
}

/// Install the model priors for every cell of the lattice, in linear-index
/// order, dimension by dimension within each cell.
pub fn add_model_constraints(eq: &mut LinearSystem, lattice: &Lattice, weights: &Weights) {
    for index in 0..lattice.num_cells() {
        let coordinate = lattice.coord_of(index);
        for d in 0..lattice.num_dim() {
            add_cell_constraints(eq, lattice, weights, &coordinate, index, d);
        }
    }
}
