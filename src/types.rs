use sprs::{CsMat, TriMat};
use std::fmt;
use tracing::warn;

// ─────────────────────────────────────────────────────────────
//  Constants
// ─────────────────────────────────────────────────────────────

/// Largest supported lattice dimensionality.
///
/// All per-dimension scratch storage is stack-allocated at this size, so the
/// bound is a hard construction-time limit, not a soft default.
pub const MAX_DIM: usize = 4;

/// Largest number of cube corners a multilinear stencil can touch (2^MAX_DIM).
pub const MAX_CORNERS: usize = 1 << MAX_DIM;

// ─────────────────────────────────────────────────────────────
//  Error type
// ─────────────────────────────────────────────────────────────

/// Unified error type for all fallible operations in the crate.
///
/// Per-constraint failures (a stencil that does not fit the lattice) are
/// *not* errors; they are reported as `bool` returns by the assembler and
/// the affected constraint is skipped.
#[derive(Debug)]
pub enum FieldError {
    /// Lattice constructor precondition failure (dimension count or sizes).
    InvalidLattice(String),
    /// Input array dimensionality does not match the lattice.
    Shape(String),
    /// Linear algebra failure (singular normal equations, etc.).
    Linalg(sprs::errors::LinalgError),
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLattice(msg) => write!(f, "invalid lattice: {msg}"),
            Self::Shape(msg) => write!(f, "shape error: {msg}"),
            Self::Linalg(e) => write!(f, "linear algebra error: {e}"),
        }
    }
}

impl std::error::Error for FieldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Linalg(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sprs::errors::LinalgError> for FieldError {
    fn from(e: sprs::errors::LinalgError) -> Self {
        Self::Linalg(e)
    }
}

// ─────────────────────────────────────────────────────────────
//  Gradient kernels
// ─────────────────────────────────────────────────────────────

/// How a gradient observation is discretized onto the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientKernel {
    /// One forward difference per axis, anchored at the containing cell.
    NearestNeighbor,
    /// Average the differences over all parallel edges of the containing
    /// cell (Calakli & Taubin, "Smooth Signed Distance Surface
    /// Reconstruction").
    CellEdges,
    /// Spread forward differences over the 2^N staggered cells around the
    /// position, weighted multilinearly.
    LinearInterpolation,
}

// ─────────────────────────────────────────────────────────────
//  Weights  (regularizer / data trust configuration)
// ─────────────────────────────────────────────────────────────

/// Relative trust in the data terms versus the smoothness model.
///
/// Every weight is a non-negative factor multiplied into the corresponding
/// equations; zero disables the term entirely (no rows are emitted).
/// Multiplying all weights by the same positive constant leaves the
/// least-squares solution unchanged; only the ratios matter.
#[derive(Debug, Clone)]
pub struct Weights {
    /// Weight on each point value constraint.
    pub data_pos: f64,
    /// Weight on each point gradient (normal) constraint.
    pub data_gradient: f64,
    /// Pull of each cell value toward zero (Tikhonov diagonal).
    pub model_0: f64,
    /// First-difference smoothness (piecewise-constant prior).
    pub model_1: f64,
    /// Second-difference smoothness (piecewise-linear prior).
    pub model_2: f64,
    /// Third-difference smoothness.
    pub model_3: f64,
    /// Fourth-difference smoothness.
    pub model_4: f64,
    /// Cross-partial equality between neighboring edges.
    pub gradient_smoothness: f64,
    /// Discretization used for gradient constraints.
    pub gradient_kernel: GradientKernel,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            data_pos: 1.0,
            data_gradient: 1.0,
            model_0: 0.0,
            model_1: 0.0,
            model_2: 1.0,
            model_3: 0.0,
            model_4: 0.0,
            gradient_smoothness: 0.0,
            gradient_kernel: GradientKernel::LinearInterpolation,
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Triplet sparse system
// ─────────────────────────────────────────────────────────────

/// One entry of the sparse constraint matrix.
///
/// Multiple triplets with the same `(row, col)` are legal and are summed
/// when the matrix is materialized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triplet {
    pub row: usize,
    pub col: usize,
    pub value: f64,
}

impl Triplet {
    pub fn new(row: usize, col: usize, value: f64) -> Self {
        Self { row, col, value }
    }
}

/// A growable over-determined sparse system `A x ≈ rhs`.
///
/// Rows are appended monotonically by [`LinearSystem::append_equation`];
/// row indices are dense from zero upward and a row with no nonzero
/// coefficient is never materialized. The system is the sole handoff to a
/// least-squares solver.
#[derive(Debug, Clone, Default)]
pub struct LinearSystem {
    pub triplets: Vec<Triplet>,
    pub rhs: Vec<f64>,
}

impl LinearSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one weighted equation `Σ coeff_i · x_{col_i} = rhs_value`.
    ///
    /// This is the single place where weights are multiplied in; callers
    /// pass natural-scale coefficients and a separate weight. A zero weight
    /// is a no-op. Zero coefficients are skipped, and an equation whose
    /// coefficients are all zero is discarded without allocating a row,
    /// even when `rhs_value` is nonzero (such a constraint would be
    /// infeasible; it is dropped with a warning).
    pub fn append_equation(&mut self, weight: f64, rhs_value: f64, terms: &[(usize, f64)]) {
        if weight == 0.0 {
            return;
        }

        let row = self.rhs.len();
        let mut all_zero = true;
        for &(col, coeff) in terms {
            if coeff != 0.0 {
                self.triplets.push(Triplet::new(row, col, coeff * weight));
                all_zero = false;
            }
        }
        if all_zero {
            if rhs_value != 0.0 {
                warn!(rhs_value, "discarding equation with all-zero coefficients");
            }
            return;
        }
        self.rhs.push(rhs_value * weight);
    }

    /// Number of materialized equations.
    pub fn row_count(&self) -> usize {
        self.rhs.len()
    }

    /// Number of stored matrix entries (duplicates counted separately).
    pub fn triplet_count(&self) -> usize {
        self.triplets.len()
    }

    /// Materialize the constraint matrix as CSR, `row_count() × num_unknowns`.
    /// Duplicate `(row, col)` entries are summed.
    pub fn to_csr(&self, num_unknowns: usize) -> CsMat<f64> {
        let mut tri = TriMat::new((self.rhs.len(), num_unknowns));
        for t in &self.triplets {
            tri.add_triplet(t.row, t.col, t.value);
        }
        tri.to_csr()
    }
}

/// Renders every equation on its own line, `rhs = c · x_col  +  …`.
impl fmt::Display for LinearSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut row_triplets: Vec<Vec<&Triplet>> = vec![Vec::new(); self.rhs.len()];
        for triplet in &self.triplets {
            row_triplets[triplet.row].push(triplet);
        }

        for (row, rhs) in self.rhs.iter().enumerate() {
            write!(f, "{rhs} = ")?;
            for (i, triplet) in row_triplets[row].iter().enumerate() {
                write!(f, "{} * x{}", triplet.value, triplet.col)?;
                if i + 1 < row_triplets[row].len() {
                    write!(f, "  +  ")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
