//! **Fieldfit** — scalar field / signed distance field reconstruction on a
//! regular lattice from sparse, noisy observations.
//!
//! The reconstruction is posed as a weighted sparse linear least-squares
//! problem over the lattice cell values:
//!
//! 1. **Lattice** (`lattice`): N-dimensional geometry, N ∈ [1, 4].
//! 2. **System** (`types`): growable triplet matrix + right-hand side.
//! 3. **Interpolation** (`interpolate`): boundary-safe multilinear stencils.
//! 4. **Assembly** (`assemble`): value / gradient constraints and
//!    finite-difference smoothness priors.
//! 5. **Driver** (`sdf`): point cloud with normals → assembled SDF system.
//! 6. **Solve** (`solve`): reference normal-equations LDLᵀ solver.
//! 7. **Attribution** (`attribution`): per-cell residual blame heatmap.

pub mod assemble;
pub mod attribution;
pub mod interpolate;
pub mod lattice;
pub mod sdf;
pub mod solve;
pub mod types;
