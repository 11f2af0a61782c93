use crate::ModelError;
use ahash::AHashMap;
use nalgebra::{Cholesky, DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;

pub mod generalized_eigen;
pub mod linear_discriminant_analysis;
pub mod scatter_matrix;
pub mod standardize;

pub use generalized_eigen::*;
pub use linear_discriminant_analysis::*;
pub use scatter_matrix::*;
pub use standardize::*;

/// Copies an ndarray matrix into a nalgebra `DMatrix` (layout independent).
pub(crate) fn to_dmatrix(a: ArrayView2<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}

/// Copies a nalgebra `DMatrix` back into an ndarray matrix.
pub(crate) fn from_dmatrix(m: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

/// Returns `(a + aᵀ) / 2`.
pub(crate) fn symmetrize(a: ArrayView2<f64>) -> Array2<f64> {
    (&a + &a.t()) * 0.5
}

/// Inverts a symmetric positive definite matrix through its Cholesky factorization.
///
/// # Parameters
///
/// - `a` - Symmetric matrix to invert
/// - `what` - Name of the matrix, used in the error message
///
/// # Returns
///
/// - `Ok(Array2<f64>)` - The inverse of `a`
/// - `Err(ModelError::NonPositiveDefinite)` - If `a` is not positive definite
pub(crate) fn invert_spd(a: ArrayView2<f64>, what: &str) -> Result<Array2<f64>, ModelError> {
    let cholesky = Cholesky::new(to_dmatrix(a)).ok_or_else(|| {
        ModelError::NonPositiveDefinite(format!("{} cannot be inverted", what))
    })?;
    let inverse = from_dmatrix(&cholesky.inverse());
    if inverse.iter().any(|v| !v.is_finite()) {
        return Err(ModelError::NonPositiveDefinite(format!(
            "inverse of {} is not finite",
            what
        )));
    }
    Ok(symmetrize(inverse.view()))
}
