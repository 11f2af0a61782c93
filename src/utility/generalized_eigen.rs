use super::*;
use std::cmp::Ordering;

/// Solution of the regularized generalized eigenproblem `S_b v = λ (S_w + reg·I) v`.
///
/// # Fields
///
/// - `eigenvalues` - Retained eigenvalues, in non-increasing order
/// - `eigenvectors` - Matching eigenvectors as columns, shape: (n_features, n_components);
///   each column has unit L2 norm and a non-negative first coordinate
/// - `regularized_within` - The regularized within-class scatter `S_w + reg·I`
#[derive(Debug, Clone, PartialEq)]
pub struct EigenSolution {
    pub eigenvalues: Array1<f64>,
    pub eigenvectors: Array2<f64>,
    pub regularized_within: Array2<f64>,
}

impl EigenSolution {
    /// Number of retained eigenpairs.
    pub fn n_components(&self) -> usize {
        self.eigenvalues.len()
    }

    /// Adjoint of one eigenvalue.
    ///
    /// For a simple eigenvalue `λ` with eigenvector `v`, `dλ = tr(P dS_b) - λ tr(P dS_w')`
    /// where `P = v vᵀ / (vᵀ S_w' v)`. The returned pair is `(∂λ/∂S_b, ∂λ/∂S_w')`.
    ///
    /// # Parameters
    ///
    /// * `index` - Position of the eigenvalue in `eigenvalues`
    ///
    /// # Returns
    ///
    /// - `Ok((Array2<f64>, Array2<f64>))` - Gradients with respect to `S_b` and the regularized `S_w`
    /// - `Err(ModelError::InputValidationError)` - If `index` is out of range
    /// - `Err(ModelError::ProcessingError)` - If `vᵀ S_w' v` is not positive
    pub fn eigenvalue_adjoint(
        &self,
        index: usize,
    ) -> Result<(Array2<f64>, Array2<f64>), ModelError> {
        if index >= self.n_components() {
            return Err(ModelError::InputValidationError(format!(
                "Eigenvalue index {} out of range, {} components retained",
                index,
                self.n_components()
            )));
        }

        let v = self.eigenvectors.column(index);
        let metric = v.dot(&self.regularized_within.dot(&v));
        if !(metric > 0.0 && metric.is_finite()) {
            return Err(ModelError::ProcessingError(format!(
                "Eigenvector {} has non-positive S_w norm {}",
                index, metric
            )));
        }

        let projector = v
            .insert_axis(Axis(1))
            .dot(&v.insert_axis(Axis(0)))
            / metric;
        let lambda = self.eigenvalues[index];
        let grad_within = &projector * -lambda;

        Ok((projector, grad_within))
    }
}

/// Solves the generalized eigenproblem of linear discriminant analysis.
///
/// The problem `S_b v = λ S_w' v`, with `S_w' = S_w + sw_reg·I`, is reduced to a standard
/// symmetric eigenproblem by Cholesky whitening `S_w' = L Lᵀ`:
///
/// 1. `S_new = L⁻¹ S_b L⁻ᵀ` (two triangular solves, then symmetrized)
/// 2. `S_new u = λ u`, sorted by decreasing `λ`
/// 3. `v = L⁻ᵀ u`, normalized to unit length with a non-negative first coordinate
/// 4. keep the top `min(C - 1, D)` pairs
///
/// The solve is atomic: it either returns a complete solution or an error.
///
/// # Parameters
///
/// - `s_b` - Between-class scatter, shape: (n_features, n_features)
/// - `s_w` - Unregularized within-class scatter, shape: (n_features, n_features)
/// - `sw_reg` - Non-negative value added to the diagonal of `s_w`
/// - `n_classes` - Number of distinct classes `C`
///
/// # Returns
///
/// - `Ok(EigenSolution)` - The retained eigenpairs
/// - `Err(ModelError::InvalidClassCount)` - If `n_classes < 2`
/// - `Err(ModelError::NonPositiveDefinite)` - If `S_w + sw_reg·I` has no Cholesky factor
/// - `Err(ModelError::InputValidationError)` - If shapes or `sw_reg` are invalid
/// - `Err(ModelError::ProcessingError)` - If the whitened problem is not finite
pub fn solve_generalized_eigen(
    s_b: ArrayView2<f64>,
    s_w: ArrayView2<f64>,
    sw_reg: f64,
    n_classes: usize,
) -> Result<EigenSolution, ModelError> {
    if n_classes < 2 {
        return Err(ModelError::InvalidClassCount(n_classes));
    }

    let n_features = s_w.nrows();
    if n_features == 0 || s_w.dim() != (n_features, n_features) || s_b.dim() != s_w.dim() {
        return Err(ModelError::InputValidationError(format!(
            "S_b {:?} and S_w {:?} must be square matrices of the same non-zero size",
            s_b.dim(),
            s_w.dim()
        )));
    }
    if !(sw_reg >= 0.0 && sw_reg.is_finite()) {
        return Err(ModelError::InputValidationError(format!(
            "sw_reg must be non-negative and finite, got {}",
            sw_reg
        )));
    }

    let regularized_within = &s_w + &(Array2::<f64>::eye(n_features) * sw_reg);

    let cholesky = Cholesky::new(to_dmatrix(regularized_within.view())).ok_or_else(|| {
        ModelError::NonPositiveDefinite(format!(
            "regularized within-class scatter (sw_reg = {}) has no Cholesky factor",
            sw_reg
        ))
    })?;
    let l = cholesky.l();

    let whitening_error = || {
        ModelError::ProcessingError(
            "Triangular solve against the Cholesky factor failed".to_string(),
        )
    };
    let l_inv_sb = l
        .solve_lower_triangular(&to_dmatrix(s_b))
        .ok_or_else(whitening_error)?;
    let s_new = l
        .solve_lower_triangular(&l_inv_sb.transpose())
        .ok_or_else(whitening_error)?;
    let s_new = (&s_new + &s_new.transpose()) * 0.5;
    if s_new.iter().any(|v| !v.is_finite()) {
        return Err(ModelError::ProcessingError(
            "Whitened between-class scatter contains NaN or infinite values".to_string(),
        ));
    }

    let eigen = SymmetricEigen::new(s_new);

    let mut order: Vec<usize> = (0..n_features).collect();
    order.sort_by(|&a, &b| {
        eigen.eigenvalues[b]
            .partial_cmp(&eigen.eigenvalues[a])
            .unwrap_or(Ordering::Equal)
    });

    let n_components = (n_classes - 1).min(n_features);
    let l_t = l.transpose();
    let mut eigenvalues = Array1::<f64>::zeros(n_components);
    let mut eigenvectors = Array2::<f64>::zeros((n_features, n_components));

    for (col, &idx) in order.iter().take(n_components).enumerate() {
        let u = eigen.eigenvectors.column(idx).into_owned();
        let v = l_t.solve_upper_triangular(&u).ok_or_else(whitening_error)?;

        let norm = v.norm();
        if !(norm > 0.0 && norm.is_finite()) {
            return Err(ModelError::ProcessingError(format!(
                "Eigenvector {} has invalid norm {}",
                col, norm
            )));
        }
        // sign convention: first coordinate non-negative
        let sign = if v[0] < 0.0 { -1.0 } else { 1.0 };

        eigenvalues[col] = eigen.eigenvalues[idx];
        for row in 0..n_features {
            eigenvectors[[row, col]] = sign * v[row] / norm;
        }
    }

    Ok(EigenSolution {
        eigenvalues,
        eigenvectors,
        regularized_within,
    })
}
