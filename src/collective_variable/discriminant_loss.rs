use super::*;

/// Loss of Deep-LDA: the negated Fisher eigenvalue plus a Lorentzian regularizer
///
/// With `C` classes the loss is `-λ₀` for two classes and `-λ_{C-2}`, the smallest retained
/// eigenvalue, otherwise. When `lorentzian_reg = μ > 0` the term `-μ / (1 + (r - 1)²)` is
/// added, where `r = Σ‖H_n‖² / N` is the mean squared norm of the network outputs. It keeps
/// the outputs from growing without bound, which would otherwise inflate the eigenvalues.
///
/// # Example
/// ```rust
/// use lda_colvar::collective_variable::DiscriminantLoss;
/// use lda_colvar::utility::LDA;
/// use ndarray::array;
///
/// let h = array![[0.0, 0.1], [0.2, -0.1], [-0.1, 0.0], [3.0, 0.1], [3.2, -0.2], [2.9, 0.0]];
/// let y = array![0, 0, 0, 1, 1, 1];
///
/// let mut lda = LDA::new(false);
/// let loss = DiscriminantLoss::new(0.0).unwrap();
/// let value = loss.compute(&mut lda, h.view(), y.view(), false).unwrap();
/// assert!(value < 0.0);
/// assert!(lda.get_solution().is_none());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DiscriminantLoss {
    lorentzian_reg: f64,
}

impl DiscriminantLoss {
    /// Creates a new loss
    ///
    /// # Parameters
    ///
    /// * `lorentzian_reg` - Magnitude `μ` of the Lorentzian term; 0 disables it
    ///
    /// # Returns
    ///
    /// - `Ok(Self)` - The loss
    /// - `Err(ModelError::InputValidationError)` - If `lorentzian_reg` is negative or not finite
    pub fn new(lorentzian_reg: f64) -> Result<Self, ModelError> {
        let mut loss = DiscriminantLoss::default();
        loss.set_lorentzian_reg(lorentzian_reg)?;
        Ok(loss)
    }

    get_field!(get_lorentzian_reg, lorentzian_reg, f64);

    /// Sets the magnitude of the Lorentzian term.
    pub fn set_lorentzian_reg(&mut self, lorentzian_reg: f64) -> Result<&mut Self, ModelError> {
        if !(lorentzian_reg >= 0.0 && lorentzian_reg.is_finite()) {
            return Err(ModelError::InputValidationError(format!(
                "lorentzian_reg must be non-negative and finite, got {}",
                lorentzian_reg
            )));
        }
        self.lorentzian_reg = lorentzian_reg;
        Ok(self)
    }

    /// Lorentzian penalty `-μ / (1 + (r - 1)²)` with `r = Σ‖H_n‖² / N`
    ///
    /// # Parameters
    ///
    /// * `h` - Network outputs, shape: (n_samples, n_features)
    ///
    /// # Returns
    ///
    /// * `f64` - The penalty; 0 when `μ = 0` or `h` has no rows
    pub fn regularization_lorentzian(&self, h: ArrayView2<f64>) -> f64 {
        if self.lorentzian_reg == 0.0 || h.nrows() == 0 {
            return 0.0;
        }
        let r = mean_squared_norm(h);
        -self.lorentzian_reg / (1.0 + (r - 1.0).powi(2))
    }

    /// Gradient of `regularization_lorentzian` with respect to `h`.
    fn lorentzian_gradient(&self, h: ArrayView2<f64>) -> Array2<f64> {
        if self.lorentzian_reg == 0.0 || h.nrows() == 0 {
            return Array2::zeros(h.raw_dim());
        }
        let r = mean_squared_norm(h);
        let denominator = 1.0 + (r - 1.0).powi(2);
        let scale =
            4.0 * self.lorentzian_reg * (r - 1.0) / (denominator * denominator * h.nrows() as f64);
        &h * scale
    }

    /// Evaluates the loss, optionally storing the LDA solution
    ///
    /// # Parameters
    ///
    /// - `lda` - The projector that solves the eigenproblem
    /// - `h` - Features, shape: (n_samples, n_features)
    /// - `y` - Class labels, shape: (n_samples,)
    /// - `save_params` - Store the solution in `lda`; otherwise `lda` is left untouched
    ///
    /// # Returns
    ///
    /// - `Ok(f64)` - The loss
    /// - `Err(ModelError)` - Any error of the scatter estimation or the eigen solve
    pub fn compute(
        &self,
        lda: &mut LDA,
        h: ArrayView2<f64>,
        y: ArrayView1<i32>,
        save_params: bool,
    ) -> Result<f64, ModelError> {
        let solution = lda.compute_lda(h, y, save_params)?;
        let index = loss_eigenvalue_index(solution.n_classes(), solution.n_components())?;
        Ok(-solution.eigenvalues[index] + self.regularization_lorentzian(h))
    }

    /// Evaluates the loss and its gradient with respect to the features
    ///
    /// The LDA solution is never stored. The gradient is exact for a simple (non-degenerate)
    /// eigenvalue.
    ///
    /// # Parameters
    ///
    /// - `lda` - The projector that solves the eigenproblem
    /// - `h` - Features, shape: (n_samples, n_features)
    /// - `y` - Class labels, shape: (n_samples,)
    ///
    /// # Returns
    ///
    /// - `Ok((f64, Array2<f64>))` - The loss and `∂loss/∂h`, same shape as `h`
    /// - `Err(ModelError)` - Any error of the scatter estimation, the eigen solve or the adjoint
    pub fn compute_with_grad(
        &self,
        lda: &LDA,
        h: ArrayView2<f64>,
        y: ArrayView1<i32>,
    ) -> Result<(f64, Array2<f64>), ModelError> {
        let (scatter, eigen) = lda.solve_with_scatter(h, y)?;
        let index = loss_eigenvalue_index(scatter.n_classes(), eigen.n_components())?;

        let (grad_between, grad_reg_within) = eigen.eigenvalue_adjoint(index)?;
        // loss = -λ with S_b = S_t - S_w and S_w' = S_w + reg·I
        let grad_total = -&grad_between;
        let grad_within = &grad_between - &grad_reg_within;

        let mut grad = lda.get_estimator().backward(
            h,
            y,
            &scatter,
            grad_total.view(),
            grad_within.view(),
        )?;
        grad += &self.lorentzian_gradient(h);

        let loss = -eigen.eigenvalues[index] + self.regularization_lorentzian(h);
        Ok((loss, grad))
    }
}

/// Position of the eigenvalue used by the loss.
///
/// Two classes use the only eigenvalue. More classes use the smallest retained one, index
/// `C - 2`, or the last available one when fewer than `C - 1` were retained.
fn loss_eigenvalue_index(n_classes: usize, n_components: usize) -> Result<usize, ModelError> {
    if n_classes < 2 {
        return Err(ModelError::InvalidClassCount(n_classes));
    }
    if n_components == 0 {
        return Err(ModelError::ProcessingError(
            "No eigenvalue was retained".to_string(),
        ));
    }
    Ok((n_classes - 2).min(n_components - 1))
}

fn mean_squared_norm(h: ArrayView2<f64>) -> f64 {
    h.iter().map(|v| v * v).sum::<f64>() / h.nrows() as f64
}

