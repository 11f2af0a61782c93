use super::*;

/// Scatter matrices of one batch of features.
///
/// Recomputed from scratch for every batch; nothing here is persisted across batches.
///
/// # Fields
///
/// - `total` - Total scatter `S_t`, the covariance of all samples
/// - `within` - Within-class scatter `S_w` (arithmetic or harmonic combination, unregularized)
/// - `between` - Between-class scatter `S_b = S_t - S_w`
/// - `classes` - Distinct class labels, sorted ascending
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterMatrices {
    pub total: Array2<f64>,
    pub within: Array2<f64>,
    pub between: Array2<f64>,
    pub classes: Vec<i32>,
}

impl ScatterMatrices {
    /// Number of distinct classes `C` found in the batch.
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Number of features `D`.
    pub fn n_features(&self) -> usize {
        self.total.nrows()
    }
}

/// Estimator of total, within-class and between-class scatter matrices.
///
/// Per-class covariances are weighted by `1 / ((N_i - 1) * C)`, where `C` is the number of
/// distinct classes in the batch. Every class must contribute at least two samples;
/// a single-sample class is rejected with `ModelError::InsufficientSamples` in both modes.
///
/// In harmonic mode (HLDA) the within-class scatter is `(Σ_i C_i⁻¹)⁻¹` instead of `Σ_i C_i`.
///
/// # Example
/// ```rust
/// use lda_colvar::utility::ScatterMatrixEstimator;
/// use ndarray::array;
///
/// let h = array![[0.0, 1.0], [1.0, 0.0], [4.0, 5.0], [5.0, 4.0]];
/// let y = array![0, 0, 1, 1];
/// let scatter = ScatterMatrixEstimator::new(false).compute(h.view(), y.view()).unwrap();
/// assert_eq!(scatter.n_classes(), 2);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScatterMatrixEstimator {
    harmonic: bool,
}

impl ScatterMatrixEstimator {
    /// Creates a new estimator.
    ///
    /// # Parameters
    ///
    /// * `harmonic` - Combine per-class covariances harmonically (HLDA) instead of arithmetically
    pub fn new(harmonic: bool) -> Self {
        ScatterMatrixEstimator { harmonic }
    }

    get_field!(is_harmonic, harmonic, bool);

    /// Computes the scatter matrices of a batch.
    ///
    /// # Parameters
    ///
    /// - `h` - Feature matrix, shape: (n_samples, n_features)
    /// - `y` - Class label of every sample, shape: (n_samples,)
    ///
    /// # Returns
    ///
    /// - `Ok(ScatterMatrices)` - Total, within-class and between-class scatter
    /// - `Err(ModelError::InputValidationError)` - If shapes mismatch, the batch has fewer than 2 samples or contains NaN/inf
    /// - `Err(ModelError::InsufficientSamples)` - If a class has a single sample
    /// - `Err(ModelError::NonPositiveDefinite)` - In harmonic mode, if a class covariance (or their harmonic sum) is singular
    pub fn compute(
        &self,
        h: ArrayView2<f64>,
        y: ArrayView1<i32>,
    ) -> Result<ScatterMatrices, ModelError> {
        validate_batch(h, y)?;

        let n_samples = h.nrows();
        let n_features = h.ncols();
        let groups = group_by_class(y)?;
        let n_classes = groups.len();

        let (h_bar, _) = center(h)?;
        let total = h_bar.t().dot(&h_bar) / (n_samples - 1) as f64;

        let mut within = Array2::<f64>::zeros((n_features, n_features));
        let mut within_inv = Array2::<f64>::zeros((n_features, n_features));
        for (class, indices) in &groups {
            let (_, cov) = class_covariance(h, indices, n_classes)?;
            within += &cov;
            if self.harmonic {
                within_inv += &invert_spd(
                    cov.view(),
                    &format!("covariance of class {}", class),
                )?;
            }
        }
        if self.harmonic {
            within = invert_spd(within_inv.view(), "harmonic sum of class covariances")?;
        }

        let between = &total - &within;

        Ok(ScatterMatrices {
            total,
            within,
            between,
            classes: groups.into_iter().map(|(class, _)| class).collect(),
        })
    }

    /// Back-propagates gradients on the scatter matrices to the features.
    ///
    /// Given `G_t = ∂L/∂S_t` and `G_w = ∂L/∂S_w`, returns `∂L/∂H`. Both gradients are
    /// symmetrized first. The between-class scatter is not an independent input: callers fold
    /// `∂L/∂S_b` into `G_t` and `G_w` through `S_b = S_t - S_w`.
    ///
    /// # Parameters
    ///
    /// - `h` - The features the scatter matrices were computed from
    /// - `y` - Class labels, shape: (n_samples,)
    /// - `scatter` - Output of `compute(h, y)`
    /// - `grad_total` - Gradient with respect to `S_t`
    /// - `grad_within` - Gradient with respect to the unregularized `S_w`
    ///
    /// # Returns
    ///
    /// - `Ok(Array2<f64>)` - Gradient with respect to `h`, same shape as `h`
    /// - `Err(ModelError)` - If the inputs are inconsistent with `scatter`
    pub fn backward(
        &self,
        h: ArrayView2<f64>,
        y: ArrayView1<i32>,
        scatter: &ScatterMatrices,
        grad_total: ArrayView2<f64>,
        grad_within: ArrayView2<f64>,
    ) -> Result<Array2<f64>, ModelError> {
        validate_batch(h, y)?;

        let n_samples = h.nrows();
        let n_features = h.ncols();
        if scatter.n_features() != n_features
            || grad_total.dim() != (n_features, n_features)
            || grad_within.dim() != (n_features, n_features)
        {
            return Err(ModelError::InputValidationError(format!(
                "Gradient shapes {:?} and {:?} do not match {} features",
                grad_total.dim(),
                grad_within.dim(),
                n_features
            )));
        }

        let grad_total = symmetrize(grad_total);
        let grad_within = symmetrize(grad_within);

        let groups = group_by_class(y)?;
        let n_classes = groups.len();
        if n_classes != scatter.n_classes() {
            return Err(ModelError::InputValidationError(format!(
                "Labels contain {} classes but the scatter matrices were built from {}",
                n_classes,
                scatter.n_classes()
            )));
        }

        let (h_bar, _) = center(h)?;
        let mut grad = h_bar.dot(&grad_total) * (2.0 / (n_samples - 1) as f64);

        // In harmonic mode each class sees G_i = C_i⁻¹ S_w G_w S_w C_i⁻¹.
        let sandwiched = if self.harmonic {
            Some(scatter.within.dot(&grad_within).dot(&scatter.within))
        } else {
            None
        };

        for (class, indices) in &groups {
            let n_i = indices.len();
            let (centered, cov) = class_covariance(h, indices, n_classes)?;
            let grad_class = match &sandwiched {
                Some(inner) => {
                    let cov_inv =
                        invert_spd(cov.view(), &format!("covariance of class {}", class))?;
                    cov_inv.dot(inner).dot(&cov_inv)
                }
                None => grad_within.clone(),
            };
            let scale = 2.0 / ((n_i - 1) * n_classes) as f64;
            let contribution = centered.dot(&grad_class) * scale;
            for (pos, &idx) in indices.iter().enumerate() {
                let mut row = grad.row_mut(idx);
                row += &contribution.row(pos);
            }
        }

        Ok(grad)
    }
}

/// Validates a feature batch and its labels.
fn validate_batch(h: ArrayView2<f64>, y: ArrayView1<i32>) -> Result<(), ModelError> {
    if h.nrows() != y.len() {
        return Err(ModelError::InputValidationError(format!(
            "h.nrows() {} != y.len() {}",
            h.nrows(),
            y.len()
        )));
    }
    if h.ncols() == 0 {
        return Err(ModelError::InputValidationError(
            "Number of features must be greater than 0".to_string(),
        ));
    }
    if h.nrows() < 2 {
        return Err(ModelError::InputValidationError(format!(
            "At least 2 samples are required to estimate a covariance, got {}",
            h.nrows()
        )));
    }
    if h.iter().any(|v| !v.is_finite()) {
        return Err(ModelError::InputValidationError(
            "Input data contains NaN or infinite values".to_string(),
        ));
    }
    Ok(())
}

/// Groups sample indices by class label, sorted by label.
///
/// Fails with `ModelError::InsufficientSamples` if any class has a single sample.
fn group_by_class(y: ArrayView1<i32>) -> Result<Vec<(i32, Vec<usize>)>, ModelError> {
    let mut class_indices_map: AHashMap<i32, Vec<usize>> = AHashMap::new();
    for (idx, &label) in y.iter().enumerate() {
        class_indices_map.entry(label).or_default().push(idx);
    }

    let mut groups: Vec<(i32, Vec<usize>)> = class_indices_map.into_iter().collect();
    groups.sort_unstable_by_key(|(class, _)| *class);

    for (class, indices) in &groups {
        if indices.len() < 2 {
            return Err(ModelError::InsufficientSamples {
                class: *class,
                count: indices.len(),
            });
        }
    }
    Ok(groups)
}

/// Subtracts the column means, returning the centered data and the means.
fn center(h: ArrayView2<f64>) -> Result<(Array2<f64>, Array1<f64>), ModelError> {
    let mean = h
        .mean_axis(Axis(0))
        .ok_or_else(|| ModelError::ProcessingError("Error computing mean".to_string()))?;
    Ok((&h - &mean, mean))
}

/// Centered rows of one class and its weighted covariance `H_iᵀ H_i / ((N_i - 1) C)`.
fn class_covariance(
    h: ArrayView2<f64>,
    indices: &[usize],
    n_classes: usize,
) -> Result<(Array2<f64>, Array2<f64>), ModelError> {
    let n_i = indices.len();
    let class_data = h.select(Axis(0), indices);
    let (centered, _) = center(class_data.view())?;
    let cov = centered.t().dot(&centered) / ((n_i - 1) * n_classes) as f64;
    Ok((centered, cov))
}
