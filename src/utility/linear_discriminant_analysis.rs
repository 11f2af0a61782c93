use super::*;

/// Default regularization added to the diagonal of the within-class scatter.
pub const DEFAULT_SW_REG: f64 = 1e-6;

/// Decimal digits kept for coefficients in exported formulas.
const FORMULA_DECIMALS: i32 = 6;

/// A solved discriminant, as stored by `LDA`.
///
/// # Fields
///
/// - `eigenvalues` - Up to `C - 1` eigenvalues in non-increasing order
/// - `eigenvectors` - Matching unit eigenvectors as columns, shape: (n_features, n_components)
/// - `between` - Between-class scatter `S_b` used for the solve
/// - `within` - Regularized within-class scatter `S_w + sw_reg·I` used for the solve
/// - `classes` - Sorted distinct labels the solution was computed from
#[derive(Debug, Clone, PartialEq)]
pub struct DiscriminantSolution {
    pub eigenvalues: Array1<f64>,
    pub eigenvectors: Array2<f64>,
    pub between: Array2<f64>,
    pub within: Array2<f64>,
    pub classes: Vec<i32>,
}

impl DiscriminantSolution {
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn n_features(&self) -> usize {
        self.eigenvectors.nrows()
    }

    pub fn n_components(&self) -> usize {
        self.eigenvalues.len()
    }
}

/// A value returned by `LDA::get_params`.
#[derive(Debug, Clone, PartialEq)]
pub enum LdaParam {
    FeatureNames(Vec<String>),
    Vector(Array1<f64>),
    Matrix(Array2<f64>),
}

/// Linear Discriminant Analysis (LDA) projector
///
/// Finds the directions that maximize the ratio of between-class to within-class scatter by
/// solving `S_b v = λ (S_w + sw_reg·I) v`. The retained eigenvectors (at most `C - 1`) define
/// a linear projection that can be applied to new data or exported as a PLUMED `COMBINE`
/// collective variable.
///
/// Only calls that explicitly ask for it (`fit`, or `compute_lda` with `save_params = true`)
/// replace the stored solution, and only after the whole solve succeeded.
///
/// # Fields
///
/// - `estimator` - Scatter matrix estimator (arithmetic or harmonic)
/// - `sw_reg` - Regularization added to the diagonal of `S_w`
/// - `feature_names` - Optional names of the input features
/// - `solution` - Most recently saved solution
///
/// # Example
/// ```rust
/// use ndarray::array;
/// use lda_colvar::utility::linear_discriminant_analysis::LDA;
///
/// let x = array![[1.0, 2.0], [1.5, 2.5], [2.0, 3.2], [5.0, 5.0], [5.5, 4.5], [6.0, 5.1]];
/// let y = array![0, 0, 0, 1, 1, 1];
///
/// let mut lda = LDA::new(false);
/// lda.fit(x.view(), y.view()).unwrap();
///
/// let projected = lda.transform(x.view()).unwrap();
/// assert_eq!(projected.dim(), (6, 1));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LDA {
    estimator: ScatterMatrixEstimator,
    sw_reg: f64,
    feature_names: Option<Vec<String>>,
    solution: Option<DiscriminantSolution>,
}

/// Default implementation for LDA (arithmetic within-class scatter)
impl Default for LDA {
    fn default() -> Self {
        Self::new(false)
    }
}

impl LDA {
    /// Creates a new, unfitted LDA instance
    ///
    /// # Parameters
    ///
    /// * `harmonic` - Use the harmonic (HLDA) combination of class covariances
    ///
    /// # Returns
    ///
    /// * `LDA` - A new instance with `sw_reg = 1e-6` and no stored solution
    pub fn new(harmonic: bool) -> Self {
        LDA {
            estimator: ScatterMatrixEstimator::new(harmonic),
            sw_reg: DEFAULT_SW_REG,
            feature_names: None,
            solution: None,
        }
    }

    get_field!(get_sw_reg, sw_reg, f64);
    get_field!(get_estimator, estimator, ScatterMatrixEstimator);
    get_field_as_ref!(get_feature_names, feature_names, Option<&Vec<String>>);
    get_field_as_ref!(get_solution, solution, Option<&DiscriminantSolution>);

    /// Whether the harmonic (HLDA) variant is used.
    pub fn is_harmonic(&self) -> bool {
        self.estimator.is_harmonic()
    }

    /// Sets the regularization added to the diagonal of the within-class scatter.
    ///
    /// # Parameters
    ///
    /// * `sw_reg` - Non-negative, finite regularization
    ///
    /// # Returns
    ///
    /// - `Ok(&mut Self)` - Reference to self
    /// - `Err(ModelError::InputValidationError)` - If `sw_reg` is negative or not finite
    pub fn set_regularization(&mut self, sw_reg: f64) -> Result<&mut Self, ModelError> {
        if !(sw_reg >= 0.0 && sw_reg.is_finite()) {
            return Err(ModelError::InputValidationError(format!(
                "sw_reg must be non-negative and finite, got {}",
                sw_reg
            )));
        }
        self.sw_reg = sw_reg;
        Ok(self)
    }

    /// Sets the names used for the `ARG=` list of exported formulas.
    pub fn set_feature_names<S: Into<String>>(&mut self, names: Vec<S>) -> &mut Self {
        self.feature_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Computes scatter matrices and solves the eigenproblem without touching stored state.
    pub(crate) fn solve_with_scatter(
        &self,
        h: ArrayView2<f64>,
        y: ArrayView1<i32>,
    ) -> Result<(ScatterMatrices, EigenSolution), ModelError> {
        let scatter = self.estimator.compute(h, y)?;
        let eigen = solve_generalized_eigen(
            scatter.between.view(),
            scatter.within.view(),
            self.sw_reg,
            scatter.n_classes(),
        )?;
        Ok((scatter, eigen))
    }

    /// Solves the discriminant problem for a batch without storing the result
    ///
    /// # Parameters
    ///
    /// - `h` - Feature matrix, shape: (n_samples, n_features)
    /// - `y` - Class labels, shape: (n_samples,)
    ///
    /// # Returns
    ///
    /// - `Ok(DiscriminantSolution)` - Eigenvalues, eigenvectors and the scatter matrices used
    /// - `Err(ModelError)` - See `ScatterMatrixEstimator::compute` and `solve_generalized_eigen`
    pub fn solve(
        &self,
        h: ArrayView2<f64>,
        y: ArrayView1<i32>,
    ) -> Result<DiscriminantSolution, ModelError> {
        let (scatter, eigen) = self.solve_with_scatter(h, y)?;
        Ok(DiscriminantSolution {
            eigenvalues: eigen.eigenvalues,
            eigenvectors: eigen.eigenvectors,
            between: scatter.between,
            within: eigen.regularized_within,
            classes: scatter.classes,
        })
    }

    /// Performs LDA on a batch, optionally saving the result
    ///
    /// # Parameters
    ///
    /// - `h` - Feature matrix, shape: (n_samples, n_features)
    /// - `y` - Class labels, shape: (n_samples,)
    /// - `save_params` - Replace the stored solution with this one
    ///
    /// # Returns
    ///
    /// - `Ok(DiscriminantSolution)` - The solution for this batch
    /// - `Err(ModelError)` - If the solve fails; the stored solution is left untouched
    pub fn compute_lda(
        &mut self,
        h: ArrayView2<f64>,
        y: ArrayView1<i32>,
        save_params: bool,
    ) -> Result<DiscriminantSolution, ModelError> {
        let solution = self.solve(h, y)?;
        if save_params {
            self.solution = Some(solution.clone());
        }
        Ok(solution)
    }

    /// Fits the LDA projection using training data
    ///
    /// # Parameters
    ///
    /// - `x` - Feature matrix where each row is a sample, shape: (n_samples, n_features)
    /// - `y` - Class labels corresponding to each sample, shape: (n_samples,)
    ///
    /// # Returns
    ///
    /// - `Ok(&mut Self)` - Reference to self
    /// - `Err(ModelError::InputValidationError)` - If input validation fails
    /// - `Err(ModelError::InvalidClassCount)` - If fewer than two classes are present
    /// - `Err(ModelError::InsufficientSamples)` - If a class has a single sample
    /// - `Err(ModelError::NonPositiveDefinite)` - If the regularized `S_w` is not positive definite
    pub fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<i32>) -> Result<&mut Self, ModelError> {
        self.compute_lda(x, y, true)?;
        Ok(self)
    }

    /// Replaces the stored solution, e.g. when restoring a checkpoint.
    ///
    /// # Returns
    ///
    /// - `Ok(&mut Self)` - Reference to self
    /// - `Err(ModelError::InputValidationError)` - If the solution's shapes are inconsistent
    pub fn load_solution(
        &mut self,
        solution: DiscriminantSolution,
    ) -> Result<&mut Self, ModelError> {
        let n_features = solution.n_features();
        if solution.eigenvectors.ncols() != solution.n_components()
            || solution.between.dim() != (n_features, n_features)
            || solution.within.dim() != (n_features, n_features)
        {
            return Err(ModelError::InputValidationError(format!(
                "Inconsistent discriminant solution: eigenvectors {:?}, {} eigenvalues, S_b {:?}, S_w {:?}",
                solution.eigenvectors.dim(),
                solution.n_components(),
                solution.between.dim(),
                solution.within.dim()
            )));
        }
        self.solution = Some(solution);
        Ok(self)
    }

    /// Projects data onto the stored discriminant directions
    ///
    /// # Parameters
    ///
    /// * `x` - Feature matrix where each row is a sample, shape: (n_samples, n_features)
    ///
    /// # Returns
    ///
    /// - `Ok(Array2<f64>)` - Projected data, shape: (n_samples, n_components)
    /// - `Err(ModelError::NotFitted)` - If no solution has been saved yet
    /// - `Err(ModelError::InputValidationError)` - If input does not match expectation
    pub fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>, ModelError> {
        let solution = self.solution.as_ref().ok_or(ModelError::NotFitted)?;

        if x.is_empty() {
            return Err(ModelError::InputValidationError(
                "Cannot transform empty dataset".to_string(),
            ));
        }

        let n_features = solution.n_features();
        if x.ncols() != n_features {
            return Err(ModelError::InputValidationError(format!(
                "Number of features does not match training data, x columns: {}, expected: {}",
                x.ncols(),
                n_features
            )));
        }

        if x.iter().any(|&val| !val.is_finite()) {
            return Err(ModelError::InputValidationError(
                "Input data contains NaN or infinite values".to_string(),
            ));
        }

        Ok(x.dot(&solution.eigenvectors))
    }

    /// Fits the model and transforms the data in one step
    ///
    /// # Parameters
    ///
    /// - `x` - Feature matrix where each row is a sample, shape: (n_samples, n_features)
    /// - `y` - Class labels corresponding to each sample, shape: (n_samples,)
    ///
    /// # Returns
    ///
    /// - `Ok(Array2<f64>)` - Transformed data matrix
    /// - `Err(ModelError)` - If fitting or transforming fails
    pub fn fit_transform(
        &mut self,
        x: ArrayView2<f64>,
        y: ArrayView1<i32>,
    ) -> Result<Array2<f64>, ModelError> {
        self.fit(x, y)?;
        self.transform(x)
    }

    /// Returns the stored parameters by name
    ///
    /// Keys: `feature_names` (only when set), `eigenvalues`, `eigenvectors`, `S_b`, `S_w`.
    ///
    /// # Returns
    ///
    /// - `Ok(AHashMap<&'static str, LdaParam>)` - Parameter map
    /// - `Err(ModelError::NotFitted)` - If no solution has been saved yet
    pub fn get_params(&self) -> Result<AHashMap<&'static str, LdaParam>, ModelError> {
        let solution = self.solution.as_ref().ok_or(ModelError::NotFitted)?;

        let mut params = AHashMap::new();
        if let Some(names) = &self.feature_names {
            params.insert("feature_names", LdaParam::FeatureNames(names.clone()));
        }
        params.insert(
            "eigenvalues",
            LdaParam::Vector(solution.eigenvalues.clone()),
        );
        params.insert(
            "eigenvectors",
            LdaParam::Matrix(solution.eigenvectors.clone()),
        );
        params.insert("S_b", LdaParam::Matrix(solution.between.clone()));
        params.insert("S_w", LdaParam::Matrix(solution.within.clone()));
        Ok(params)
    }

    /// Exports the projection as PLUMED `COMBINE` definitions, one line per component
    ///
    /// Each line reads
    /// `<label>: COMBINE ARG=<name_1>,...,<name_D> COEFFICIENTS=<c_1>,...,<c_D> PERIODIC=NO`,
    /// with label `lda` for a single component and `lda0`, `lda1`, ... otherwise.
    /// Coefficients are rounded to 6 decimals and written in shortest decimal form.
    ///
    /// # Parameters
    ///
    /// * `feature_names` - Names for the `ARG=` list; falls back to the stored names, then to `x0, x1, ...`
    ///
    /// # Returns
    ///
    /// - `Ok(String)` - The formula lines joined by `\n`
    /// - `Err(ModelError::NotFitted)` - If no solution has been saved yet
    /// - `Err(ModelError::InputValidationError)` - If the number of names differs from the number of features
    pub fn export_linear_formula(
        &self,
        feature_names: Option<&[&str]>,
    ) -> Result<String, ModelError> {
        let solution = self.solution.as_ref().ok_or(ModelError::NotFitted)?;
        let n_features = solution.n_features();

        let names: Vec<String> = match (feature_names, &self.feature_names) {
            (Some(names), _) => names.iter().map(|name| name.to_string()).collect(),
            (None, Some(names)) => names.clone(),
            (None, None) => (0..n_features).map(|i| format!("x{}", i)).collect(),
        };
        if names.len() != n_features {
            return Err(ModelError::InputValidationError(format!(
                "Expected {} feature names, got {}",
                n_features,
                names.len()
            )));
        }
        let args = names.join(",");

        let n_components = solution.n_components();
        let lines: Vec<String> = solution
            .eigenvectors
            .columns()
            .into_iter()
            .enumerate()
            .map(|(i, column)| {
                let label = if n_components == 1 {
                    "lda".to_string()
                } else {
                    format!("lda{}", i)
                };
                let coefficients = column
                    .iter()
                    .map(|&c| format_coefficient(c))
                    .collect::<Vec<_>>()
                    .join(",");
                format!(
                    "{}: COMBINE ARG={} COEFFICIENTS={} PERIODIC=NO",
                    label, args, coefficients
                )
            })
            .collect();

        Ok(lines.join("\n"))
    }
}

/// Rounds to `FORMULA_DECIMALS` digits and prints the shortest decimal representation.
pub(crate) fn format_coefficient(value: f64) -> String {
    let scale = 10f64.powi(FORMULA_DECIMALS);
    let rounded = (value * scale).round() / scale;
    if rounded == 0.0 {
        // avoids "-0"
        "0".to_string()
    } else {
        format!("{}", rounded)
    }
}
