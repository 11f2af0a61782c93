use super::*;

/// Linear discriminant collective variable
///
/// Projects `n_features` input descriptors onto the LDA directions (`lda_cv`), or onto the
/// harmonic LDA directions (`hlda_cv`). The resulting linear combinations can be exported as
/// PLUMED `COMBINE` definitions.
///
/// # Example
/// ```rust
/// use lda_colvar::collective_variable::LdaCv;
/// use ndarray::array;
///
/// let x = array![[0.0, 0.1], [0.2, -0.1], [-0.1, 0.0], [3.0, 0.1], [3.2, -0.2], [2.9, 0.0]];
/// let y = array![0, 0, 0, 1, 1, 1];
///
/// let mut cv = LdaCv::new(2, true).unwrap();
/// assert_eq!(cv.get_name(), "hlda_cv");
/// cv.set_regularization(0.05).unwrap();
/// let s = cv.fit_transform(x.view(), y.view()).unwrap();
/// assert_eq!(s.dim(), (6, 1));
/// assert!(cv.export_linear_formula(Some(&["d1", "d2"])).unwrap().starts_with("lda: COMBINE ARG=d1,d2"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LdaCv {
    name: &'static str,
    n_features: usize,
    lda: LDA,
}

impl LdaCv {
    /// Creates an unfitted linear CV
    ///
    /// # Parameters
    ///
    /// - `n_features` - Number of input descriptors
    /// - `harmonic` - Build a harmonic LDA (HLDA) CV
    ///
    /// # Returns
    ///
    /// - `Ok(Self)` - The CV
    /// - `Err(ModelError::InputValidationError)` - If `n_features` is zero
    pub fn new(n_features: usize, harmonic: bool) -> Result<Self, ModelError> {
        if n_features == 0 {
            return Err(ModelError::InputValidationError(
                "Number of features must be greater than 0".to_string(),
            ));
        }
        Ok(LdaCv {
            name: if harmonic { "hlda_cv" } else { "lda_cv" },
            n_features,
            lda: LDA::new(harmonic),
        })
    }

    get_field!(get_name, name, &'static str);
    get_field!(get_n_features, n_features, usize);

    /// The underlying projector.
    pub fn get_lda(&self) -> &LDA {
        &self.lda
    }

    /// Sets the regularization added to the diagonal of the within-class scatter.
    pub fn set_regularization(&mut self, sw_reg: f64) -> Result<&mut Self, ModelError> {
        self.lda.set_regularization(sw_reg)?;
        Ok(self)
    }

    /// Sets the descriptor names used by `export_linear_formula`
    ///
    /// # Returns
    ///
    /// - `Ok(&mut Self)` - Reference to self
    /// - `Err(ModelError::InputValidationError)` - If the number of names is not `n_features`
    pub fn set_feature_names<S: Into<String>>(
        &mut self,
        names: Vec<S>,
    ) -> Result<&mut Self, ModelError> {
        if names.len() != self.n_features {
            return Err(ModelError::InputValidationError(format!(
                "Expected {} feature names, got {}",
                self.n_features,
                names.len()
            )));
        }
        self.lda.set_feature_names(names);
        Ok(self)
    }

    fn check_features(&self, x: ArrayView2<f64>) -> Result<(), ModelError> {
        if x.ncols() != self.n_features {
            return Err(ModelError::InputValidationError(format!(
                "{} expects {} features, got {}",
                self.name,
                self.n_features,
                x.ncols()
            )));
        }
        Ok(())
    }

    /// Fits the discriminant directions
    ///
    /// # Parameters
    ///
    /// - `x` - Descriptors, shape: (n_samples, n_features)
    /// - `y` - Class labels, shape: (n_samples,)
    ///
    /// # Returns
    ///
    /// - `Ok(&mut Self)` - Reference to self
    /// - `Err(ModelError)` - If the feature count is wrong or the LDA solve fails
    pub fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<i32>) -> Result<&mut Self, ModelError> {
        self.check_features(x)?;
        self.lda.fit(x, y)?;
        Ok(self)
    }

    /// Projects descriptors onto the fitted directions
    ///
    /// # Returns
    ///
    /// - `Ok(Array2<f64>)` - CV values, shape: (n_samples, n_components)
    /// - `Err(ModelError::NotFitted)` - Before `fit`
    pub fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>, ModelError> {
        self.check_features(x)?;
        self.lda.transform(x)
    }

    /// Fits on `x` and returns its projection.
    pub fn fit_transform(
        &mut self,
        x: ArrayView2<f64>,
        y: ArrayView1<i32>,
    ) -> Result<Array2<f64>, ModelError> {
        self.fit(x, y)?;
        self.transform(x)
    }

    /// PLUMED `COMBINE` definitions of the CV, see `LDA::export_linear_formula`.
    pub fn export_linear_formula(
        &self,
        feature_names: Option<&[&str]>,
    ) -> Result<String, ModelError> {
        self.lda.export_linear_formula(feature_names)
    }
}
