use super::*;

/// Defines how each input column is rescaled
///
/// # Variants
///
/// - `MeanStd` - Subtract the column mean and divide by the column standard deviation
/// - `Range` - Subtract the column midpoint and divide by half the column range, mapping onto [-1, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalingMode {
    #[default]
    MeanStd,
    Range,
}

/// Per-column input standardization, fitted once and then reapplied
///
/// Columns with zero spread are only shifted (their scale is set to 1), so constant inputs
/// never produce NaN.
///
/// # Fields
///
/// - `mode` - How the offset and scale are computed
/// - `offset` - Value subtracted from each column
/// - `scale` - Value each shifted column is divided by
///
/// # Example
/// ```rust
/// use lda_colvar::utility::{InputStandardization, ScalingMode};
/// use ndarray::array;
///
/// let x = array![[1.0, 10.0], [3.0, 10.0], [5.0, 10.0]];
/// let mut scaler = InputStandardization::new(ScalingMode::MeanStd);
/// let scaled = scaler.fit_transform(x.view()).unwrap();
/// assert!((scaled[[0, 0]] + 1.224744871391589).abs() < 1e-12);
/// assert_eq!(scaled[[0, 1]], 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct InputStandardization {
    mode: ScalingMode,
    offset: Option<Array1<f64>>,
    scale: Option<Array1<f64>>,
}

impl Default for InputStandardization {
    fn default() -> Self {
        Self::new(ScalingMode::default())
    }
}

impl InputStandardization {
    /// Creates an unfitted standardization.
    pub fn new(mode: ScalingMode) -> Self {
        InputStandardization {
            mode,
            offset: None,
            scale: None,
        }
    }

    get_field!(get_mode, mode, ScalingMode);
    get_field_as_ref!(get_offset, offset, Option<&Array1<f64>>);
    get_field_as_ref!(get_scale, scale, Option<&Array1<f64>>);

    /// Whether `fit` has been called.
    pub fn is_fitted(&self) -> bool {
        self.offset.is_some() && self.scale.is_some()
    }

    /// Computes per-column offset and scale from the data
    ///
    /// # Parameters
    ///
    /// * `x` - Data matrix, shape: (n_samples, n_features)
    ///
    /// # Returns
    ///
    /// - `Ok(&mut Self)` - Reference to self
    /// - `Err(ModelError::InputValidationError)` - If the data is empty or contains NaN/inf
    pub fn fit(&mut self, x: ArrayView2<f64>) -> Result<&mut Self, ModelError> {
        if x.is_empty() {
            return Err(ModelError::InputValidationError(
                "Cannot standardize empty array".to_string(),
            ));
        }
        if x.iter().any(|&v| !v.is_finite()) {
            return Err(ModelError::InputValidationError(
                "Input contains NaN or infinite values".to_string(),
            ));
        }

        let mode = self.mode;
        let n = x.nrows() as f64;
        let columns: Vec<ArrayView1<f64>> = x.columns().into_iter().collect();
        let stats: Vec<(f64, f64)> = columns
            .par_iter()
            .map(|column| match mode {
                ScalingMode::MeanStd => {
                    let mean = column.sum() / n;
                    let variance = column.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / n;
                    (mean, variance.sqrt())
                }
                ScalingMode::Range => {
                    let min = column.iter().copied().fold(f64::INFINITY, f64::min);
                    let max = column.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                    ((max + min) / 2.0, (max - min) / 2.0)
                }
            })
            .collect();

        let offset = Array1::from_iter(stats.iter().map(|&(offset, _)| offset));
        let scale = Array1::from_iter(
            stats
                .iter()
                .map(|&(_, spread)| if spread > 0.0 { spread } else { 1.0 }),
        );

        self.offset = Some(offset);
        self.scale = Some(scale);
        Ok(self)
    }

    /// Applies the fitted offset and scale
    ///
    /// # Parameters
    ///
    /// * `x` - Data matrix with the same number of columns as the fitting data
    ///
    /// # Returns
    ///
    /// - `Ok(Array2<f64>)` - Standardized copy of `x`
    /// - `Err(ModelError::NotFitted)` - If `fit` has not been called
    /// - `Err(ModelError::InputValidationError)` - If the number of columns differs
    pub fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>, ModelError> {
        let (offset, scale) = match (&self.offset, &self.scale) {
            (Some(offset), Some(scale)) => (offset, scale),
            _ => return Err(ModelError::NotFitted),
        };
        if x.ncols() != offset.len() {
            return Err(ModelError::InputValidationError(format!(
                "Expected {} columns, got {}",
                offset.len(),
                x.ncols()
            )));
        }

        Ok((&x - offset) / scale)
    }

    /// Fits on `x` and returns the standardized data.
    pub fn fit_transform(&mut self, x: ArrayView2<f64>) -> Result<Array2<f64>, ModelError> {
        self.fit(x)?;
        self.transform(x)
    }
}
