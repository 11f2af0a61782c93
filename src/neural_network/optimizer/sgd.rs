use super::*;
use ndarray::{Array2, Zip};

/// Stochastic Gradient Descent (SGD) optimizer.
///
/// Updates parameters in the direction of the negative gradient, scaled by the learning rate.
///
/// # Fields
///
/// * `learning_rate` - Learning rate controlling the size of parameter updates
///
/// # Example
/// ```rust
/// use lda_colvar::neural_network::*;
///
/// let optimizer = SGD::new(0.01).unwrap();
/// assert_eq!(optimizer.get_learning_rate(), 0.01);
/// assert!(SGD::new(-1.0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SGD {
    learning_rate: f32,
}

impl SGD {
    /// Creates a new SGD optimizer with the specified learning rate.
    ///
    /// # Parameters
    ///
    /// * `learning_rate` - Step size for parameter updates
    ///
    /// # Returns
    ///
    /// - `Ok(Self)` - A new SGD optimizer instance
    /// - `Err(ModelError::InputValidationError)` - If the learning rate is not positive and finite
    pub fn new(learning_rate: f32) -> Result<Self, ModelError> {
        validate_learning_rate(learning_rate)?;
        Ok(Self { learning_rate })
    }

    get_field!(get_learning_rate, learning_rate, f32);

    /// Updates weights and bias in parallel: `p -= lr * grad`
    ///
    /// # Parameters
    ///
    /// - `weights` - Weights to be updated
    /// - `weight_grads` - Weight gradients, same shape as `weights`
    /// - `bias` - Bias to be updated
    /// - `bias_grads` - Bias gradients, same shape as `bias`
    /// - `lr` - Learning rate
    pub fn update_sgd_parameters(
        weights: &mut Array2<f32>,
        weight_grads: &Array2<f32>,
        bias: &mut Array2<f32>,
        bias_grads: &Array2<f32>,
        lr: f32,
    ) {
        rayon::join(
            || {
                Zip::from(weights)
                    .and(weight_grads)
                    .par_for_each(|w, &g| *w -= g * lr)
            },
            || {
                Zip::from(bias)
                    .and(bias_grads)
                    .par_for_each(|b, &g| *b -= g * lr)
            },
        );
    }
}

impl Optimizer for SGD {
    fn step(&mut self, layers: &mut [Box<dyn Layer>]) {
        layers
            .par_iter_mut()
            .for_each(|layer| layer.update_parameters_sgd(self.learning_rate));
    }

    fn name(&self) -> &str {
        "SGD"
    }
}
