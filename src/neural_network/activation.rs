use super::*;
use ndarray::{Array2, Zip};

/// Activation function enum, supporting ReLU, ELU, Tanh, Sigmoid, Softplus and Linear
///
/// ELU uses `alpha = 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    ReLU,
    ELU,
    Tanh,
    Sigmoid,
    Softplus,
    Linear,
}

impl Activation {
    /// Parses an activation from its lowercase name
    ///
    /// # Parameters
    ///
    /// * `name` - One of `relu`, `elu`, `tanh`, `sigmoid`, `softplus`, `linear` (case-insensitive)
    ///
    /// # Returns
    ///
    /// - `Ok(Activation)` - The parsed activation
    /// - `Err(ModelError::InputValidationError)` - If the name is unknown
    pub fn from_name(name: &str) -> Result<Self, ModelError> {
        match name.to_ascii_lowercase().as_str() {
            "relu" => Ok(Activation::ReLU),
            "elu" => Ok(Activation::ELU),
            "tanh" => Ok(Activation::Tanh),
            "sigmoid" => Ok(Activation::Sigmoid),
            "softplus" => Ok(Activation::Softplus),
            "linear" => Ok(Activation::Linear),
            _ => Err(ModelError::InputValidationError(format!(
                "Unknown activation function '{}'",
                name
            ))),
        }
    }

    /// Lowercase name of the activation.
    pub fn name(&self) -> &'static str {
        match self {
            Activation::ReLU => "relu",
            Activation::ELU => "elu",
            Activation::Tanh => "tanh",
            Activation::Sigmoid => "sigmoid",
            Activation::Softplus => "softplus",
            Activation::Linear => "linear",
        }
    }

    /// Forward application of activation functions
    ///
    /// # Parameters
    ///
    /// * `z` - Pre-activation values
    ///
    /// # Returns
    ///
    /// * `Array2<f32>` - A new array with the activation function applied
    pub fn apply(&self, z: &Array2<f32>) -> Array2<f32> {
        let mut result = z.clone();
        match self {
            Activation::ReLU => result.par_mapv_inplace(|x| if x > 0.0 { x } else { 0.0 }),
            Activation::ELU => result.par_mapv_inplace(|x| if x > 0.0 { x } else { x.exp_m1() }),
            Activation::Tanh => result.par_mapv_inplace(|x| x.tanh()),
            Activation::Sigmoid => result.par_mapv_inplace(|x| 1.0 / (1.0 + (-x).exp())),
            // max(x, 0) + ln(1 + e^{-|x|}) does not overflow for large x
            Activation::Softplus => {
                result.par_mapv_inplace(|x| x.max(0.0) + (-x.abs()).exp().ln_1p())
            }
            Activation::Linear => {}
        }
        result
    }

    /// Derivative of the activation, expressed through its output
    ///
    /// # Parameters
    ///
    /// * `activation_output` - The output after the activation function has been applied
    ///
    /// # Returns
    ///
    /// * `Array2<f32>` - Element-wise derivative `da/dz`
    pub fn derivative(&self, activation_output: &Array2<f32>) -> Array2<f32> {
        match self {
            Activation::ReLU => activation_output.mapv(|a| if a > 0.0 { 1.0 } else { 0.0 }),
            Activation::ELU => activation_output.mapv(|a| if a > 0.0 { 1.0 } else { a + 1.0 }),
            Activation::Tanh => activation_output.mapv(|a| 1.0 - a * a),
            Activation::Sigmoid => activation_output.mapv(|a| a * (1.0 - a)),
            // softplus' = sigmoid(z) = 1 - e^{-a}
            Activation::Softplus => activation_output.mapv(|a| -(-a).exp_m1()),
            Activation::Linear => Array2::ones(activation_output.dim()),
        }
    }

    /// Chain rule through the activation: `upstream ⊙ da/dz`
    ///
    /// # Parameters
    ///
    /// - `activation_output` - The output after the activation function has been applied
    /// - `upstream` - Gradient with respect to the activation output
    ///
    /// # Returns
    ///
    /// * `Array2<f32>` - Gradient with respect to the pre-activation values
    pub fn backward(&self, activation_output: &Array2<f32>, upstream: &Array2<f32>) -> Array2<f32> {
        if *self == Activation::Linear {
            return upstream.clone();
        }
        let mut grad = self.derivative(activation_output);
        Zip::from(&mut grad)
            .and(upstream)
            .par_for_each(|d, &g| *d *= g);
        grad
    }
}
