use crate::ModelError;
use crate::neural_network::layer::{DenseLayerWeight, LayerParameters, LayerWeight};
use crate::neural_network::optimizer::*;
use crate::neural_network::{Activation, Layer};
use ndarray::{Array, Array2, Axis};
use ndarray_rand::RandomExt;
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand::rngs::StdRng;
use ndarray_rand::rand_distr::Uniform;

/// Dense (Fully Connected) layer implementation for neural networks.
///
/// Computes `output = activation(input · weights + bias)`. Weights are drawn uniformly from
/// `[-1/√input_dim, 1/√input_dim]`, biases start at zero.
///
/// # Dimensions
///
/// - Input shape: (batch_size, input_dim)
/// - Output shape: (batch_size, output_dim)
///
/// # Fields
/// ## Core fields
/// - `input_dim` - Input dimension size
/// - `output_dim` - Output dimension size
/// - `weights` - Weight matrix with shape (input_dim, output_dim)
/// - `bias` - Bias vector with shape (1, output_dim)
/// - `activation` - Activation function for the layer
///
/// ## Cache
/// - `input_cache` - Input of the last `forward`, used by `backward`
/// - `activation_output` - Output of the last `forward`, used by `backward`
/// - `grad_weights` - Stored weight gradients
/// - `grad_bias` - Stored bias gradients
/// - `adam_states` - Adam moment estimates, created on the first Adam step
///
/// # Example
/// ```rust
/// use lda_colvar::neural_network::*;
/// use ndarray::Array2;
///
/// let mut layer = Dense::new(4, 3, Activation::Tanh, Some(42)).unwrap();
/// let x = Array2::<f32>::ones((2, 4));
/// let out = layer.forward(&x).unwrap();
/// assert_eq!(out.dim(), (2, 3));
///
/// let grad_in = layer.backward(&Array2::ones((2, 3))).unwrap();
/// assert_eq!(grad_in.dim(), (2, 4));
/// ```
pub struct Dense {
    input_dim: usize,
    output_dim: usize,
    weights: Array2<f32>,
    bias: Array2<f32>,
    activation: Activation,
    input_cache: Option<Array2<f32>>,
    activation_output: Option<Array2<f32>>,
    grad_weights: Option<Array2<f32>>,
    grad_bias: Option<Array2<f32>>,
    adam_states: Option<AdamStates>,
}

impl Dense {
    /// Creates a new dense layer
    ///
    /// # Parameters
    ///
    /// - `input_dim` - Number of input features
    /// - `output_dim` - Number of output units
    /// - `activation` - Activation applied to the affine output
    /// - `seed` - Seed for the weight initialization; `None` draws from system entropy
    ///
    /// # Returns
    ///
    /// - `Ok(Self)` - A new Dense layer instance
    /// - `Err(ModelError::InputValidationError)` - If either dimension is zero
    pub fn new(
        input_dim: usize,
        output_dim: usize,
        activation: Activation,
        seed: Option<u64>,
    ) -> Result<Self, ModelError> {
        if input_dim == 0 || output_dim == 0 {
            return Err(ModelError::InputValidationError(format!(
                "Dense layer dimensions must be greater than 0, got ({}, {})",
                input_dim, output_dim
            )));
        }

        let bound = 1.0 / (input_dim as f32).sqrt();
        let distribution = Uniform::new(-bound, bound);
        let weights = match seed {
            Some(seed) => {
                let mut rng = StdRng::seed_from_u64(seed);
                Array::random_using((input_dim, output_dim), distribution, &mut rng)
            }
            None => Array::random((input_dim, output_dim), distribution),
        };
        let bias = Array2::zeros((1, output_dim));

        Ok(Self {
            input_dim,
            output_dim,
            weights,
            bias,
            activation,
            input_cache: None,
            activation_output: None,
            grad_weights: None,
            grad_bias: None,
            adam_states: None,
        })
    }

    get_field!(get_input_dim, input_dim, usize);
    get_field!(get_output_dim, output_dim, usize);
    get_field!(get_activation, activation, Activation);
    get_field_as_ref!(get_grad_weights, grad_weights, Option<&Array2<f32>>);
    get_field_as_ref!(get_grad_bias, grad_bias, Option<&Array2<f32>>);

    fn check_input(&self, input: &Array2<f32>) -> Result<(), ModelError> {
        if input.ncols() != self.input_dim {
            return Err(ModelError::InputValidationError(format!(
                "Dense layer expects {} input features, got {}",
                self.input_dim,
                input.ncols()
            )));
        }
        Ok(())
    }

    fn affine(&self, input: &Array2<f32>) -> Array2<f32> {
        input.dot(&self.weights) + &self.bias
    }
}

impl Layer for Dense {
    fn forward(&mut self, input: &Array2<f32>) -> Result<Array2<f32>, ModelError> {
        self.check_input(input)?;
        let a = self.activation.apply(&self.affine(input));
        self.input_cache = Some(input.clone());
        self.activation_output = Some(a.clone());
        Ok(a)
    }

    fn infer(&self, input: &Array2<f32>) -> Result<Array2<f32>, ModelError> {
        self.check_input(input)?;
        Ok(self.activation.apply(&self.affine(input)))
    }

    fn backward(&mut self, grad_output: &Array2<f32>) -> Result<Array2<f32>, ModelError> {
        let (input, a) = match (self.input_cache.take(), self.activation_output.take()) {
            (Some(input), Some(a)) => (input, a),
            _ => {
                return Err(ModelError::ProcessingError(String::from(
                    "Forward pass has not been run",
                )));
            }
        };
        if grad_output.dim() != a.dim() {
            return Err(ModelError::InputValidationError(format!(
                "Gradient shape {:?} does not match layer output shape {:?}",
                grad_output.dim(),
                a.dim()
            )));
        }

        // dL/dz = dL/da ⊙ da/dz
        let delta = self.activation.backward(&a, grad_output);

        self.grad_weights = Some(input.t().dot(&delta));
        self.grad_bias = Some(delta.sum_axis(Axis(0)).insert_axis(Axis(0)));

        Ok(delta.dot(&self.weights.t()))
    }

    fn layer_type(&self) -> &str {
        "Dense"
    }

    fn output_shape(&self) -> String {
        format!("(None, {})", self.output_dim)
    }

    fn param_count(&self) -> usize {
        self.input_dim * self.output_dim + self.output_dim
    }

    fn update_parameters_sgd(&mut self, lr: f32) {
        if let (Some(grad_w), Some(grad_b)) = (&self.grad_weights, &self.grad_bias) {
            SGD::update_sgd_parameters(&mut self.weights, grad_w, &mut self.bias, grad_b, lr);
        }
    }

    fn update_parameters_adam(&mut self, lr: f32, beta1: f32, beta2: f32, epsilon: f32, t: u64) {
        if let (Some(grad_w), Some(grad_b)) = (&self.grad_weights, &self.grad_bias) {
            let dims_w = (self.input_dim, self.output_dim);
            let dims_b = (1, self.output_dim);
            let adam_states = self
                .adam_states
                .get_or_insert_with(|| AdamStates::new(dims_w, dims_b));

            let (w_update, b_update) =
                adam_states.update_parameter(grad_w, grad_b, beta1, beta2, epsilon, t, lr);

            self.weights -= &w_update;
            self.bias -= &b_update;
        }
    }

    fn get_weights(&self) -> LayerWeight<'_> {
        LayerWeight::Dense(DenseLayerWeight {
            weight: &self.weights,
            bias: &self.bias,
        })
    }

    fn set_weights(&mut self, params: &LayerParameters) -> Result<(), ModelError> {
        match params {
            LayerParameters::Dense { weight, bias }
                if weight.dim() == self.weights.dim() && bias.dim() == self.bias.dim() =>
            {
                self.weights.assign(weight);
                self.bias.assign(bias);
                Ok(())
            }
            _ => Err(ModelError::InputValidationError(format!(
                "Parameters do not fit a Dense layer with weights {:?} and bias {:?}",
                self.weights.dim(),
                self.bias.dim()
            ))),
        }
    }
}
