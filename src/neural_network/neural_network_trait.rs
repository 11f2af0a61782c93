use crate::ModelError;
use crate::neural_network::layer::{LayerParameters, LayerWeight};
use ndarray::Array2;

/// Defines the interface for neural network layers.
///
/// Layers operate on batches shaped (batch_size, features). `forward` caches what `backward`
/// needs; `infer` computes the same output without touching any cache. Gradients computed by
/// `backward` are stored in the layer until the next optimizer step consumes them.
pub trait Layer: Send + Sync {
    /// Performs forward propagation through the layer, caching intermediate values.
    ///
    /// # Parameters
    ///
    /// * `input` - Input batch, shape: (batch_size, input_dim)
    ///
    /// # Returns
    ///
    /// - `Ok(Array2<f32>)` - The output batch
    /// - `Err(ModelError::InputValidationError)` - If the input width does not match the layer
    fn forward(&mut self, input: &Array2<f32>) -> Result<Array2<f32>, ModelError>;

    /// Performs forward propagation without caching anything.
    fn infer(&self, input: &Array2<f32>) -> Result<Array2<f32>, ModelError>;

    /// Performs backward propagation through the layer.
    ///
    /// # Parameters
    ///
    /// * `grad_output` - Gradient with respect to the layer output
    ///
    /// # Returns
    ///
    /// - `Ok(Array2<f32>)` - Gradient with respect to the layer input
    /// - `Err(ModelError::ProcessingError)` - If `forward` has not been run
    fn backward(&mut self, grad_output: &Array2<f32>) -> Result<Array2<f32>, ModelError>;

    /// Returns the type name of the layer (e.g. "Dense").
    fn layer_type(&self) -> &str {
        "Unknown"
    }

    /// Returns a description of the output shape of the layer.
    fn output_shape(&self) -> String {
        "Unknown".to_string()
    }

    /// Returns the total number of trainable parameters in the layer.
    fn param_count(&self) -> usize;

    /// Updates the layer parameters using Stochastic Gradient Descent.
    ///
    /// # Parameters
    ///
    /// * `lr` - Learning rate for parameter updates
    fn update_parameters_sgd(&mut self, lr: f32);

    /// Updates the layer parameters using the Adam optimizer.
    ///
    /// # Parameters
    ///
    /// - `lr` - Learning rate for parameter updates
    /// - `beta1` - Exponential decay rate for the first moment estimates
    /// - `beta2` - Exponential decay rate for the second moment estimates
    /// - `epsilon` - Small constant for numerical stability
    /// - `t` - Current optimizer step, starting at 1
    fn update_parameters_adam(&mut self, lr: f32, beta1: f32, beta2: f32, epsilon: f32, t: u64);

    /// Returns references to the weights of the layer.
    fn get_weights(&self) -> LayerWeight<'_>;

    /// Replaces the weights of the layer with a snapshot.
    ///
    /// # Returns
    ///
    /// - `Ok(())` - Weights were applied
    /// - `Err(ModelError::InputValidationError)` - If the snapshot does not fit this layer
    fn set_weights(&mut self, params: &LayerParameters) -> Result<(), ModelError>;
}

/// Defines the interface for optimization algorithms.
pub trait Optimizer: Send + Sync {
    /// Applies one optimization step to every layer, using the gradients stored by `backward`.
    ///
    /// # Parameters
    ///
    /// * `layers` - The layers whose parameters should be updated
    fn step(&mut self, layers: &mut [Box<dyn Layer>]);

    /// Name of the algorithm, used in summaries.
    fn name(&self) -> &str;
}
