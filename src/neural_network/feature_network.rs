use super::*;
use ndarray::Array2;

/// Snapshot of every layer's weights, in layer order.
pub type NetworkParameters = Vec<LayerParameters>;

/// Feed-forward network mapping raw inputs to the features fed to LDA.
///
/// Built from a list of layer sizes `[d_in, h_1, ..., d_out]`: one `Dense` layer per
/// consecutive pair, with the hidden activation after every layer except the last, which is
/// linear. Training goes through `forward` → `backward` → `apply_optimizer`; `infer` is the
/// cache-free forward pass used for evaluation.
///
/// # Example
/// ```rust
/// use lda_colvar::neural_network::*;
/// use ndarray::Array2;
///
/// let mut network = FeatureNetwork::new(&[3, 5, 2], Activation::ReLU, Some(1)).unwrap();
/// assert_eq!(network.param_count(), 3 * 5 + 5 + 5 * 2 + 2);
///
/// let x = Array2::<f32>::zeros((4, 3));
/// let h = network.forward(&x).unwrap();
/// let grad_x = network.backward(&Array2::ones(h.dim())).unwrap();
/// assert_eq!(grad_x.dim(), (4, 3));
///
/// let mut optimizer = SGD::new(0.1).unwrap();
/// network.apply_optimizer(&mut optimizer);
/// ```
pub struct FeatureNetwork {
    layers: Vec<Box<dyn Layer>>,
    layer_sizes: Vec<usize>,
    activation: Activation,
}

impl FeatureNetwork {
    /// Creates a new network
    ///
    /// # Parameters
    ///
    /// - `layer_sizes` - Number of units per layer, input first; at least two entries, all positive
    /// - `activation` - Activation used after every hidden layer
    /// - `seed` - Seed for weight initialization; layer `i` is seeded with `seed + i`
    ///
    /// # Returns
    ///
    /// - `Ok(Self)` - The initialized network
    /// - `Err(ModelError::InputValidationError)` - If `layer_sizes` is too short or contains a zero
    pub fn new(
        layer_sizes: &[usize],
        activation: Activation,
        seed: Option<u64>,
    ) -> Result<Self, ModelError> {
        if layer_sizes.len() < 2 {
            return Err(ModelError::InputValidationError(format!(
                "At least an input and an output size are required, got {:?}",
                layer_sizes
            )));
        }
        if layer_sizes.contains(&0) {
            return Err(ModelError::InputValidationError(format!(
                "Layer sizes must be greater than 0, got {:?}",
                layer_sizes
            )));
        }

        let n_layers = layer_sizes.len() - 1;
        let mut layers: Vec<Box<dyn Layer>> = Vec::with_capacity(n_layers);
        for (i, pair) in layer_sizes.windows(2).enumerate() {
            let layer_activation = if i + 1 == n_layers {
                Activation::Linear
            } else {
                activation
            };
            let layer_seed = seed.map(|s| s.wrapping_add(i as u64));
            layers.push(Box::new(Dense::new(
                pair[0],
                pair[1],
                layer_activation,
                layer_seed,
            )?));
        }

        Ok(FeatureNetwork {
            layers,
            layer_sizes: layer_sizes.to_vec(),
            activation,
        })
    }

    get_field!(get_activation, activation, Activation);

    /// Sizes the network was built with, input first.
    pub fn get_layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    /// Number of input features.
    pub fn n_inputs(&self) -> usize {
        self.layer_sizes[0]
    }

    /// Number of output features.
    pub fn n_outputs(&self) -> usize {
        self.layer_sizes[self.layer_sizes.len() - 1]
    }

    /// Number of dense layers.
    pub fn n_layers(&self) -> usize {
        self.layers.len()
    }

    /// Total number of trainable parameters.
    pub fn param_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.param_count()).sum()
    }

    /// Forward pass that caches activations for `backward`
    ///
    /// # Parameters
    ///
    /// * `x` - Input batch, shape: (batch_size, n_inputs)
    ///
    /// # Returns
    ///
    /// - `Ok(Array2<f32>)` - Network output, shape: (batch_size, n_outputs)
    /// - `Err(ModelError::InputValidationError)` - If the input width is wrong
    pub fn forward(&mut self, x: &Array2<f32>) -> Result<Array2<f32>, ModelError> {
        let mut output = x.clone();
        for layer in self.layers.iter_mut() {
            output = layer.forward(&output)?;
        }
        Ok(output)
    }

    /// Forward pass without caching, for evaluation.
    pub fn infer(&self, x: &Array2<f32>) -> Result<Array2<f32>, ModelError> {
        let mut output = x.clone();
        for layer in self.layers.iter() {
            output = layer.infer(&output)?;
        }
        Ok(output)
    }

    /// Back-propagates a gradient on the network output, storing parameter gradients
    ///
    /// # Parameters
    ///
    /// * `grad_output` - Gradient with respect to the output of the last `forward`
    ///
    /// # Returns
    ///
    /// - `Ok(Array2<f32>)` - Gradient with respect to the network input
    /// - `Err(ModelError::ProcessingError)` - If `forward` has not been run
    pub fn backward(&mut self, grad_output: &Array2<f32>) -> Result<Array2<f32>, ModelError> {
        let mut grad = grad_output.clone();
        for layer in self.layers.iter_mut().rev() {
            grad = layer.backward(&grad)?;
        }
        Ok(grad)
    }

    /// Applies one optimizer step using the stored gradients.
    pub fn apply_optimizer(&mut self, optimizer: &mut dyn Optimizer) {
        optimizer.step(&mut self.layers);
    }

    /// Owned snapshot of all weights.
    pub fn parameters(&self) -> NetworkParameters {
        self.layers
            .iter()
            .map(|layer| layer.get_weights().to_parameters())
            .collect()
    }

    /// Restores weights from a snapshot taken with `parameters`
    ///
    /// # Returns
    ///
    /// - `Ok(())` - All layers were updated
    /// - `Err(ModelError::InputValidationError)` - If the snapshot does not match the architecture;
    ///   no layer is modified in that case
    pub fn set_parameters(&mut self, params: &NetworkParameters) -> Result<(), ModelError> {
        if params.len() != self.layers.len() {
            return Err(ModelError::InputValidationError(format!(
                "Snapshot has {} layers, network has {}",
                params.len(),
                self.layers.len()
            )));
        }
        let matches = self
            .layers
            .iter()
            .zip(params.iter())
            .all(|(layer, p)| layer.get_weights().to_parameters().same_shape(p));
        if !matches {
            return Err(ModelError::InputValidationError(
                "Snapshot layer sizes do not match the network".to_string(),
            ));
        }

        for (layer, p) in self.layers.iter_mut().zip(params.iter()) {
            layer.set_weights(p)?;
        }
        Ok(())
    }

    /// Prints a summary table of the layers
    pub fn summary(&self) {
        let col1_width = 33;
        let col2_width = 24;
        let col3_width = 15;
        println!("Model: \"feature_network\"");
        println!(
            "┏{}┳{}┳{}┓",
            "━".repeat(col1_width),
            "━".repeat(col2_width),
            "━".repeat(col3_width)
        );
        println!(
            "┃ {:<31} ┃ {:<22} ┃ {:>13} ┃",
            "Layer (type)", "Output Shape", "Param #"
        );
        println!(
            "┡{}╇{}╇{}┩",
            "━".repeat(col1_width),
            "━".repeat(col2_width),
            "━".repeat(col3_width)
        );

        for (i, layer) in self.layers.iter().enumerate() {
            println!(
                "│ {:<31} │ {:<22} │ {:>13} │",
                format!("dense_{} ({})", i, layer.layer_type()),
                layer.output_shape(),
                layer.param_count()
            );
        }
        println!(
            "└{}┴{}┴{}┘",
            "─".repeat(col1_width),
            "─".repeat(col2_width),
            "─".repeat(col3_width)
        );
        println!(
            " Total params: {} | Activation: {}",
            self.param_count(),
            self.activation.name()
        );
    }
}
