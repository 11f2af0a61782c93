use ndarray::Array2;

/// Container for borrowed layer weights
///
/// # Variants
///
/// - `Dense` - Contains weights for dense (fully connected) layers
#[derive(Debug)]
pub enum LayerWeight<'a> {
    Dense(DenseLayerWeight<'a>),
}

/// Weights for a dense (fully connected) neural network layer
///
/// # Fields
///
/// - `weight` - Weight matrix with shape (input_features, output_features)
/// - `bias` - Bias vector with shape (1, output_features)
#[derive(Debug)]
pub struct DenseLayerWeight<'a> {
    pub weight: &'a Array2<f32>,
    pub bias: &'a Array2<f32>,
}

/// Owned snapshot of the weights of one layer
///
/// Used to checkpoint and restore a network, e.g. by early stopping.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerParameters {
    Dense {
        weight: Array2<f32>,
        bias: Array2<f32>,
    },
}

impl LayerWeight<'_> {
    /// Copies the borrowed weights into an owned snapshot.
    pub fn to_parameters(&self) -> LayerParameters {
        match self {
            LayerWeight::Dense(w) => LayerParameters::Dense {
                weight: w.weight.clone(),
                bias: w.bias.clone(),
            },
        }
    }
}

impl LayerParameters {
    /// Number of scalar parameters in the snapshot.
    pub fn len(&self) -> usize {
        match self {
            LayerParameters::Dense { weight, bias } => weight.len() + bias.len(),
        }
    }

    /// Whether the snapshot holds no parameters.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether both snapshots have the same array shapes.
    pub fn same_shape(&self, other: &LayerParameters) -> bool {
        match (self, other) {
            (
                LayerParameters::Dense { weight, bias },
                LayerParameters::Dense {
                    weight: other_weight,
                    bias: other_bias,
                },
            ) => weight.dim() == other_weight.dim() && bias.dim() == other_bias.dim(),
        }
    }
}
