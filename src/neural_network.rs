/// Module that contains activation function implementations
pub mod activation;
/// Module that contains patience-based early stopping
pub mod early_stopping;
/// Module that contains the feed-forward feature network used by Deep-LDA
pub mod feature_network;
/// Module that contains neural network layer implementations
pub mod layer;
/// Module that contains the layer and optimizer traits
pub mod neural_network_trait;
/// Module that contains optimization algorithms for neural network training
pub mod optimizer;

pub use activation::*;
pub use early_stopping::*;
pub use feature_network::*;
pub use layer::*;
pub use neural_network_trait::*;
pub use optimizer::*;

use crate::ModelError;
