pub use crate::neural_network::activation::Activation;
pub use crate::neural_network::early_stopping::EarlyStopping;
pub use crate::neural_network::feature_network::{FeatureNetwork, NetworkParameters};
pub use crate::neural_network::layer::{Dense, DenseLayerWeight, LayerParameters, LayerWeight};
pub use crate::neural_network::neural_network_trait::{Layer, Optimizer};
pub use crate::neural_network::optimizer::{Adam, AdamStates, SGD};
