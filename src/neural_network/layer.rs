/// Dense (fully connected) layer
pub mod dense;
/// Borrowed and owned views of layer weights
pub mod layer_weight;

pub use dense::*;
pub use layer_weight::*;
