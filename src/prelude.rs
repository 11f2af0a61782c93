/// Prelude module for utility functions.
#[cfg(feature = "utility")]
pub mod utility_prelude;
/// Prelude module for neural network components.
#[cfg(feature = "neural_network")]
pub mod neural_network_prelude;
/// Prelude module for collective variables.
#[cfg(feature = "collective_variable")]
pub mod collective_variable_prelude;

pub use crate::error::ModelError;
#[cfg(feature = "collective_variable")]
pub use collective_variable_prelude::*;
#[cfg(feature = "neural_network")]
pub use neural_network_prelude::*;
#[cfg(feature = "utility")]
pub use utility_prelude::*;
