/// Adam optimizer and its per-layer moment estimates
pub mod adam;
/// Shared validation of optimizer hyperparameters
mod input_validation_function;
/// Stochastic Gradient Descent optimizer
pub mod sgd;

pub use adam::*;
pub use sgd::*;

use crate::ModelError;
use crate::neural_network::{Layer, Optimizer};
use input_validation_function::*;
use rayon::prelude::*;
