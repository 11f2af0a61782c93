/// Deep-LDA: neural-network features trained to maximize the Fisher discriminant
pub mod deep_lda_cv;
/// Eigenvalue loss with Lorentzian output regularization
pub mod discriminant_loss;
/// Linear LDA / HLDA collective variable
pub mod lda_cv;
/// Fixed-width console log of training epochs
pub mod training_log;

pub use deep_lda_cv::*;
pub use discriminant_loss::*;
pub use lda_cv::*;
pub use training_log::*;

use crate::ModelError;
use crate::utility::linear_discriminant_analysis::{DiscriminantSolution, LDA};
use ndarray::{Array2, ArrayView1, ArrayView2};
