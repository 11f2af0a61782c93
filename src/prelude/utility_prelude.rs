pub use crate::utility::generalized_eigen::{EigenSolution, solve_generalized_eigen};
pub use crate::utility::linear_discriminant_analysis::{
    DEFAULT_SW_REG, DiscriminantSolution, LDA, LdaParam,
};
pub use crate::utility::scatter_matrix::{ScatterMatrices, ScatterMatrixEstimator};
pub use crate::utility::standardize::{InputStandardization, ScalingMode};
