/// Error types that can occur during model operations
///
/// # Variants
///
/// - `NotFitted` - Indicates that the model has not been fitted yet
/// - `InputValidationError` - indicates the input data provided does not meet the expected format, type, or validation rules
/// - `ProcessingError` - indicates that there is something wrong while processing
/// - `InvalidClassCount` - fewer than two distinct class labels were presented to the discriminant solver
/// - `InsufficientSamples` - a class contributes fewer than two samples to scatter estimation
/// - `NonPositiveDefinite` - the (regularized) within-class scatter matrix cannot be Cholesky-decomposed or inverted
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    NotFitted,
    InputValidationError(String),
    ProcessingError(String),
    InvalidClassCount(usize),
    InsufficientSamples { class: i32, count: usize },
    NonPositiveDefinite(String),
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::NotFitted => {
                write!(
                    f,
                    "Model has not been fitted. Certain methods require the model to be fitted before use."
                )
            }
            ModelError::InputValidationError(msg) => write!(f, "Input validation error: {}", msg),
            ModelError::ProcessingError(msg) => write!(f, "Processing error: {}", msg),
            ModelError::InvalidClassCount(n_classes) => write!(
                f,
                "Invalid class count: discriminant analysis needs at least 2 classes, got {}",
                n_classes
            ),
            ModelError::InsufficientSamples { class, count } => write!(
                f,
                "Insufficient samples: class {} has {} sample(s), at least 2 are required",
                class, count
            ),
            ModelError::NonPositiveDefinite(msg) => {
                write!(f, "Matrix is not positive definite: {}", msg)
            }
        }
    }
}

impl std::error::Error for ModelError {}
