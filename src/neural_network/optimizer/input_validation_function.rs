use super::*;

/// Builds the error reported for an out-of-range hyperparameter.
fn out_of_range(param_name: &str, requirement: &str, value: f32) -> ModelError {
    ModelError::InputValidationError(format!(
        "{} must be {}, got {}",
        param_name, requirement, value
    ))
}

/// Validates that the learning rate is positive and finite.
///
/// # Returns
///
/// - `Ok(())` if the learning rate is positive and finite
/// - `Err(ModelError::InputValidationError)` otherwise
pub(super) fn validate_learning_rate(learning_rate: f32) -> Result<(), ModelError> {
    if learning_rate > 0.0 && learning_rate.is_finite() {
        Ok(())
    } else {
        Err(out_of_range(
            "learning_rate",
            "positive and finite",
            learning_rate,
        ))
    }
}

/// Validates that an Adam decay rate lies in [0, 1).
///
/// # Parameters
///
/// - `value` - The decay rate value to validate
/// - `param_name` - `beta1` or `beta2`, used in the error message
pub(super) fn validate_decay_rate(value: f32, param_name: &str) -> Result<(), ModelError> {
    if (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(out_of_range(param_name, "in range [0, 1)", value))
    }
}

/// Validates that epsilon is positive and finite.
pub(super) fn validate_epsilon(epsilon: f32) -> Result<(), ModelError> {
    if epsilon > 0.0 && epsilon.is_finite() {
        Ok(())
    } else {
        Err(out_of_range("epsilon", "positive and finite", epsilon))
    }
}
