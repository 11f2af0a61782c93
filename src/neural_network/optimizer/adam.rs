use super::*;
use ndarray::Array2;

/// Adam optimizer implementation.
///
/// Computes individual adaptive learning rates for every parameter from bias-corrected
/// estimates of the first and second moments of the gradients. The step counter `t` is
/// advanced once per `step`, before any layer is updated.
///
/// # Fields
///
/// - `learning_rate` - Learning rate controlling the size of parameter updates
/// - `beta1` - Exponential decay rate for the first moment estimates
/// - `beta2` - Exponential decay rate for the second moment estimates
/// - `epsilon` - Small constant added for numerical stability
/// - `t` - Number of steps taken so far
///
/// # Example
/// ```rust
/// use lda_colvar::neural_network::*;
///
/// let adam = Adam::new(1e-3, 0.9, 0.999, 1e-8).unwrap();
/// assert_eq!(adam.get_t(), 0);
/// assert!(Adam::new(1e-3, 1.0, 0.999, 1e-8).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    t: u64,
}

/// `Adam` with learning rate `1e-3`, betas `(0.9, 0.999)` and epsilon `1e-8`.
impl Default for Adam {
    fn default() -> Self {
        Self {
            learning_rate: 1e-3,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            t: 0,
        }
    }
}

impl Adam {
    /// Creates a new Adam optimizer with the specified parameters.
    ///
    /// # Parameters
    ///
    /// - `learning_rate` - Step size for parameter updates
    /// - `beta1` - Decay rate for the first moment estimates (typically 0.9)
    /// - `beta2` - Decay rate for the second moment estimates (typically 0.999)
    /// - `epsilon` - Small constant for numerical stability (typically 1e-8)
    ///
    /// # Returns
    ///
    /// - `Ok(Self)` - A new Adam optimizer instance
    /// - `Err(ModelError::InputValidationError)` - If any hyperparameter is out of range
    pub fn new(
        learning_rate: f32,
        beta1: f32,
        beta2: f32,
        epsilon: f32,
    ) -> Result<Self, ModelError> {
        validate_learning_rate(learning_rate)?;
        validate_decay_rate(beta1, "beta1")?;
        validate_decay_rate(beta2, "beta2")?;
        validate_epsilon(epsilon)?;

        Ok(Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            t: 0,
        })
    }

    get_field!(get_learning_rate, learning_rate, f32);
    get_field!(get_beta1, beta1, f32);
    get_field!(get_beta2, beta2, f32);
    get_field!(get_epsilon, epsilon, f32);
    get_field!(get_t, t, u64);
}

impl Optimizer for Adam {
    fn step(&mut self, layers: &mut [Box<dyn Layer>]) {
        self.t += 1;
        let (lr, beta1, beta2, epsilon, t) =
            (self.learning_rate, self.beta1, self.beta2, self.epsilon, self.t);
        layers
            .par_iter_mut()
            .for_each(|layer| layer.update_parameters_adam(lr, beta1, beta2, epsilon, t));
    }

    fn name(&self) -> &str {
        "Adam"
    }
}

/// Moment estimates kept by one layer for the Adam optimizer.
///
/// # Fields
///
/// - `m` - First moment (moving average of gradients) of the weights
/// - `v` - Second moment (moving average of squared gradients) of the weights
/// - `m_bias` - First moment of the bias
/// - `v_bias` - Second moment of the bias
#[derive(Debug, Clone, Default)]
pub struct AdamStates {
    pub m: Array2<f32>,
    pub v: Array2<f32>,
    pub m_bias: Array2<f32>,
    pub v_bias: Array2<f32>,
}

impl AdamStates {
    /// Creates zero-initialized moment estimates
    ///
    /// # Parameters
    ///
    /// - `dims_param` - Shape (rows, columns) of the weight matrix
    /// - `dims_bias` - Shape (rows, columns) of the bias
    pub fn new(dims_param: (usize, usize), dims_bias: (usize, usize)) -> Self {
        Self {
            m: Array2::zeros(dims_param),
            v: Array2::zeros(dims_param),
            m_bias: Array2::zeros(dims_bias),
            v_bias: Array2::zeros(dims_bias),
        }
    }

    /// Updates the moment estimates and returns the parameter updates
    ///
    /// # Parameters
    ///
    /// - `grad_param` - Gradient of the weight matrix
    /// - `grad_bias` - Gradient of the bias
    /// - `beta1` - Exponential decay rate for first moment estimates
    /// - `beta2` - Exponential decay rate for second moment estimates
    /// - `epsilon` - Small constant added for numerical stability
    /// - `t` - Current step, starting at 1
    /// - `lr` - Learning rate
    ///
    /// # Returns
    ///
    /// * `(Array2<f32>, Array2<f32>)` - Values to subtract from the weights and from the bias
    pub fn update_parameter(
        &mut self,
        grad_param: &Array2<f32>,
        grad_bias: &Array2<f32>,
        beta1: f32,
        beta2: f32,
        epsilon: f32,
        t: u64,
        lr: f32,
    ) -> (Array2<f32>, Array2<f32>) {
        let correction1 = 1.0 - beta1.powi(t as i32);
        let correction2 = 1.0 - beta2.powi(t as i32);

        let ((m, v), (m_bias, v_bias)) = (
            (&mut self.m, &mut self.v),
            (&mut self.m_bias, &mut self.v_bias),
        );
        rayon::join(
            || Self::update_moments(m, v, grad_param, beta1, beta2),
            || Self::update_moments(m_bias, v_bias, grad_bias, beta1, beta2),
        );

        let step = |m: &Array2<f32>, v: &Array2<f32>| {
            let m_hat = m / correction1;
            let v_hat = v / correction2;
            lr * &m_hat / &(v_hat.mapv(f32::sqrt) + epsilon)
        };
        rayon::join(|| step(&self.m, &self.v), || step(&self.m_bias, &self.v_bias))
    }

    /// `m = beta1*m + (1-beta1)*g`, `v = beta2*v + (1-beta2)*g²`
    fn update_moments(
        m: &mut Array2<f32>,
        v: &mut Array2<f32>,
        g: &Array2<f32>,
        beta1: f32,
        beta2: f32,
    ) {
        m.zip_mut_with(g, |m, &g| *m = beta1 * *m + (1.0 - beta1) * g);
        v.zip_mut_with(g, |v, &g| *v = beta2 * *v + (1.0 - beta2) * g * g);
    }
}
